use anyhow::Result;
use clap::Args;

use super::emit_reply;
use crate::metrics::MetricRequest;
use crate::models::ToolReply;
use crate::service::BiAssistant;
use crate::tools::COMPUTE_METRIC_TOOL;

// Required fields are optional here so that a missing one produces the same
// validation reply as the dispatcher instead of a usage error.
#[derive(Debug, Clone, Args)]
pub struct MetricArgs {
    #[arg(long)]
    pub product: Option<String>,

    #[arg(long)]
    pub month: Option<u32>,

    #[arg(long)]
    pub metric: Option<String>,

    #[arg(long)]
    pub year: Option<i64>,
}

pub fn run(args: &MetricArgs, service: &BiAssistant, pretty: bool) -> Result<()> {
    let request = MetricRequest {
        product: args.product.clone(),
        month: args.month,
        metric: args.metric.clone(),
        year: args.year.unwrap_or(service.default_year()),
    };
    let reply = ToolReply::from_result(COMPUTE_METRIC_TOOL, service.compute_metric(&request));
    emit_reply(COMPUTE_METRIC_TOOL, &reply, pretty)
}
