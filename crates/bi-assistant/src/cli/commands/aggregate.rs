use anyhow::Result;
use clap::Args;

use super::emit_reply;
use crate::metrics::PerformanceFilter;
use crate::models::ToolReply;
use crate::service::BiAssistant;
use crate::tools::AGGREGATE_PERFORMANCE_TOOL;

#[derive(Debug, Clone, Args)]
pub struct AggregateArgs {
    #[arg(long, default_value = "")]
    pub product: String,

    #[arg(long)]
    pub month: Option<u32>,

    #[arg(long)]
    pub year: Option<i64>,
}

pub fn run(args: &AggregateArgs, service: &BiAssistant, pretty: bool) -> Result<()> {
    let filter = PerformanceFilter {
        product: Some(args.product.clone()),
        month: args.month,
        year: args.year.unwrap_or(service.default_year()),
    };
    let reply = ToolReply::from_result(
        AGGREGATE_PERFORMANCE_TOOL,
        service.aggregate_performance(&filter),
    );
    emit_reply(AGGREGATE_PERFORMANCE_TOOL, &reply, pretty)
}
