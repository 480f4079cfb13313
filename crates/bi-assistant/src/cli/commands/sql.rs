use anyhow::Result;
use clap::Args;

use super::emit_reply;
use crate::models::ToolReply;
use crate::service::BiAssistant;
use crate::tools::RUN_SQL_TOOL;

#[derive(Debug, Clone, Args)]
pub struct SqlArgs {
    #[arg(value_name = "SQL")]
    pub query: String,
}

pub fn run(args: &SqlArgs, service: &BiAssistant, pretty: bool) -> Result<()> {
    let reply = ToolReply::from_result(RUN_SQL_TOOL, service.run_sql(&args.query));
    emit_reply(RUN_SQL_TOOL, &reply, pretty)
}
