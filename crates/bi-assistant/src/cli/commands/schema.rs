use anyhow::Result;
use clap::Args;

use super::emit_reply;
use crate::models::ToolReply;
use crate::service::BiAssistant;
use crate::tools::DESCRIBE_SCHEMA_TOOL;

#[derive(Debug, Clone, Args)]
pub struct SchemaArgs {}

pub fn run(_args: &SchemaArgs, service: &BiAssistant, pretty: bool) -> Result<()> {
    let reply = ToolReply::from_result(DESCRIBE_SCHEMA_TOOL, service.describe_schema());
    emit_reply(DESCRIBE_SCHEMA_TOOL, &reply, pretty)
}
