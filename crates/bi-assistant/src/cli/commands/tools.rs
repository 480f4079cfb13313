use anyhow::Result;
use clap::Args;
use serde_json::json;

use super::emit_reply;
use crate::models::ToolReply;
use crate::tools::tool_descriptors;

#[derive(Debug, Clone, Args)]
pub struct ToolsArgs {}

pub fn run(_args: &ToolsArgs, pretty: bool) -> Result<()> {
    let reply = ToolReply::ok(json!({ "tools": tool_descriptors() }));
    emit_reply("list_tools", &reply, pretty)
}
