use anyhow::Result;
use clap::Args;
use serde_json::json;
use tracing::info;

use super::emit_reply;
use crate::models::{BiError, ToolReply};
use crate::service::BiAssistant;
use crate::sqlite::ensure_performance_schema;

#[derive(Debug, Clone, Args)]
pub struct InitArgs {}

pub fn run(_args: &InitArgs, service: &BiAssistant, pretty: bool) -> Result<()> {
    let result = service.connections().acquire().and_then(|connection| {
        ensure_performance_schema(&connection).map_err(BiError::query("failed to create schema"))
    });
    let locator = service.connections().locator();
    if result.is_ok() {
        info!(locator, "campaign schema ensured");
    }
    let reply = ToolReply::from_result(
        "init",
        result.map(|()| json!({ "initialized": true, "locator": locator })),
    );
    emit_reply("init", &reply, pretty)
}
