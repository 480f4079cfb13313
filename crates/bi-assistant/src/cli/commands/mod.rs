pub mod aggregate;
pub mod init;
pub mod metric;
pub mod resource;
pub mod schema;
pub mod serve;
pub mod sql;
pub mod tools;

use anyhow::{Context, Error, Result};

use crate::models::{ToolCommandFailure, ToolReply};

/// Prints the reply on stdout. Error replies are printed too, then raised as
/// a `ToolCommandFailure` so the exit code reflects the failure kind.
pub fn emit_reply(operation: &str, reply: &ToolReply, pretty: bool) -> Result<()> {
    let encoded = if pretty {
        serde_json::to_string_pretty(reply)
    } else {
        serde_json::to_string(reply)
    }
    .context("failed to encode reply")?;
    println!("{encoded}");

    match reply {
        ToolReply::Ok(_) => Ok(()),
        ToolReply::Error { error, kind } => Err(Error::new(ToolCommandFailure::new(
            operation, *kind, error,
        ))),
    }
}
