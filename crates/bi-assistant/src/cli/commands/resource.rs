use anyhow::Result;
use clap::Args;

use super::emit_reply;
use crate::models::ToolReply;
use crate::tools::read_resource;

#[derive(Debug, Clone, Args)]
pub struct ResourceArgs {
    /// `bi://schema`, `bi://examples` or `bi://metrics` (the `bi://` is optional).
    #[arg(value_name = "URI")]
    pub uri: String,

    /// Print only the document text instead of the JSON reply.
    #[arg(long, default_value_t = false)]
    pub raw: bool,
}

pub fn run(args: &ResourceArgs, pretty: bool) -> Result<()> {
    let reply = read_resource(&args.uri);
    if args.raw {
        if let ToolReply::Ok(document) = &reply {
            println!("{}", document["text"].as_str().unwrap_or_default());
            return Ok(());
        }
    }
    emit_reply("read_resource", &reply, pretty)
}
