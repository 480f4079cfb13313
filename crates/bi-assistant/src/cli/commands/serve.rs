use anyhow::Result;
use clap::Args;
use tracing::info;

use crate::service::BiAssistant;

#[derive(Debug, Clone, Args)]
pub struct ServeArgs {}

pub fn run(_args: &ServeArgs, service: &BiAssistant) -> Result<()> {
    info!(
        database_url = service.connections().database_url(),
        "starting line-delimited dispatcher on stdin/stdout"
    );
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    crate::tools::serve(service, stdin.lock(), stdout.lock())?;
    Ok(())
}
