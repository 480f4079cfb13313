use clap::{Args, Parser, Subcommand};

use super::commands::{
    aggregate::AggregateArgs, init::InitArgs, metric::MetricArgs, resource::ResourceArgs,
    schema::SchemaArgs, serve::ServeArgs, sql::SqlArgs, tools::ToolsArgs,
};

#[derive(Debug, Parser)]
#[command(
    name = "bi-assistant",
    version,
    about = "Read-only campaign performance analytics over SQLite"
)]
pub struct Cli {
    #[command(flatten)]
    pub runtime: RuntimeArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Args)]
pub struct RuntimeArgs {
    /// Database locator; overrides DATABASE_URL. A sqlite:// prefix is stripped.
    #[arg(long, global = true, value_name = "URL")]
    pub database_url: Option<String>,

    /// Pretty-print JSON replies.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Describe tables, sample rows, views and key metrics.
    Schema(SchemaArgs),
    /// Run a read-only SQL query.
    Sql(SqlArgs),
    /// List performance rows for a product, month and year.
    Aggregate(AggregateArgs),
    /// Look up one KPI for a product-month.
    Metric(MetricArgs),
    /// Print a discovery document.
    Resource(ResourceArgs),
    /// List tools with their input schemas.
    Tools(ToolsArgs),
    /// Answer line-delimited JSON requests on stdin.
    Serve(ServeArgs),
    /// Create the campaign tables and performance view if absent.
    Init(InitArgs),
}
