#![forbid(unsafe_code)]

use anyhow::Result;
use bi_assistant::BiAssistant;
use bi_assistant::cli::app::{Cli, Command, RuntimeArgs};
use bi_assistant::cli::commands;
use bi_assistant::config::{DATABASE_URL_ENV, ServerConfig};
use bi_assistant::models::{ErrorKind, ToolCommandFailure};
use clap::Parser;
use clap::error::ErrorKind as ClapErrorKind;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const EXIT_SUCCESS: i32 = 0;
const EXIT_RUNTIME_FAILURE: i32 = 1;
const EXIT_VALIDATION_FAILURE: i32 = 2;
const EXIT_USAGE_ERROR: i32 = 64;

const LOG_FILTER_ENV: &str = "BI_ASSISTANT_LOG";

fn main() {
    std::process::exit(run());
}

fn run() -> i32 {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) => return exit_code_for_parse_error(error),
    };
    init_tracing();

    let command_name = command_name(&cli.command);
    info!(command = command_name, "starting");

    match execute(cli) {
        Ok(()) => {
            info!(command = command_name, exit_code = EXIT_SUCCESS, "completed");
            EXIT_SUCCESS
        }
        Err(failure) => {
            let exit_code = classify_runtime_error(&failure);
            error!(command = command_name, exit_code, error = %format!("{failure:#}"), "failed");
            exit_code
        }
    }
}

fn execute(cli: Cli) -> Result<()> {
    let pretty = cli.runtime.pretty;
    // Construction does not touch the store; the connection opens on first use.
    let service = BiAssistant::new(&resolve_config(&cli.runtime));
    match cli.command {
        Command::Schema(args) => commands::schema::run(&args, &service, pretty),
        Command::Sql(args) => commands::sql::run(&args, &service, pretty),
        Command::Aggregate(args) => commands::aggregate::run(&args, &service, pretty),
        Command::Metric(args) => commands::metric::run(&args, &service, pretty),
        Command::Resource(args) => commands::resource::run(&args, pretty),
        Command::Tools(args) => commands::tools::run(&args, pretty),
        Command::Serve(args) => commands::serve::run(&args, &service),
        Command::Init(args) => commands::init::run(&args, &service, pretty),
    }
}

fn resolve_config(args: &RuntimeArgs) -> ServerConfig {
    // dotenvy::var loads a .env file from the working directory on first use.
    let env_url = dotenvy::var(DATABASE_URL_ENV).ok();
    ServerConfig::from_sources(args.database_url.as_deref(), env_url.as_deref())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn classify_runtime_error(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<ToolCommandFailure>() {
        Some(failure) if failure.kind() == ErrorKind::Validation => EXIT_VALIDATION_FAILURE,
        _ => EXIT_RUNTIME_FAILURE,
    }
}

fn exit_code_for_parse_error(error: clap::Error) -> i32 {
    match error.kind() {
        ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion => {
            let _ = error.print();
            EXIT_SUCCESS
        }
        _ => {
            let _ = error.print();
            EXIT_USAGE_ERROR
        }
    }
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Schema(_) => "schema",
        Command::Sql(_) => "sql",
        Command::Aggregate(_) => "aggregate",
        Command::Metric(_) => "metric",
        Command::Resource(_) => "resource",
        Command::Tools(_) => "tools",
        Command::Serve(_) => "serve",
        Command::Init(_) => "init",
    }
}
