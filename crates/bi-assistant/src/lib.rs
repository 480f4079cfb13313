#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod metrics;
pub mod models;
pub mod query;
pub mod resources;
pub mod schema;
pub mod service;
pub mod sqlite;
pub mod tools;

pub use cli::app::{Cli, Command};
pub use service::BiAssistant;
