//! Name-based dispatch of tool calls and resource reads, plus the
//! line-delimited JSON loop used by `bi-assistant serve`.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::metrics::{MetricRequest, PerformanceFilter};
use crate::models::{BiError, ToolReply, ValidationError};
use crate::resources::{self, ResourceKind};
use crate::service::BiAssistant;

pub const DESCRIBE_SCHEMA_TOOL: &str = "describe_schema";
pub const RUN_SQL_TOOL: &str = "run_sql";
pub const AGGREGATE_PERFORMANCE_TOOL: &str = "aggregate_performance";
pub const COMPUTE_METRIC_TOOL: &str = "compute_metric";

pub const TOOL_NAMES: &[&str] = &[
    DESCRIBE_SCHEMA_TOOL,
    RUN_SQL_TOOL,
    AGGREGATE_PERFORMANCE_TOOL,
    COMPUTE_METRIC_TOOL,
];

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct DescribeSchemaArgs {}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct RunSqlArgs {
    /// A single read-only statement starting with SELECT or WITH.
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct AggregatePerformanceArgs {
    /// Product name, matched case-insensitively. Empty means all products.
    #[serde(default)]
    pub product: String,
    /// Month number (1-12). Omit for every month.
    #[serde(default)]
    pub month: Option<u32>,
    /// Defaults to 2024.
    #[serde(default)]
    pub year: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ComputeMetricArgs {
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default)]
    pub month: Option<u32>,
    /// One of roas, roi, ctr_percentage, cpa, cpc, cpm.
    #[serde(default)]
    pub metric: Option<String>,
    /// Defaults to 2024.
    #[serde(default)]
    pub year: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

#[must_use]
pub fn tool_descriptors() -> Vec<ToolDescriptor> {
    vec![
        descriptor::<DescribeSchemaArgs>(
            DESCRIBE_SCHEMA_TOOL,
            "Discover database schema: table structures, sample rows, views and key metrics.",
        ),
        descriptor::<RunSqlArgs>(
            RUN_SQL_TOOL,
            "Execute a read-only SQL query. Only SELECT and WITH statements are allowed.",
        ),
        descriptor::<AggregatePerformanceArgs>(
            AGGREGATE_PERFORMANCE_TOOL,
            "List campaign performance rows filtered by product, month and year.",
        ),
        descriptor::<ComputeMetricArgs>(
            COMPUTE_METRIC_TOOL,
            "Look up one KPI for a product-month from the campaign performance view.",
        ),
    ]
}

fn descriptor<T: JsonSchema>(name: &'static str, description: &'static str) -> ToolDescriptor {
    ToolDescriptor {
        name,
        description,
        input_schema: serde_json::to_value(schemars::schema_for!(T)).unwrap_or(Value::Null),
    }
}

/// Runs one named operation. Every outcome, including unknown tools and
/// undecodable arguments, becomes a reply.
#[must_use]
pub fn call_tool(service: &BiAssistant, name: &str, arguments: Value) -> ToolReply {
    debug!(tool = name, "dispatching tool call");
    match name {
        DESCRIBE_SCHEMA_TOOL => ToolReply::from_result(
            name,
            decode::<DescribeSchemaArgs>(name, arguments).and_then(|_| service.describe_schema()),
        ),
        RUN_SQL_TOOL => ToolReply::from_result(
            name,
            decode::<RunSqlArgs>(name, arguments).and_then(|args| service.run_sql(&args.query)),
        ),
        AGGREGATE_PERFORMANCE_TOOL => ToolReply::from_result(
            name,
            decode::<AggregatePerformanceArgs>(name, arguments).and_then(|args| {
                service.aggregate_performance(&PerformanceFilter {
                    product: Some(args.product),
                    month: args.month,
                    year: args.year.unwrap_or(service.default_year()),
                })
            }),
        ),
        COMPUTE_METRIC_TOOL => ToolReply::from_result(
            name,
            decode::<ComputeMetricArgs>(name, arguments).and_then(|args| {
                service.compute_metric(&MetricRequest {
                    product: args.product,
                    month: args.month,
                    metric: args.metric,
                    year: args.year.unwrap_or(service.default_year()),
                })
            }),
        ),
        unknown => ToolReply::from_error(
            "call_tool",
            &BiError::from(ValidationError::UnknownTool(unknown.to_string())),
        ),
    }
}

fn decode<T: DeserializeOwned>(tool: &str, arguments: Value) -> Result<T, BiError> {
    let arguments = match arguments {
        Value::Null => json!({}),
        other => other,
    };
    serde_json::from_value(arguments).map_err(|error| {
        BiError::from(ValidationError::InvalidArguments {
            tool: tool.to_string(),
            reason: error.to_string(),
        })
    })
}

#[must_use]
pub fn read_resource(uri: &str) -> ToolReply {
    ToolReply::from_result(
        "read_resource",
        ResourceKind::from_uri(uri)
            .map(resources::read)
            .map_err(BiError::from),
    )
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum DispatchRequest {
    ListTools,
    CallTool {
        name: String,
        #[serde(default)]
        arguments: Value,
    },
    ReadResource {
        uri: String,
    },
}

#[must_use]
pub fn handle_request(service: &BiAssistant, request: DispatchRequest) -> ToolReply {
    match request {
        DispatchRequest::ListTools => ToolReply::ok(json!({ "tools": tool_descriptors() })),
        DispatchRequest::CallTool { name, arguments } => call_tool(service, &name, arguments),
        DispatchRequest::ReadResource { uri } => read_resource(&uri),
    }
}

#[must_use]
pub fn handle_line(service: &BiAssistant, line: &str) -> ToolReply {
    match serde_json::from_str::<DispatchRequest>(line) {
        Ok(request) => handle_request(service, request),
        Err(error) => ToolReply::from_error(
            "dispatch",
            &BiError::from(ValidationError::MalformedRequest(error.to_string())),
        ),
    }
}

/// Answers one request per non-blank input line until EOF. Returns the
/// number of requests handled. Only stream I/O failures end the loop; a line
/// that is not UTF-8 gets an error reply like any other malformed request.
pub fn serve<R: BufRead, W: Write>(service: &BiAssistant, mut reader: R, mut writer: W) -> Result<usize> {
    info!(tools = ?TOOL_NAMES, "dispatcher ready");
    let mut handled = 0usize;
    let mut buffer = Vec::new();
    loop {
        buffer.clear();
        let read = reader
            .read_until(b'\n', &mut buffer)
            .context("failed to read request line")?;
        if read == 0 {
            break;
        }

        let reply = match std::str::from_utf8(&buffer) {
            Ok(line) if line.trim().is_empty() => continue,
            Ok(line) => handle_line(service, line.trim_end_matches(['\n', '\r'])),
            Err(decode_error) => ToolReply::from_error(
                "dispatch",
                &BiError::from(ValidationError::MalformedRequest(format!(
                    "request line is not valid UTF-8: {decode_error}"
                ))),
            ),
        };
        let encoded = serde_json::to_string(&reply).context("failed to encode reply")?;
        writeln!(writer, "{encoded}").context("failed to write reply")?;
        writer.flush().context("failed to flush reply")?;
        handled += 1;
    }
    info!(handled, "dispatcher input closed");
    Ok(handled)
}
