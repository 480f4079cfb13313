use std::fmt::{Display, Formatter};

use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::error;

use super::error::{BiError, ErrorKind};

/// One result row keyed by column name, in projection order.
pub type Row = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryRows {
    pub data: Vec<Row>,
    pub row_count: usize,
}

impl QueryRows {
    #[must_use]
    pub fn new(data: Vec<Row>) -> Self {
        Self {
            row_count: data.len(),
            data,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// The only shape an operation hands back to its caller: either the success
/// payload or `{"error": "..."}`. The kind is kept for exit codes and logs
/// but never serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ToolReply {
    Ok(Value),
    Error {
        error: String,
        #[serde(skip)]
        kind: ErrorKind,
    },
}

impl ToolReply {
    #[must_use]
    pub fn ok(data: Value) -> Self {
        Self::Ok(data)
    }

    #[must_use]
    pub fn from_error(operation: &str, failure: &BiError) -> Self {
        let kind = failure.kind();
        error!(
            operation,
            kind = kind.as_str(),
            error = %failure,
            "operation failed"
        );
        Self::Error {
            error: failure.to_string(),
            kind,
        }
    }

    #[must_use]
    pub fn from_result<T: Serialize>(operation: &str, result: Result<T, BiError>) -> Self {
        match result {
            Ok(payload) => match serde_json::to_value(payload) {
                Ok(value) => Self::Ok(value),
                Err(encode_error) => {
                    error!(operation, error = %encode_error, "failed to encode reply");
                    Self::Error {
                        error: format!("failed to encode reply: {encode_error}"),
                        kind: ErrorKind::Query,
                    }
                }
            },
            Err(failure) => Self::from_error(operation, &failure),
        }
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    #[must_use]
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Ok(_) => None,
            Self::Error { kind, .. } => Some(*kind),
        }
    }

    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Ok(value) => value.clone(),
            Self::Error { error, .. } => json!({ "error": error }),
        }
    }
}

/// Raised by CLI commands after the error reply has been printed so `main`
/// can pick an exit code from the kind.
#[derive(Debug, Clone)]
pub struct ToolCommandFailure {
    operation: String,
    kind: ErrorKind,
    message: String,
}

impl ToolCommandFailure {
    #[must_use]
    pub fn new(operation: impl Into<String>, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            kind,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl Display for ToolCommandFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} failed ({}): {}",
            self.operation,
            self.kind.as_str(),
            self.message
        )
    }
}

impl std::error::Error for ToolCommandFailure {}
