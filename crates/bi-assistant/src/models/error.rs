use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Connection,
    Query,
}

impl ErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::Connection => "connection",
            Self::Query => "query",
        }
    }
}

/// Caller-side mistakes. Always detected before the store is consulted,
/// except for argument decoding which happens at the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("empty query: no query provided")]
    EmptyQuery,

    #[error("disallowed statement `{leading_keyword}`: only SELECT and WITH queries are allowed")]
    DisallowedStatement { leading_keyword: String },

    #[error("missing parameter: {0} is required")]
    MissingParameter(&'static str),

    #[error("invalid metric `{requested}`: expected one of {allowed}")]
    InvalidMetric { requested: String, allowed: String },

    #[error("invalid arguments for `{tool}`: {reason}")]
    InvalidArguments { tool: String, reason: String },

    #[error("unknown tool `{0}`")]
    UnknownTool(String),

    #[error("unknown resource `{0}`")]
    UnknownResource(String),

    #[error("malformed request: {0}")]
    MalformedRequest(String),
}

#[derive(Debug, Error)]
pub enum BiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("no data found for {product} {month}/{year}")]
    NotFound {
        product: String,
        month: u32,
        year: i64,
    },

    #[error("failed to open database `{locator}`: {source}")]
    Connection {
        locator: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("{context}: {source}")]
    Query {
        context: String,
        #[source]
        source: rusqlite::Error,
    },
}

impl BiError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Connection { .. } => ErrorKind::Connection,
            Self::Query { .. } => ErrorKind::Query,
        }
    }

    pub(crate) fn query(context: impl Into<String>) -> impl FnOnce(rusqlite::Error) -> Self {
        let context = context.into();
        move |source| Self::Query { context, source }
    }
}
