pub mod error;
pub mod reply;

pub use error::{BiError, ErrorKind, ValidationError};
pub use reply::{QueryRows, Row, ToolCommandFailure, ToolReply};
