use crate::models::{ClientId, OutputId, ValueKind};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Client {0} not found")]
    NotFound(ClientId),
    #[error("Output {0} not found")]
    UnknownOutput(OutputId),
    #[error("Property `{0}` is already registered")]
    DuplicateName(String),
    #[error("Property `{0}` is not registered")]
    UnknownProperty(String),
    #[error("Property `{name}` holds a {expected} value, got a {found}")]
    TypeMismatch {
        name: String,
        expected: ValueKind,
        found: ValueKind,
    },
    #[error("Backend error: {0}")]
    Backend(String),
    #[error("Parsing error: {0}")]
    SerdeParse(#[from] serde_json::error::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
