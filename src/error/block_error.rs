use thiserror::Error;

use crate::flow::BlockType;

/// Fatal block-level errors. Expected failures such as a missing queue or an
/// hours-check error are modelled as Error branches, never as these.
#[derive(Debug, Error)]
pub enum BlockError {
    #[error("module of type {actual} being run as {expected}")]
    WrongBlockType {
        expected: &'static str,
        actual: BlockType,
    },
    #[error("missing parameter {0}")]
    MissingParameter(String),
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },
    #[error("malformed number for {name}: {reason}")]
    MalformedNumber { name: String, reason: String },
    #[error("unhandled {block} target: {target}")]
    UnhandledTarget { block: &'static str, target: String },
    #[error("unknown lambda: {0}")]
    UnknownLambda(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for BlockError {
    fn from(e: serde_json::Error) -> Self {
        BlockError::SerializationError(e.to_string())
    }
}
