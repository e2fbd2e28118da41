//! Call-level and setup errors.

use super::BlockError;
use crate::flow::{BlockId, BlockType};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CallError {
    #[error("Flow parse error: {0}")]
    FlowParseError(String),
    #[error("Flow not found: {0}")]
    FlowNotFound(String),
    #[error("Block not found: {0}")]
    BlockNotFound(BlockId),
    #[error("a destination number must be provided in order to start a flow")]
    MissingDestination,
    #[error("no starting flow set for {0}")]
    NoStartingFlow(String),
    #[error("Max steps exceeded: {0}")]
    MaxStepsExceeded(usize),
    #[error("Block execution error: block={block_id}, type={block_type}, error={source}")]
    BlockFailed {
        block_id: BlockId,
        block_type: BlockType,
        #[source]
        source: BlockError,
    },
    #[error("Call already ended")]
    CallEnded,
}
