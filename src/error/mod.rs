//! Error types for the simulator.
//!
//! - [`BlockError`]: fatal errors raised while running a single block.
//! - [`CallError`]: setup errors and errors that end a call.

pub mod block_error;
pub mod call_error;

pub use block_error::BlockError;
pub use call_error::CallError;

/// Convenience alias for block-level results.
pub type BlockResult<T> = Result<T, BlockError>;
/// Convenience alias for call-level results.
pub type CallResult<T> = Result<T, CallError>;
