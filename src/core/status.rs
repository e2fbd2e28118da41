/// Lifecycle state of a simulated call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallStatus {
    /// Constructed, not yet stepping.
    Ready,
    Running,
    /// Blocked inside a block's receive operation.
    WaitingForInput,
    /// Reached a block with no successor, or was abandoned.
    Ended,
    /// A block reported a fatal error.
    Failed(String),
}

impl CallStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, CallStatus::Ended | CallStatus::Failed(_))
    }
}
