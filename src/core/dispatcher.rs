use serde::{Deserialize, Serialize};

use crate::core::call_connector::CallConnector;
use crate::core::status::CallStatus;
use crate::error::{CallError, CallResult};
use crate::flow::BlockId;

/// Configuration for the call engine
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Blocks a call may run before it is aborted. Guards against flows that
    /// loop without waiting for input.
    pub max_steps: usize,
    /// Used by lambda blocks without a TimeLimit.
    pub lambda_timeout_secs: u64,
    /// How long an assertion waits on a live call for a decisive event.
    pub assertion_timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_steps: 1000,
            lambda_timeout_secs: crate::core::connector::DEFAULT_LAMBDA_TIMEOUT_SECS,
            assertion_timeout_ms: 5000,
        }
    }
}

/// Drives one call: runs blocks from `start` until a runner yields no
/// successor or fails.
pub struct CallDispatcher {
    call: CallConnector,
    start: BlockId,
}

impl CallDispatcher {
    pub fn new(call: CallConnector, start: BlockId) -> Self {
        CallDispatcher { call, start }
    }

    pub async fn run(self) -> CallResult<()> {
        self.call.set_status(CallStatus::Running);
        tracing::info!(start = %self.start, "call started");

        let result = self.walk().await;
        // Close first so a driver woken by the final status sees a complete log.
        self.call.close();
        match &result {
            Ok(()) => {
                tracing::info!("call ended");
                self.call.set_status(CallStatus::Ended);
            }
            Err(e) => {
                tracing::error!(error = %e, "call failed");
                self.call.set_status(CallStatus::Failed(e.to_string()));
            }
        }
        result
    }

    async fn walk(&self) -> CallResult<()> {
        let setup = self.call.setup();
        let max_steps = setup.config.max_steps;
        let mut current = Some(self.start.clone());
        let mut steps = 0usize;

        while let Some(id) = current {
            steps += 1;
            if steps > max_steps {
                return Err(CallError::MaxStepsExceeded(max_steps));
            }
            let loaded = setup
                .flows
                .block(&id)
                .ok_or_else(|| CallError::BlockNotFound(id.clone()))?;
            tracing::debug!(block = %id, block_type = %loaded.block.block_type, "running block");

            current = loaded
                .runner
                .run(&loaded.block, &self.call)
                .await
                .map_err(|source| CallError::BlockFailed {
                    block_id: id.clone(),
                    block_type: loaded.block.block_type.clone(),
                    source,
                })?;
        }
        Ok(())
    }
}
