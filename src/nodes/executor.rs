use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::core::connector::Connector;
use crate::error::{BlockError, BlockResult};
use crate::evaluator::evaluate;
use crate::flow::{Block, BlockId, BlockType, BranchCondition, ConditionType};

/// Behaviour of one block type. Returns the next block, or `None` when the
/// call ends.
#[async_trait]
pub trait BlockRunner: Send + Sync {
    async fn run(&self, block: &Block, call: &dyn Connector) -> BlockResult<Option<BlockId>>;
}

/// Fails unless `block` carries the type tag the calling runner implements.
pub fn ensure_type(block: &Block, expected: BlockType, runner: &'static str) -> BlockResult<()> {
    if block.block_type == expected {
        Ok(())
    } else {
        Err(BlockError::WrongBlockType {
            expected: runner,
            actual: block.block_type.clone(),
        })
    }
}

/// Registry of block runners by type tag.
pub struct RunnerRegistry {
    runners: HashMap<BlockType, Arc<dyn BlockRunner>>,
    fallback: Arc<dyn BlockRunner>,
}

impl RunnerRegistry {
    pub fn new() -> Self {
        let mut registry = RunnerRegistry {
            runners: HashMap::new(),
            fallback: Arc::new(super::control_flow::PassthroughRunner),
        };
        registry.register(BlockType::StoreUserInput, Arc::new(super::input::StoreUserInputRunner));
        registry.register(BlockType::GetUserInput, Arc::new(super::input::GetUserInputRunner));
        registry.register(BlockType::Transfer, Arc::new(super::control_flow::TransferRunner));
        registry.register(BlockType::Disconnect, Arc::new(super::control_flow::DisconnectRunner));
        registry.register(BlockType::CheckAttribute, Arc::new(super::control_flow::CheckAttributeRunner));
        registry.register(
            BlockType::CheckHoursOfOperation,
            Arc::new(super::control_flow::CheckHoursOfOperationRunner),
        );
        registry.register(BlockType::SetQueue, Arc::new(super::data_transform::SetQueueRunner));
        registry.register(BlockType::SetAttributes, Arc::new(super::data_transform::SetAttributesRunner));
        registry.register(BlockType::SetVoice, Arc::new(super::data_transform::SetVoiceRunner));
        registry.register(BlockType::PlayPrompt, Arc::new(super::data_transform::PlayPromptRunner));
        registry.register(
            BlockType::InvokeExternalResource,
            Arc::new(super::lambda::InvokeExternalResourceRunner),
        );
        registry
    }

    pub fn register(&mut self, block_type: BlockType, runner: Arc<dyn BlockRunner>) {
        self.runners.insert(block_type, runner);
    }

    pub fn contains(&self, block_type: &BlockType) -> bool {
        self.runners.contains_key(block_type)
    }

    /// Runner for `block_type`. Unknown and deprecated tags get the
    /// passthrough runner, so this never fails.
    pub fn get(&self, block_type: &BlockType) -> Arc<dyn BlockRunner> {
        self.runners
            .get(block_type)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

impl Default for RunnerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Shorthand used by every runner once it has picked a branch label.
pub(crate) fn follow(block: &Block, condition: BranchCondition) -> Option<BlockId> {
    let next = block.branches.get_link(&condition);
    tracing::debug!(block = %block.id, branch = %condition, next = ?next, "branch selected");
    next
}

/// Target of the first Evaluate branch whose condition holds for `value`.
/// Branches without an operator compare with Equals.
pub(crate) fn match_evaluate(block: &Block, value: &str) -> Option<BlockId> {
    block
        .branches
        .list(&BranchCondition::Evaluate)
        .into_iter()
        .find(|branch| {
            let operator = branch.condition_type.clone().unwrap_or(ConditionType::Equals);
            let operand = branch.condition_value.clone().unwrap_or(Value::Null);
            evaluate(value, &operator, &operand)
        })
        .map(|branch| branch.transition.clone())
}
