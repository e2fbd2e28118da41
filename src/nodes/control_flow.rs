use async_trait::async_trait;
use serde_json::Value;

use crate::core::connector::Connector;
use crate::core::event_log::CallEvent;
use crate::error::{BlockError, BlockResult};
use crate::flow::{Block, BlockId, BlockTarget, BlockType, BranchCondition, Namespace, SystemKey};
use crate::nodes::executor::{ensure_type, follow, match_evaluate, BlockRunner};
use crate::nodes::params::ParamReader;
use crate::template::{resolve_text, value_as_text, ValueLookup};

// ================================
// Transfer
// ================================

pub struct TransferRunner;

#[async_trait]
impl BlockRunner for TransferRunner {
    async fn run(&self, block: &Block, call: &dyn Connector) -> BlockResult<Option<BlockId>> {
        ensure_type(block, BlockType::Transfer, "transfer")?;
        let params = ParamReader::new(block, call);

        match &block.target {
            Some(BlockTarget::Flow) => {
                let flow = params.required("ContactFlowId")?;
                let name = flow.resource_name.clone().unwrap_or_default();
                let Some(start) = call.get_flow_start(&name) else {
                    tracing::warn!(block = %block.id, flow = %name, "transfer to unknown flow");
                    return Ok(follow(block, BranchCondition::Error));
                };
                call.emit(CallEvent::FlowTransfer {
                    arn: value_as_text(&flow.value),
                    name,
                });
                Ok(Some(start))
            }
            Some(BlockTarget::Queue) => {
                let queue = call.get_system(SystemKey::QueueName);
                let arn = call.get_system(SystemKey::QueueArn);
                match (queue, arn) {
                    (Some(name), Some(arn)) => {
                        tracing::info!(queue = %name, "call transferred to queue");
                        call.emit(CallEvent::QueueTransfer { arn, name });
                        Ok(None)
                    }
                    _ => Ok(follow(block, BranchCondition::Error)),
                }
            }
            Some(BlockTarget::PhoneNumber) => {
                let blind = params.bool("BlindTransfer")?;
                let number = match params.value("PhoneNumber")? {
                    Value::String(number) => resolve_text(&number, call),
                    _ => return Err(BlockError::MissingParameter("PhoneNumber".to_string())),
                };
                call.emit(CallEvent::NumberTransfer { number });
                if blind {
                    Ok(None)
                } else {
                    Ok(follow(block, BranchCondition::Success))
                }
            }
            other => Err(BlockError::UnhandledTarget {
                block: "transfer",
                target: other.as_ref().map(|t| t.to_string()).unwrap_or_default(),
            }),
        }
    }
}

// ================================
// Disconnect
// ================================

pub struct DisconnectRunner;

#[async_trait]
impl BlockRunner for DisconnectRunner {
    async fn run(&self, block: &Block, _call: &dyn Connector) -> BlockResult<Option<BlockId>> {
        ensure_type(block, BlockType::Disconnect, "disconnect")?;
        Ok(None)
    }
}

// ================================
// CheckAttribute
// ================================

/// Compares one stored value against each Evaluate branch in turn.
pub struct CheckAttributeRunner;

#[async_trait]
impl BlockRunner for CheckAttributeRunner {
    async fn run(&self, block: &Block, call: &dyn Connector) -> BlockResult<Option<BlockId>> {
        ensure_type(block, BlockType::CheckAttribute, "checkAttribute")?;
        let params = ParamReader::new(block, call);

        let attribute = params.required("Attribute")?;
        let namespace = match params.get("Namespace") {
            Some(p) => {
                let text = value_as_text(&p.value);
                Namespace::parse(&text).ok_or_else(|| BlockError::InvalidParameter {
                    name: "Namespace".to_string(),
                    reason: format!("unknown namespace {}", text),
                })?
            }
            None => attribute.namespace.unwrap_or(Namespace::UserDefined),
        };
        let value = call
            .lookup(namespace, &value_as_text(&attribute.value))
            .unwrap_or_default();

        match match_evaluate(block, &value) {
            Some(next) => Ok(Some(next)),
            None => Ok(follow(block, BranchCondition::NoMatch)),
        }
    }
}

// ================================
// CheckHoursOfOperation
// ================================

pub struct CheckHoursOfOperationRunner;

#[async_trait]
impl BlockRunner for CheckHoursOfOperationRunner {
    async fn run(&self, block: &Block, call: &dyn Connector) -> BlockResult<Option<BlockId>> {
        ensure_type(block, BlockType::CheckHoursOfOperation, "checkHoursOfOperation")?;
        let params = ParamReader::new(block, call);

        let (name, is_queue) = match params.get("Hours") {
            Some(hours) => (
                hours
                    .resource_name
                    .clone()
                    .unwrap_or_else(|| value_as_text(&hours.value)),
                false,
            ),
            None => (call.get_system(SystemKey::QueueName).unwrap_or_default(), true),
        };

        match call.is_in_hours(&name, is_queue) {
            Ok(true) => Ok(follow(block, BranchCondition::True)),
            Ok(false) => Ok(follow(block, BranchCondition::False)),
            Err(e) => {
                tracing::warn!(block = %block.id, name = %name, error = %e, "hours check failed");
                Ok(follow(block, BranchCondition::Error))
            }
        }
    }
}

// ================================
// Passthrough
// ================================

/// Stands in for block types with no simulated behaviour.
pub struct PassthroughRunner;

#[async_trait]
impl BlockRunner for PassthroughRunner {
    async fn run(&self, block: &Block, _call: &dyn Connector) -> BlockResult<Option<BlockId>> {
        tracing::debug!(block = %block.id, block_type = %block.block_type, "passing through block");
        Ok(follow(block, BranchCondition::Success))
    }
}
