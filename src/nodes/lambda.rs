//! InvokeExternalResource: calls a registered lambda handler with a
//! contact-flow event and exposes its flat output in the External namespace.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::time::Duration;

use crate::core::connector::Connector;
use crate::core::event_log::CallEvent;
use crate::error::BlockResult;
use crate::flow::{Block, BlockId, BlockType, BranchCondition, SystemKey};
use crate::nodes::executor::{ensure_type, follow, BlockRunner};
use crate::nodes::params::ParamReader;
use crate::template::value_as_text;

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct ContactFlowEvent {
    details: EventDetails,
    name: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct EventDetails {
    contact_data: ContactData,
    parameters: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct ContactData {
    attributes: HashMap<String, String>,
    channel: Option<String>,
    contact_id: Option<String>,
    customer_endpoint: Option<Endpoint>,
    initial_contact_id: Option<String>,
    initiation_method: Option<String>,
    #[serde(rename = "InstanceARN")]
    instance_arn: Option<String>,
    previous_contact_id: Option<String>,
    queue: Option<QueueInfo>,
    system_endpoint: Option<Endpoint>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct Endpoint {
    address: String,
    #[serde(rename = "Type")]
    endpoint_type: &'static str,
}

#[derive(Debug, Serialize)]
struct QueueInfo {
    #[serde(rename = "ARN")]
    arn: String,
    #[serde(rename = "Name")]
    name: String,
}

fn telephone(address: Option<String>) -> Option<Endpoint> {
    address.map(|address| Endpoint {
        address,
        endpoint_type: "TELEPHONE_NUMBER",
    })
}

fn contact_flow_event(call: &dyn Connector, parameters: HashMap<String, String>) -> ContactFlowEvent {
    let queue = match (call.get_system(SystemKey::QueueArn), call.get_system(SystemKey::QueueName)) {
        (Some(arn), Some(name)) => Some(QueueInfo { arn, name }),
        _ => None,
    };
    ContactFlowEvent {
        details: EventDetails {
            contact_data: ContactData {
                attributes: call.contact_data(),
                channel: call.get_system(SystemKey::Channel),
                contact_id: call.get_system(SystemKey::ContactId),
                customer_endpoint: telephone(call.get_system(SystemKey::CustomerNumber)),
                initial_contact_id: call.get_system(SystemKey::InitialContactId),
                initiation_method: call.get_system(SystemKey::InitiationMethod),
                instance_arn: call.get_system(SystemKey::InstanceArn),
                previous_contact_id: call.get_system(SystemKey::PreviousContactId),
                queue,
                system_endpoint: telephone(call.get_system(SystemKey::DialedNumber)),
            },
            parameters,
        },
        name: "ContactFlowEvent",
    }
}

/// Lambda output must be a JSON object of scalars.
fn flat_output(output: &Value) -> Result<&Map<String, Value>, String> {
    let map = output
        .as_object()
        .ok_or_else(|| format!("lambda output is not an object: {}", output))?;
    if let Some((key, _)) = map.iter().find(|(_, v)| v.is_object() || v.is_array()) {
        return Err(format!("lambda output has nested value at {}", key));
    }
    Ok(map)
}

pub struct InvokeExternalResourceRunner;

#[async_trait]
impl BlockRunner for InvokeExternalResourceRunner {
    async fn run(&self, block: &Block, call: &dyn Connector) -> BlockResult<Option<BlockId>> {
        ensure_type(block, BlockType::InvokeExternalResource, "invokeExternalResource")?;
        let params = ParamReader::new(block, call);

        let arn = params.text("FunctionArn")?;
        let timeout = params
            .opt_int("TimeLimit")?
            .map(Duration::from_secs)
            .unwrap_or_else(|| call.default_lambda_timeout());
        let parameters: HashMap<String, String> = params.key_values("Parameter")?.into_iter().collect();

        let payload = serde_json::to_value(contact_flow_event(call, parameters.clone()))?;
        tracing::debug!(block = %block.id, arn = %arn, "invoking lambda");
        let outcome = call.invoke_lambda(&arn, payload, timeout).await?;

        let parameters = serde_json::to_value(&parameters)?;
        let checked = outcome.and_then(|output| {
            flat_output(&output)?;
            Ok(output)
        });
        match checked {
            Ok(output) => {
                call.clear_external();
                if let Some(map) = output.as_object() {
                    for (key, value) in map {
                        call.set_external(key, value_as_text(value));
                    }
                }
                call.emit(CallEvent::Lambda {
                    arn,
                    parameters,
                    output: Some(output),
                    error: None,
                });
                Ok(follow(block, BranchCondition::Success))
            }
            Err(error) => {
                tracing::warn!(block = %block.id, arn = %arn, error = %error, "lambda failed");
                call.emit(CallEvent::Lambda {
                    arn,
                    parameters,
                    output: None,
                    error: Some(error),
                });
                Ok(follow(block, BranchCondition::Error))
            }
        }
    }
}
