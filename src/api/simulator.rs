//! Simulator setup and call start.
//!
//! Flows, lambda handlers and hooks are registered on a [`Simulator`] before
//! calls are started. Each call takes a snapshot of that setup, so changes
//! made afterwards only affect calls started later.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::api::Call;
use crate::core::call_connector::CallConnector;
use crate::core::call_state::CallState;
use crate::core::dispatcher::{CallDispatcher, EngineConfig};
use crate::core::flow_set::Setup;
use crate::core::hooks::LambdaHandler;
use crate::core::runtime_context::RuntimeContext;
use crate::error::{CallError, CallResult};
use crate::flow::{Flow, SystemKey};
use crate::nodes::RunnerRegistry;

const DEFAULT_CHANNEL: &str = "VOICE";
const DEFAULT_INITIATION_METHOD: &str = "INBOUND";
const DEFAULT_VOICE: &str = "Joanna";

/// Numbers for one simulated inbound call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallConfig {
    /// The caller's number.
    pub source_number: String,
    /// The number dialed; selects the starting flow.
    pub dest_number: String,
}

impl CallConfig {
    pub fn new(source_number: impl Into<String>, dest_number: impl Into<String>) -> Self {
        CallConfig {
            source_number: source_number.into(),
            dest_number: dest_number.into(),
        }
    }
}

pub struct Simulator {
    setup: Arc<Setup>,
    registry: RunnerRegistry,
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Simulator {
    /// A blank simulator: no flows, encryption is identity and every hours
    /// check reports "in hours".
    pub fn new() -> Self {
        Simulator {
            setup: Arc::new(Setup::default()),
            registry: RunnerRegistry::new(),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        Arc::make_mut(&mut self.setup).config = config;
        self
    }

    pub fn with_runtime_context(mut self, context: RuntimeContext) -> Self {
        Arc::make_mut(&mut self.setup).context = context;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.setup.config
    }

    /// Loads a flow. Deprecated block types are normalised first.
    pub fn load_flow(&mut self, flow: Flow) {
        tracing::info!(flow = %flow.name(), "loading flow");
        Arc::make_mut(&mut self.setup)
            .flows
            .insert_flow(flow, &self.registry);
    }

    /// Parses and loads a flow exported as JSON.
    pub fn load_flow_json(&mut self, json: &str) -> CallResult<()> {
        let flow = Flow::from_json(json)?;
        self.load_flow(flow);
        Ok(())
    }

    pub fn flows(&self) -> Vec<&Flow> {
        self.setup.flows.flows()
    }

    /// Handles lambda invocations whose ARN contains `name`.
    pub fn register_lambda<H>(&mut self, name: &str, handler: H)
    where
        H: LambdaHandler + 'static,
    {
        Arc::make_mut(&mut self.setup)
            .hooks
            .register_lambda(name, Arc::new(handler));
    }

    /// Calls to `tel` start at the start block of `flow_name`.
    pub fn set_starting_flow_for(&mut self, tel: &str, flow_name: &str) -> CallResult<()> {
        if self.setup.flows.flow(flow_name).is_none() {
            return Err(CallError::FlowNotFound(flow_name.to_string()));
        }
        Arc::make_mut(&mut self.setup)
            .starting_flows
            .insert(tel.to_string(), flow_name.to_string());
        Ok(())
    }

    /// Replaces the encryption hook used by StoreUserInput blocks with
    /// EncryptEntry set. Arguments are plaintext, key id and certificate.
    pub fn set_encryption<F>(&mut self, encrypt: F)
    where
        F: Fn(&str, &str, &[u8]) -> Vec<u8> + Send + Sync + 'static,
    {
        Arc::make_mut(&mut self.setup).hooks.set_encrypt(Arc::new(encrypt));
    }

    /// Replaces the hours-of-operation check. Arguments are the hours or
    /// queue name, whether it names a queue, and the current time.
    pub fn set_in_hours_check<F>(&mut self, in_hours: F)
    where
        F: Fn(&str, bool, DateTime<Utc>) -> Result<bool, String> + Send + Sync + 'static,
    {
        Arc::make_mut(&mut self.setup).hooks.set_in_hours(Arc::new(in_hours));
    }

    /// Starts a call on its own tokio task. Must be called from within a
    /// tokio runtime.
    pub fn start_call(&self, config: CallConfig) -> CallResult<Call> {
        if config.dest_number.is_empty() {
            return Err(CallError::MissingDestination);
        }
        let flow_name = self
            .setup
            .starting_flows
            .get(&config.dest_number)
            .ok_or_else(|| CallError::NoStartingFlow(config.dest_number.clone()))?;
        let start = self
            .setup
            .flows
            .flow_start(flow_name)
            .ok_or_else(|| CallError::FlowNotFound(flow_name.clone()))?;

        let contact_id = self.setup.context.id_generator.next_id();
        let state = initial_state(&config, &contact_id);
        tracing::info!(
            contact_id = %contact_id,
            from = %config.source_number,
            to = %config.dest_number,
            flow = %flow_name,
            "starting call"
        );

        let (connector, channels) = CallConnector::open(self.setup.clone(), state);
        let dispatcher = CallDispatcher::new(connector, start);
        let task = tokio::spawn(dispatcher.run());

        Ok(Call::new(
            contact_id,
            channels,
            task,
            Duration::from_millis(self.setup.config.assertion_timeout_ms),
        ))
    }
}

fn initial_state(config: &CallConfig, contact_id: &str) -> CallState {
    let state = CallState::new();
    state.set_system(SystemKey::CustomerNumber, config.source_number.clone());
    state.set_system(SystemKey::DialedNumber, config.dest_number.clone());
    state.set_system(SystemKey::ContactId, contact_id.to_string());
    state.set_system(SystemKey::InitialContactId, contact_id.to_string());
    state.set_system(SystemKey::Channel, DEFAULT_CHANNEL.to_string());
    state.set_system(SystemKey::InitiationMethod, DEFAULT_INITIATION_METHOD.to_string());
    state.set_system(SystemKey::TextToSpeechVoice, DEFAULT_VOICE.to_string());
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn flow_json(name: &str) -> String {
        json!({
            "modules": [{"id": format!("{}-end", name), "type": "Disconnect"}],
            "start": format!("{}-end", name),
            "metadata": {"name": name}
        })
        .to_string()
    }

    #[test]
    fn test_initial_state() {
        let state = initial_state(&CallConfig::new("+447700900000", "+441234"), "contact-1");
        assert_eq!(state.get_system(SystemKey::CustomerNumber).as_deref(), Some("+447700900000"));
        assert_eq!(state.get_system(SystemKey::DialedNumber).as_deref(), Some("+441234"));
        assert_eq!(state.get_system(SystemKey::ContactId).as_deref(), Some("contact-1"));
        assert_eq!(state.get_system(SystemKey::InitialContactId).as_deref(), Some("contact-1"));
        assert_eq!(state.get_system(SystemKey::Channel).as_deref(), Some("VOICE"));
        assert_eq!(state.get_system(SystemKey::TextToSpeechVoice).as_deref(), Some("Joanna"));
        assert_eq!(state.get_system(SystemKey::LastUserInput), None);
    }

    #[test]
    fn test_load_flow_json() {
        let mut sim = Simulator::new();
        sim.load_flow_json(&flow_json("Main")).unwrap();
        sim.load_flow_json(&flow_json("Other")).unwrap();
        assert_eq!(sim.flows().len(), 2);
        assert!(matches!(
            sim.load_flow_json("[]"),
            Err(CallError::FlowParseError(_))
        ));
    }

    #[test]
    fn test_set_starting_flow_requires_loaded_flow() {
        let mut sim = Simulator::new();
        assert!(matches!(
            sim.set_starting_flow_for("+44", "Main"),
            Err(CallError::FlowNotFound(_))
        ));
        sim.load_flow_json(&flow_json("Main")).unwrap();
        sim.set_starting_flow_for("+44", "Main").unwrap();
    }

    #[tokio::test]
    async fn test_start_call_errors() {
        let mut sim = Simulator::new();
        sim.load_flow_json(&flow_json("Main")).unwrap();
        sim.set_starting_flow_for("+44", "Main").unwrap();

        assert!(matches!(
            sim.start_call(CallConfig::new("+1", "")),
            Err(CallError::MissingDestination)
        ));
        assert!(matches!(
            sim.start_call(CallConfig::new("+1", "+99")),
            Err(CallError::NoStartingFlow(ref tel)) if tel == "+99"
        ));
        assert!(sim.start_call(CallConfig::new("+1", "+44")).is_ok());
    }

    #[test]
    fn test_with_config() {
        let sim = Simulator::new().with_config(EngineConfig {
            max_steps: 5,
            ..EngineConfig::default()
        });
        assert_eq!(sim.config().max_steps, 5);
    }
}
