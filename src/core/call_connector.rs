//! The connector a live call hands to its runners, and the driver-facing
//! ends of its channels.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;

use crate::core::call_state::CallState;
use crate::core::connector::{Connector, LambdaOutcome};
use crate::core::event_log::{CallEvent, EventLog};
use crate::core::flow_set::Setup;
use crate::core::status::CallStatus;
use crate::error::BlockResult;
use crate::flow::{BlockId, SystemKey};

/// Speech sent to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub text: String,
    pub ssml: bool,
}

/// Driver side of a call: receives prompts, delivers keys, observes status
/// and events.
pub struct CallChannels {
    pub prompts: mpsc::UnboundedReceiver<Prompt>,
    pub keys: mpsc::UnboundedSender<char>,
    pub status: watch::Receiver<CallStatus>,
    pub last_prompt: Arc<Mutex<Option<Prompt>>>,
    pub events: EventLog,
}

pub struct CallConnector {
    state: CallState,
    setup: Arc<Setup>,
    events: EventLog,
    prompt_tx: mpsc::UnboundedSender<Prompt>,
    last_prompt: Arc<Mutex<Option<Prompt>>>,
    keys: tokio::sync::Mutex<mpsc::UnboundedReceiver<char>>,
    status_tx: watch::Sender<CallStatus>,
}

impl CallConnector {
    /// Creates the connector for one call together with its driver channels.
    pub fn open(setup: Arc<Setup>, state: CallState) -> (Self, CallChannels) {
        let (prompt_tx, prompts) = mpsc::unbounded_channel();
        let (keys_tx, keys_rx) = mpsc::unbounded_channel();
        let (status_tx, status) = watch::channel(CallStatus::Ready);
        let last_prompt = Arc::new(Mutex::new(None));
        let events = EventLog::new();

        let connector = CallConnector {
            state,
            setup,
            events: events.clone(),
            prompt_tx,
            last_prompt: last_prompt.clone(),
            keys: tokio::sync::Mutex::new(keys_rx),
            status_tx,
        };
        let channels = CallChannels {
            prompts,
            keys: keys_tx,
            status,
            last_prompt,
            events,
        };
        (connector, channels)
    }

    pub fn setup(&self) -> &Setup {
        &self.setup
    }

    pub fn set_status(&self, status: CallStatus) {
        self.status_tx.send_replace(status);
    }

    /// Ends the event log. Nothing the call does afterwards is observable.
    pub fn close(&self) {
        self.events.close();
    }
}

impl Drop for CallConnector {
    fn drop(&mut self) {
        self.events.close();
        // An aborted call never reports its own end.
        self.status_tx.send_if_modified(|status| {
            if status.is_terminal() {
                false
            } else {
                *status = CallStatus::Ended;
                true
            }
        });
    }
}

#[async_trait]
impl Connector for CallConnector {
    fn send(&self, text: &str, ssml: bool) {
        let prompt = Prompt {
            text: text.to_string(),
            ssml,
        };
        tracing::debug!(text, ssml, "prompt sent");
        *self.last_prompt.lock() = Some(prompt.clone());
        let _ = self.prompt_tx.send(prompt);
        self.events.push(CallEvent::Prompt {
            text: text.to_string(),
            ssml,
        });
    }

    async fn receive(&self, max_digits: usize, timeout: Duration, terminator: char) -> Option<String> {
        self.set_status(CallStatus::WaitingForInput);
        let deadline = Instant::now() + timeout;
        let mut keys = self.keys.lock().await;
        let mut digits = String::new();

        // max_digits of zero means no limit
        while max_digits == 0 || digits.chars().count() < max_digits {
            match tokio::time::timeout_at(deadline, keys.recv()).await {
                Ok(Some(key)) if key == terminator => break,
                Ok(Some(key)) => digits.push(key),
                Ok(None) | Err(_) => break,
            }
        }
        drop(keys);
        self.set_status(CallStatus::Running);

        if digits.is_empty() {
            tracing::debug!(timeout_secs = timeout.as_secs(), "receive timed out");
            return None;
        }
        self.events.push(CallEvent::Input {
            digits: digits.clone(),
        });
        Some(digits)
    }

    fn get_external(&self, key: &str) -> Option<String> {
        self.state.get_external(key)
    }

    fn set_external(&self, key: &str, value: String) {
        self.state.set_external(key, value)
    }

    fn clear_external(&self) {
        self.state.clear_external()
    }

    fn get_contact_data(&self, key: &str) -> Option<String> {
        self.state.get_contact_data(key)
    }

    fn set_contact_data(&self, key: &str, value: String) {
        self.state.set_contact_data(key, value)
    }

    fn contact_data(&self) -> HashMap<String, String> {
        self.state.contact_data()
    }

    fn get_system(&self, key: SystemKey) -> Option<String> {
        self.state.get_system(key)
    }

    fn set_system(&self, key: SystemKey, value: String) {
        self.state.set_system(key, value)
    }

    async fn invoke_lambda(&self, arn: &str, payload: Value, timeout: Duration) -> BlockResult<LambdaOutcome> {
        self.setup.hooks.invoke_lambda(arn, payload, timeout).await
    }

    fn default_lambda_timeout(&self) -> Duration {
        Duration::from_secs(self.setup.config.lambda_timeout_secs)
    }

    fn get_flow_start(&self, flow_name: &str) -> Option<BlockId> {
        self.setup.flows.flow_start(flow_name)
    }

    fn emit(&self, event: CallEvent) {
        self.events.push(event);
    }

    fn is_in_hours(&self, name: &str, is_queue: bool) -> Result<bool, String> {
        let now = self.setup.context.time_provider.now();
        self.setup.hooks.is_in_hours(name, is_queue, now)
    }

    fn encrypt(&self, plaintext: &str, key_id: &str, certificate: &[u8]) -> Vec<u8> {
        self.setup.hooks.encrypt(plaintext, key_id, certificate)
    }
}
