//! Recording connector used by the runner unit tests.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::core::call_state::CallState;
use crate::core::connector::{Connector, LambdaOutcome};
use crate::core::event_log::CallEvent;
use crate::core::hooks::{Hooks, LambdaHandler};
use crate::error::BlockResult;
use crate::flow::{Block, BlockId, SystemKey};

pub fn block(value: Value) -> Block {
    serde_json::from_value(value).unwrap()
}

#[derive(Default)]
pub struct TestCall {
    state: CallState,
    hooks: Hooks,
    flows: HashMap<String, BlockId>,
    input: Mutex<Option<String>>,
    sent: Mutex<Vec<(String, bool)>>,
    receives: Mutex<Vec<(usize, Duration, char)>>,
    events: Mutex<Vec<CallEvent>>,
}

impl TestCall {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next `receive` returns `input`; without it, `receive` times out.
    pub fn with_input(self, input: &str) -> Self {
        *self.input.lock() = Some(input.to_string());
        self
    }

    pub fn with_flow(mut self, name: &str, start: &str) -> Self {
        self.flows.insert(name.to_string(), BlockId::from(start));
        self
    }

    pub fn with_lambda(mut self, name: &str, handler: Arc<dyn LambdaHandler>) -> Self {
        self.hooks.register_lambda(name, handler);
        self
    }

    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn sent(&self) -> Vec<(String, bool)> {
        self.sent.lock().clone()
    }

    pub fn receives(&self) -> Vec<(usize, Duration, char)> {
        self.receives.lock().clone()
    }

    pub fn events(&self) -> Vec<CallEvent> {
        self.events.lock().clone()
    }
}

#[async_trait]
impl Connector for TestCall {
    fn send(&self, text: &str, ssml: bool) {
        self.sent.lock().push((text.to_string(), ssml));
    }

    async fn receive(&self, max_digits: usize, timeout: Duration, terminator: char) -> Option<String> {
        self.receives.lock().push((max_digits, timeout, terminator));
        self.input.lock().take()
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
        self.hooks.invoke_lambda(arn, payload, timeout).await
    }

    fn get_flow_start(&self, flow_name: &str) -> Option<BlockId> {
        self.flows.get(flow_name).cloned()
    }

    fn emit(&self, event: CallEvent) {
        self.events.lock().push(event);
    }

    fn is_in_hours(&self, name: &str, is_queue: bool) -> Result<bool, String> {
        self.hooks.is_in_hours(name, is_queue, Utc::now())
    }

    fn encrypt(&self, plaintext: &str, key_id: &str, certificate: &[u8]) -> Vec<u8> {
        self.hooks.encrypt(plaintext, key_id, certificate)
    }
}
