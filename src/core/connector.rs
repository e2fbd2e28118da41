//! The capability set a running block needs from the call hosting it.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

use crate::core::event_log::CallEvent;
use crate::error::BlockResult;
use crate::flow::{BlockId, Namespace, SystemKey};
use crate::template::ValueLookup;

/// Result of a lambda invocation that reached its handler: the output
/// payload, or the business error the handler reported.
pub type LambdaOutcome = Result<Value, String>;

pub const DEFAULT_LAMBDA_TIMEOUT_SECS: u64 = 8;

#[async_trait]
pub trait Connector: Send + Sync {
    /// Speaks `text` to the caller. Never blocks.
    fn send(&self, text: &str, ssml: bool);

    /// Collects up to `max_digits` keys, stopping early at `terminator`.
    /// `None` when `timeout` elapses before any key arrives.
    async fn receive(&self, max_digits: usize, timeout: Duration, terminator: char) -> Option<String>;

    fn get_external(&self, key: &str) -> Option<String>;
    fn set_external(&self, key: &str, value: String);
    fn clear_external(&self);

    fn get_contact_data(&self, key: &str) -> Option<String>;
    fn set_contact_data(&self, key: &str, value: String);
    fn contact_data(&self) -> HashMap<String, String>;

    fn get_system(&self, key: SystemKey) -> Option<String>;
    fn set_system(&self, key: SystemKey, value: String);

    /// `Err` only when no handler matches `arn`; handler failures and
    /// time-outs come back as `Ok(Err(..))`.
    async fn invoke_lambda(&self, arn: &str, payload: Value, timeout: Duration) -> BlockResult<LambdaOutcome>;

    /// Time limit for lambda blocks that do not set one.
    fn default_lambda_timeout(&self) -> Duration {
        Duration::from_secs(DEFAULT_LAMBDA_TIMEOUT_SECS)
    }

    fn get_flow_start(&self, flow_name: &str) -> Option<BlockId>;

    fn emit(&self, event: CallEvent);

    fn is_in_hours(&self, name: &str, is_queue: bool) -> Result<bool, String>;

    fn encrypt(&self, plaintext: &str, key_id: &str, certificate: &[u8]) -> Vec<u8>;
}

impl<C: Connector + ?Sized> ValueLookup for C {
    fn lookup(&self, namespace: Namespace, key: &str) -> Option<String> {
        match namespace {
            Namespace::External => self.get_external(key),
            Namespace::UserDefined => self.get_contact_data(key),
            Namespace::System => SystemKey::parse(key).and_then(|k| self.get_system(k)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::test_support::TestCall;

    #[test]
    fn test_lookup_by_namespace() {
        let call = TestCall::new();
        call.set_external("balance", "12".into());
        call.set_contact_data("lang", "en".into());
        call.set_system(SystemKey::QueueName, "Support".into());

        assert_eq!(call.lookup(Namespace::External, "balance").as_deref(), Some("12"));
        assert_eq!(call.lookup(Namespace::UserDefined, "lang").as_deref(), Some("en"));
        assert_eq!(call.lookup(Namespace::System, "Queue.Name").as_deref(), Some("Support"));
        assert_eq!(call.lookup(Namespace::System, "QueueName").as_deref(), Some("Support"));
        assert_eq!(call.lookup(Namespace::External, "lang"), None);
        assert_eq!(call.lookup(Namespace::System, "Unknown key"), None);
    }
}
