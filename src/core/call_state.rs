//! Per-call key/value stores backing the three lookup namespaces.

use parking_lot::RwLock;
use std::collections::HashMap;

use crate::flow::SystemKey;

/// Mutable state owned by exactly one call.
///
/// - external: the flattened output of the most recent lambda invocation
/// - contact data: caller attributes (User Defined namespace)
/// - system: values maintained by the contact center itself
#[derive(Debug, Default)]
pub struct CallState {
    external: RwLock<HashMap<String, String>>,
    contact_data: RwLock<HashMap<String, String>>,
    system: RwLock<HashMap<SystemKey, String>>,
}

impl CallState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_external(&self, key: &str) -> Option<String> {
        self.external.read().get(key).cloned()
    }

    pub fn set_external(&self, key: &str, value: String) {
        self.external.write().insert(key.to_string(), value);
    }

    pub fn clear_external(&self) {
        self.external.write().clear();
    }

    pub fn get_contact_data(&self, key: &str) -> Option<String> {
        self.contact_data.read().get(key).cloned()
    }

    pub fn set_contact_data(&self, key: &str, value: String) {
        self.contact_data.write().insert(key.to_string(), value);
    }

    pub fn contact_data(&self) -> HashMap<String, String> {
        self.contact_data.read().clone()
    }

    pub fn get_system(&self, key: SystemKey) -> Option<String> {
        self.system.read().get(&key).cloned()
    }

    pub fn set_system(&self, key: SystemKey, value: String) {
        self.system.write().insert(key, value);
    }
}
