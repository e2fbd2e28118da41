//! Caller-supplied behaviour shared read-only by every call: lambda handlers,
//! the encryption hook and the hours-of-operation check.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{BlockError, BlockResult};

/// Handles an external function invocation. The input is the contact-flow
/// event payload; the output must be a flat JSON object. `Err` is a business
/// error and routes the block down its Error branch.
#[async_trait]
pub trait LambdaHandler: Send + Sync {
    async fn invoke(&self, event: Value) -> Result<Value, String>;
}

#[async_trait]
impl<F> LambdaHandler for F
where
    F: Fn(Value) -> Result<Value, String> + Send + Sync,
{
    async fn invoke(&self, event: Value) -> Result<Value, String> {
        (self)(event)
    }
}

pub type EncryptFn = dyn Fn(&str, &str, &[u8]) -> Vec<u8> + Send + Sync;
pub type InHoursFn = dyn Fn(&str, bool, DateTime<Utc>) -> Result<bool, String> + Send + Sync;

#[derive(Clone)]
pub struct Hooks {
    lambdas: Vec<(String, Arc<dyn LambdaHandler>)>,
    encrypt: Arc<EncryptFn>,
    in_hours: Arc<InHoursFn>,
}

impl Default for Hooks {
    fn default() -> Self {
        Self {
            lambdas: Vec::new(),
            encrypt: Arc::new(|plaintext: &str, _key_id: &str, _cert: &[u8]| {
                plaintext.as_bytes().to_vec()
            }),
            in_hours: Arc::new(|_name: &str, _is_queue: bool, _now: DateTime<Utc>| -> Result<bool, String> {
                Ok(true)
            }),
        }
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field(
                "lambdas",
                &self.lambdas.iter().map(|(name, _)| name).collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

impl Hooks {
    /// A later registration with the same name fragment replaces the earlier one.
    pub fn register_lambda(&mut self, name: &str, handler: Arc<dyn LambdaHandler>) {
        if let Some(slot) = self.lambdas.iter_mut().find(|(n, _)| n == name) {
            slot.1 = handler;
        } else {
            self.lambdas.push((name.to_string(), handler));
        }
    }

    /// First handler, in registration order, whose name appears in `arn`.
    pub fn find_lambda(&self, arn: &str) -> Option<Arc<dyn LambdaHandler>> {
        self.lambdas
            .iter()
            .find(|(name, _)| arn.contains(name.as_str()))
            .map(|(_, handler)| handler.clone())
    }

    /// Runs the handler matching `arn` under `timeout`. Only a missing
    /// handler is an `Err`; a business error or a time-out is an outcome.
    pub async fn invoke_lambda(
        &self,
        arn: &str,
        payload: Value,
        timeout: Duration,
    ) -> BlockResult<Result<Value, String>> {
        let handler = self
            .find_lambda(arn)
            .ok_or_else(|| BlockError::UnknownLambda(arn.to_string()))?;
        match tokio::time::timeout(timeout, handler.invoke(payload)).await {
            Ok(outcome) => Ok(outcome),
            Err(_) => {
                tracing::warn!(arn, timeout_secs = timeout.as_secs(), "lambda timed out");
                Ok(Err(format!("lambda timed out after {}s", timeout.as_secs())))
            }
        }
    }

    pub fn set_encrypt(&mut self, encrypt: Arc<EncryptFn>) {
        self.encrypt = encrypt;
    }

    pub fn set_in_hours(&mut self, in_hours: Arc<InHoursFn>) {
        self.in_hours = in_hours;
    }

    pub fn encrypt(&self, plaintext: &str, key_id: &str, certificate: &[u8]) -> Vec<u8> {
        (self.encrypt)(plaintext, key_id, certificate)
    }

    pub fn is_in_hours(&self, name: &str, is_queue: bool, now: DateTime<Utc>) -> Result<bool, String> {
        (self.in_hours)(name, is_queue, now)
    }
}
