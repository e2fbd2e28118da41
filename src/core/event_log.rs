//! Events observable during a call and the append-only log that collects them.

use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// An observable outcome of a call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CallEvent {
    /// Speech sent to the caller.
    Prompt { text: String, ssml: bool },
    /// Keypad input consumed by the flow.
    Input { digits: String },
    /// A caller attribute was written.
    AttributeSet { key: String, value: String },
    /// An external function was invoked.
    Lambda {
        arn: String,
        parameters: Value,
        output: Option<Value>,
        error: Option<String>,
    },
    FlowTransfer { arn: String, name: String },
    QueueTransfer { arn: String, name: String },
    NumberTransfer { number: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Prompt,
    Input,
    AttributeSet,
    Lambda,
    FlowTransfer,
    QueueTransfer,
    NumberTransfer,
}

impl CallEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            CallEvent::Prompt { .. } => EventKind::Prompt,
            CallEvent::Input { .. } => EventKind::Input,
            CallEvent::AttributeSet { .. } => EventKind::AttributeSet,
            CallEvent::Lambda { .. } => EventKind::Lambda,
            CallEvent::FlowTransfer { .. } => EventKind::FlowTransfer,
            CallEvent::QueueTransfer { .. } => EventKind::QueueTransfer,
            CallEvent::NumberTransfer { .. } => EventKind::NumberTransfer,
        }
    }
}

#[derive(Debug, Default)]
struct LogState {
    events: RwLock<Vec<CallEvent>>,
    closed: AtomicBool,
    notify: Notify,
}

/// Append-only event log written by one call and read by any number of
/// observers. Cloning shares the same log.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    state: Arc<LogState>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event. Ignored once the log is closed.
    pub fn push(&self, event: CallEvent) {
        {
            let mut events = self.state.events.write();
            if self.state.closed.load(Ordering::Acquire) {
                return;
            }
            events.push(event);
        }
        self.state.notify.notify_waiters();
    }

    /// Marks the log complete: the call will not emit anything further.
    pub fn close(&self) {
        {
            let _events = self.state.events.write();
            self.state.closed.store(true, Ordering::Release);
        }
        self.state.notify.notify_waiters();
    }

    pub fn is_closed(&self) -> bool {
        self.state.closed.load(Ordering::Acquire)
    }

    pub fn len(&self) -> usize {
        self.state.events.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn snapshot(&self) -> Vec<CallEvent> {
        self.state.events.read().clone()
    }

    /// Events from `from` onwards together with whether the log was already
    /// closed when they were read.
    pub fn snapshot_from(&self, from: usize) -> (Vec<CallEvent>, bool) {
        let events = self.state.events.read();
        let closed = self.state.closed.load(Ordering::Acquire);
        let tail = events.get(from..).map(|s| s.to_vec()).unwrap_or_default();
        (tail, closed)
    }

    /// Resolves once the log holds more than `seen` events or is closed.
    pub async fn changed(&self, seen: usize) {
        loop {
            let notified = self.state.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.len() > seen || self.is_closed() {
                return;
            }
            notified.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn queue(name: &str) -> CallEvent {
        CallEvent::QueueTransfer {
            arn: format!("arn:queue/{name}"),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_push_and_snapshot_from() {
        let log = EventLog::new();
        log.push(queue("a"));
        log.push(CallEvent::NumberTransfer { number: "+44".into() });

        let (tail, closed) = log.snapshot_from(1);
        assert_eq!(tail.len(), 1);
        assert_eq!(tail[0].kind(), EventKind::NumberTransfer);
        assert!(!closed);
        assert!(log.snapshot_from(5).0.is_empty());
    }

    #[test]
    fn test_push_after_close_ignored() {
        let log = EventLog::new();
        log.close();
        log.push(queue("late"));
        assert!(log.is_empty());
        assert!(log.is_closed());
    }

    #[tokio::test]
    async fn test_changed_wakes_concurrent_reader() {
        let log = EventLog::new();
        let writer = log.clone();
        let reader = tokio::spawn(async move {
            log.changed(0).await;
            log.snapshot()
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        writer.push(queue("support"));

        let seen = reader.await.unwrap();
        assert_eq!(seen, vec![queue("support")]);
    }

    #[tokio::test]
    async fn test_changed_returns_on_close() {
        let log = EventLog::new();
        let closer = log.clone();
        let waiter = tokio::spawn(async move { log.changed(0).await });
        closer.close();
        waiter.await.unwrap();
    }
}
