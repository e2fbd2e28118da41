use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::core::call_connector::{CallChannels, Prompt};
use crate::core::event_log::{CallEvent, EventLog};
use crate::core::status::CallStatus;
use crate::error::{CallError, CallResult};
use crate::expect::Expect;

/// Handle to a running or finished call.
///
/// The call runs on its own task. The handle delivers key presses, reads the
/// prompts the call speaks and asserts on the events it emits. Dropping the
/// handle abandons the call.
pub struct Call {
    contact_id: String,
    prompts: mpsc::UnboundedReceiver<Prompt>,
    keys: mpsc::UnboundedSender<char>,
    status_rx: watch::Receiver<CallStatus>,
    last_prompt: Arc<Mutex<Option<Prompt>>>,
    events: EventLog,
    cursor: Arc<Mutex<usize>>,
    assertion_timeout: Duration,
    task: JoinHandle<CallResult<()>>,
}

impl Call {
    pub(crate) fn new(
        contact_id: String,
        channels: CallChannels,
        task: JoinHandle<CallResult<()>>,
        assertion_timeout: Duration,
    ) -> Self {
        Call {
            contact_id,
            prompts: channels.prompts,
            keys: channels.keys,
            status_rx: channels.status,
            last_prompt: channels.last_prompt,
            events: channels.events,
            cursor: Arc::new(Mutex::new(0)),
            assertion_timeout,
            task,
        }
    }

    pub fn contact_id(&self) -> &str {
        &self.contact_id
    }

    /// Delivers keypad input. Keys are buffered until a block reads them.
    pub fn press(&self, digits: &str) -> CallResult<()> {
        for key in digits.chars() {
            self.keys.send(key).map_err(|_| CallError::CallEnded)?;
        }
        Ok(())
    }

    /// The next prompt the call speaks. `None` once the call has ended and
    /// every prompt has been read.
    pub async fn next_prompt(&mut self) -> Option<Prompt> {
        self.prompts.recv().await
    }

    /// The most recent prompt, whether or not it was read.
    pub fn last_prompt(&self) -> Option<Prompt> {
        self.last_prompt.lock().clone()
    }

    /// Return the current status (non-blocking).
    pub fn status(&self) -> CallStatus {
        self.status_rx.borrow().clone()
    }

    /// Block until the call reaches a terminal status.
    pub async fn wait(&self) -> CallStatus {
        let mut rx = self.status_rx.clone();
        if let Ok(status) = rx.wait_for(CallStatus::is_terminal).await {
            return status.clone();
        }
        let status = rx.borrow().clone();
        status
    }

    /// Snapshot of every event emitted so far.
    pub fn events(&self) -> Vec<CallEvent> {
        self.events.snapshot()
    }

    /// Assertions over this call's events. Every `Expect` taken from the
    /// same handle shares one ordered-match cursor.
    pub fn expect(&self) -> Expect {
        Expect::new(self.events.clone(), self.cursor.clone(), self.assertion_timeout)
    }

    /// Abandons the call. Its status becomes Ended unless it had already
    /// finished.
    pub fn terminate(&self) {
        self.task.abort();
    }
}

impl Drop for Call {
    fn drop(&mut self) {
        self.task.abort();
    }
}
