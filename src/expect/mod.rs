//! Assertions over the ordered event stream of a call.
//!
//! By default each assertion must match the next applicable event after the
//! previous assertion's match (a cursor shared by every [`Expect`] taken from
//! the same call). `unordered()` searches everything after the cursor without
//! moving it; `never()` fails if any applicable event after the cursor has
//! the asserted payload.
//!
//! Assertions wait on a live call until they can decide, the call ends, or
//! the configured assertion timeout elapses.

pub mod matchers;

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;

use crate::core::event_log::{CallEvent, EventLog};
use matchers::{
    AttributeMatcher, FlowTransferMatcher, LambdaMatcher, MatchResult, Matcher,
    NumberTransferMatcher, PromptMatcher, QueueTransferMatcher,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssertionFailure {
    #[error("expected {expected} but got '{got}'")]
    Mismatch { expected: String, got: String },
    #[error("expected {expected} but no matching event found")]
    NotFound { expected: String },
    #[error("expected never {expected} but got '{got}'")]
    Unexpected { expected: String, got: String },
}

pub type AssertionResult = Result<(), AssertionFailure>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Ordered,
    Unordered,
    Never,
}

enum Step {
    Decided(AssertionResult),
    Undecided,
}

#[derive(Clone)]
pub struct Expect {
    log: EventLog,
    cursor: Arc<Mutex<usize>>,
    timeout: Duration,
}

impl Expect {
    pub fn new(log: EventLog, cursor: Arc<Mutex<usize>>, timeout: Duration) -> Self {
        Expect { log, cursor, timeout }
    }

    pub fn transfer(&self) -> TransferContext {
        TransferContext(Context::new(self.clone()))
    }

    pub fn prompt(&self) -> PromptContext {
        PromptContext(Context::new(self.clone()))
    }

    pub fn lambda(&self) -> LambdaContext {
        LambdaContext(Context::new(self.clone()))
    }

    pub fn attributes(&self) -> AttributesContext {
        AttributesContext(Context::new(self.clone()))
    }

    /// Index of the first event the next ordered assertion will look at.
    pub fn position(&self) -> usize {
        *self.cursor.lock()
    }

    /// Checks `matcher` against the log, waiting for more events while the
    /// answer is still open.
    pub async fn run(&self, matcher: &dyn Matcher, mode: Mode) -> AssertionResult {
        let deadline = Instant::now() + self.timeout;
        loop {
            let from = self.position();
            let (events, closed) = self.log.snapshot_from(from);

            let step = match mode {
                Mode::Ordered => self.check_ordered(matcher, from, &events),
                Mode::Unordered => check_unordered(matcher, &events),
                Mode::Never => check_never(matcher, &events),
            };
            if let Step::Decided(result) = step {
                return result;
            }

            let seen = from + events.len();
            if closed || tokio::time::timeout_at(deadline, self.log.changed(seen)).await.is_err() {
                tracing::debug!(expected = %matcher.expected(), ?mode, "assertion settled without a match");
                return match mode {
                    Mode::Never => Ok(()),
                    Mode::Ordered | Mode::Unordered => Err(AssertionFailure::NotFound {
                        expected: matcher.expected(),
                    }),
                };
            }
        }
    }

    fn check_ordered(&self, matcher: &dyn Matcher, from: usize, events: &[CallEvent]) -> Step {
        for (i, event) in events.iter().enumerate() {
            let result = match matcher.check(event) {
                MatchResult::NotApplicable => continue,
                MatchResult::Pass(_) => Ok(()),
                MatchResult::Fail(got) => Err(AssertionFailure::Mismatch {
                    expected: matcher.expected(),
                    got,
                }),
            };
            *self.cursor.lock() = from + i + 1;
            return Step::Decided(result);
        }
        Step::Undecided
    }
}

fn check_unordered(matcher: &dyn Matcher, events: &[CallEvent]) -> Step {
    if events
        .iter()
        .any(|e| matches!(matcher.check(e), MatchResult::Pass(_)))
    {
        Step::Decided(Ok(()))
    } else {
        Step::Undecided
    }
}

fn check_never(matcher: &dyn Matcher, events: &[CallEvent]) -> Step {
    let hit = events.iter().find_map(|e| match matcher.check(e) {
        MatchResult::Pass(got) => Some(got),
        _ => None,
    });
    match hit {
        Some(got) => Step::Decided(Err(AssertionFailure::Unexpected {
            expected: matcher.expected(),
            got,
        })),
        None => Step::Undecided,
    }
}

/// Mode shared by the fluent assertion contexts.
#[derive(Clone)]
struct Context {
    expect: Expect,
    mode: Mode,
}

impl Context {
    fn new(expect: Expect) -> Self {
        Context {
            expect,
            mode: Mode::Ordered,
        }
    }

    async fn run(&self, matcher: impl Matcher) -> AssertionResult {
        self.expect.run(&matcher, self.mode).await
    }
}

macro_rules! modifiers {
    ($name:ident) => {
        impl $name {
            /// Matches anywhere after the cursor, without moving it.
            pub fn unordered(mut self) -> Self {
                self.0.mode = Mode::Unordered;
                self
            }

            /// Asserts the following never happens for the rest of the call.
            pub fn never(mut self) -> Self {
                self.0.mode = Mode::Never;
                self
            }
        }
    };
}

pub struct TransferContext(Context);
modifiers!(TransferContext);

impl TransferContext {
    pub async fn to_queue(&self, name: &str) -> AssertionResult {
        self.0.run(QueueTransferMatcher(name.to_string())).await
    }

    pub async fn to_flow(&self, name: &str) -> AssertionResult {
        self.0.run(FlowTransferMatcher(name.to_string())).await
    }

    pub async fn to_number(&self, number: &str) -> AssertionResult {
        self.0.run(NumberTransferMatcher(number.to_string())).await
    }
}

pub struct PromptContext(Context);
modifiers!(PromptContext);

impl PromptContext {
    pub async fn to_contain(&self, text: &str) -> AssertionResult {
        self.0.run(PromptMatcher::Contains(text.to_string())).await
    }

    pub async fn to_equal(&self, text: &str) -> AssertionResult {
        self.0.run(PromptMatcher::Equals(text.to_string())).await
    }
}

pub struct LambdaContext(Context);
modifiers!(LambdaContext);

impl LambdaContext {
    /// `name` is matched against the invoked ARN by substring.
    pub async fn to_be_invoked(&self, name: &str) -> AssertionResult {
        self.0.run(LambdaMatcher(name.to_string())).await
    }
}

pub struct AttributesContext(Context);
modifiers!(AttributesContext);

impl AttributesContext {
    pub async fn to_be_set(&self, key: &str, value: &str) -> AssertionResult {
        self.0
            .run(AttributeMatcher {
                key: key.to_string(),
                value: value.to_string(),
            })
            .await
    }
}
