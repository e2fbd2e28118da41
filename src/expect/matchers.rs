use crate::core::event_log::CallEvent;

/// Verdict of a matcher on one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult {
    /// The event is of a kind this matcher does not look at.
    NotApplicable,
    /// Right kind and payload. Carries a description of the event.
    Pass(String),
    /// Right kind, wrong payload. Carries a description of the event.
    Fail(String),
}

impl MatchResult {
    fn decide(pass: bool, got: String) -> Self {
        if pass {
            MatchResult::Pass(got)
        } else {
            MatchResult::Fail(got)
        }
    }
}

pub trait Matcher: Send + Sync {
    fn check(&self, event: &CallEvent) -> MatchResult;

    /// Human-readable expectation, e.g. "to be transferred to queue 'Support'".
    fn expected(&self) -> String;
}

pub struct QueueTransferMatcher(pub String);

impl Matcher for QueueTransferMatcher {
    fn check(&self, event: &CallEvent) -> MatchResult {
        match event {
            CallEvent::QueueTransfer { name, .. } => MatchResult::decide(*name == self.0, name.clone()),
            _ => MatchResult::NotApplicable,
        }
    }

    fn expected(&self) -> String {
        format!("to be transferred to queue '{}'", self.0)
    }
}

pub struct FlowTransferMatcher(pub String);

impl Matcher for FlowTransferMatcher {
    fn check(&self, event: &CallEvent) -> MatchResult {
        match event {
            CallEvent::FlowTransfer { name, .. } => MatchResult::decide(*name == self.0, name.clone()),
            _ => MatchResult::NotApplicable,
        }
    }

    fn expected(&self) -> String {
        format!("to be transferred to flow '{}'", self.0)
    }
}

pub struct NumberTransferMatcher(pub String);

impl Matcher for NumberTransferMatcher {
    fn check(&self, event: &CallEvent) -> MatchResult {
        match event {
            CallEvent::NumberTransfer { number } => {
                MatchResult::decide(*number == self.0, number.clone())
            }
            _ => MatchResult::NotApplicable,
        }
    }

    fn expected(&self) -> String {
        format!("to be transferred to number '{}'", self.0)
    }
}

pub enum PromptMatcher {
    Contains(String),
    Equals(String),
}

impl Matcher for PromptMatcher {
    fn check(&self, event: &CallEvent) -> MatchResult {
        let CallEvent::Prompt { text, .. } = event else {
            return MatchResult::NotApplicable;
        };
        let pass = match self {
            PromptMatcher::Contains(want) => text.contains(want.as_str()),
            PromptMatcher::Equals(want) => text == want,
        };
        MatchResult::decide(pass, text.clone())
    }

    fn expected(&self) -> String {
        match self {
            PromptMatcher::Contains(want) => format!("prompt to contain '{}'", want),
            PromptMatcher::Equals(want) => format!("prompt to be '{}'", want),
        }
    }
}

/// Matches a lambda invocation whose ARN contains the given fragment.
pub struct LambdaMatcher(pub String);

impl Matcher for LambdaMatcher {
    fn check(&self, event: &CallEvent) -> MatchResult {
        match event {
            CallEvent::Lambda { arn, .. } => MatchResult::decide(arn.contains(self.0.as_str()), arn.clone()),
            _ => MatchResult::NotApplicable,
        }
    }

    fn expected(&self) -> String {
        format!("lambda '{}' to be invoked", self.0)
    }
}

pub struct AttributeMatcher {
    pub key: String,
    pub value: String,
}

impl Matcher for AttributeMatcher {
    fn check(&self, event: &CallEvent) -> MatchResult {
        match event {
            CallEvent::AttributeSet { key, value } => MatchResult::decide(
                *key == self.key && *value == self.value,
                format!("{}={}", key, value),
            ),
            _ => MatchResult::NotApplicable,
        }
    }

    fn expected(&self) -> String {
        format!("attribute '{}' to be set to '{}'", self.key, self.value)
    }
}
