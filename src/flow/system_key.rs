use std::fmt;

/// A value that can be looked up from the System namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemKey {
    LastUserInput,
    CustomerNumber,
    DialedNumber,
    CustomerCallback,
    QueueName,
    QueueArn,
    QueueOutboundNumber,
    TextToSpeechVoice,
    ContactId,
    InitialContactId,
    PreviousContactId,
    Channel,
    InstanceArn,
    InitiationMethod,
}

const ALL_KEYS: [SystemKey; 14] = [
    SystemKey::LastUserInput,
    SystemKey::CustomerNumber,
    SystemKey::DialedNumber,
    SystemKey::CustomerCallback,
    SystemKey::QueueName,
    SystemKey::QueueArn,
    SystemKey::QueueOutboundNumber,
    SystemKey::TextToSpeechVoice,
    SystemKey::ContactId,
    SystemKey::InitialContactId,
    SystemKey::PreviousContactId,
    SystemKey::Channel,
    SystemKey::InstanceArn,
    SystemKey::InitiationMethod,
];

impl SystemKey {
    /// Name used as the parameter value of System-namespaced parameters.
    pub fn as_str(&self) -> &'static str {
        match self {
            SystemKey::LastUserInput => "Stored customer input",
            SystemKey::CustomerNumber => "Customer Number",
            SystemKey::DialedNumber => "Dialed Number",
            SystemKey::CustomerCallback => "Customer callback number",
            SystemKey::QueueName => "Queue.Name",
            SystemKey::QueueArn => "Queue.ARN",
            SystemKey::QueueOutboundNumber => "Queue.OutboundCallerId.Address",
            SystemKey::TextToSpeechVoice => "TextToSpeechVoiceId",
            SystemKey::ContactId => "ContactId",
            SystemKey::InitialContactId => "InitialContactId",
            SystemKey::PreviousContactId => "PreviousContactId",
            SystemKey::Channel => "Channel",
            SystemKey::InstanceArn => "InstanceARN",
            SystemKey::InitiationMethod => "InitiationMethod",
        }
    }

    /// Compact form usable inside `$.System.<key>` text references.
    pub fn path(&self) -> &'static str {
        match self {
            SystemKey::LastUserInput => "StoredCustomerInput",
            SystemKey::CustomerNumber => "CustomerNumber",
            SystemKey::DialedNumber => "DialedNumber",
            SystemKey::CustomerCallback => "CustomerCallbackNumber",
            SystemKey::QueueName => "QueueName",
            SystemKey::QueueArn => "QueueARN",
            SystemKey::QueueOutboundNumber => "QueueOutboundCallerId",
            other => other.as_str(),
        }
    }

    /// Accepts either the exported name or the compact path form.
    pub fn parse(text: &str) -> Option<Self> {
        ALL_KEYS
            .iter()
            .copied()
            .find(|k| k.as_str() == text || k.path() == text)
    }

    /// Longest exported name or path that `text` starts with. Exported names
    /// may contain dots and spaces, so references embedded in running text
    /// are matched against the known names rather than a character class.
    pub fn longest_prefix(text: &str) -> Option<&'static str> {
        ALL_KEYS
            .iter()
            .flat_map(|k| [k.as_str(), k.path()])
            .filter(|name| text.starts_with(name))
            .max_by_key(|name| name.len())
    }
}

impl fmt::Display for SystemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
