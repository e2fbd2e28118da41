use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::CallError;

/// Opaque identifier of a block, unique within the loaded flow set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(pub String);

impl BlockId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlockId {
    fn from(value: &str) -> Self {
        BlockId(value.to_string())
    }
}

impl From<String> for BlockId {
    fn from(value: String) -> Self {
        BlockId(value)
    }
}

/// Generates a string-backed enum whose unknown values are kept verbatim in
/// an `Other` variant, so exports from newer product versions still load.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($variant,)+
            Other(String),
        }

        impl $name {
            pub fn as_str(&self) -> &str {
                match self {
                    $($name::$variant => $text,)+
                    $name::Other(s) => s.as_str(),
                }
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                match value.as_str() {
                    $($text => $name::$variant,)+
                    _ => $name::Other(value),
                }
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                $name::from(value.to_string())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.as_str().to_string()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_enum! {
    /// Type tag of a block.
    BlockType {
        StoreUserInput => "StoreUserInput",
        CheckAttribute => "CheckAttribute",
        Transfer => "Transfer",
        PlayPrompt => "PlayPrompt",
        Disconnect => "Disconnect",
        SetQueue => "SetQueue",
        GetUserInput => "GetUserInput",
        SetAttributes => "SetAttributes",
        InvokeExternalResource => "InvokeExternalResource",
        CheckHoursOfOperation => "CheckHoursOfOperation",
        SetVoice => "SetVoice",
        // No longer produced by the flow designer.
        SetScreenPop => "SetScreenPop",
        StoreCustomerInput => "StoreCustomerInput",
        PlayAudio => "PlayAudio",
        TransferToFlow => "TransferToFlow",
        CustomerInQueue => "CustomerInQueue",
    }
}

impl BlockType {
    pub fn is_deprecated(&self) -> bool {
        matches!(
            self,
            BlockType::SetScreenPop
                | BlockType::StoreCustomerInput
                | BlockType::PlayAudio
                | BlockType::TransferToFlow
                | BlockType::CustomerInQueue
        )
    }
}

string_enum! {
    /// Qualifier used by multi-behaviour blocks such as Transfer.
    BlockTarget {
        Flow => "Flow",
        Lambda => "Lambda",
        Queue => "Queue",
        Digits => "Digits",
        PhoneNumber => "PhoneNumber",
    }
}

string_enum! {
    /// Label of an outgoing branch.
    BranchCondition {
        Success => "Success",
        Error => "Error",
        NoMatch => "NoMatch",
        Evaluate => "Evaluate",
        Timeout => "Timeout",
        True => "True",
        False => "False",
        AtCapacity => "AtCapacity",
    }
}

string_enum! {
    /// Comparison operator of an Evaluate branch.
    ConditionType {
        Equals => "Equals",
        Contains => "Contains",
        GreaterThan => "GreaterThan",
        GreaterThanOrEqualTo => "GreaterThanOrEqualTo",
        LessThan => "LessThan",
        LessThanOrEqualTo => "LessThanOrEqualTo",
    }
}

/// Scope a dynamic parameter value is looked up from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Namespace {
    External,
    System,
    #[serde(rename = "User Defined")]
    UserDefined,
}

impl Namespace {
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "External" => Some(Namespace::External),
            "System" => Some(Namespace::System),
            "User Defined" | "UserDefined" | "Attributes" => Some(Namespace::UserDefined),
            _ => None,
        }
    }
}

/// A single outgoing edge of a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub condition: BranchCondition,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub condition_type: Option<ConditionType>,
    #[serde(default)]
    pub condition_value: Option<Value>,
    pub transition: BlockId,
}

/// Ordered outgoing edges of a block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BranchList(pub Vec<Branch>);

impl BranchList {
    /// Successor linked by the first branch with the given label.
    pub fn get_link(&self, condition: &BranchCondition) -> Option<BlockId> {
        self.0
            .iter()
            .find(|b| &b.condition == condition)
            .map(|b| b.transition.clone())
    }

    /// All branches with the given label, in declaration order.
    pub fn list(&self, condition: &BranchCondition) -> Vec<&Branch> {
        self.0.iter().filter(|b| &b.condition == condition).collect()
    }
}

/// A named parameter configuring a block.
///
/// When `namespace` is set, `value` is a lookup key into that namespace rather
/// than a literal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: String,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub value: Value,
    #[serde(default)]
    pub namespace: Option<Namespace>,
    #[serde(default)]
    pub resource_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterList(pub Vec<Parameter>);

impl ParameterList {
    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.0.iter().find(|p| p.name == name)
    }

    /// Use when several parameters share a name (lambda inputs, attributes).
    pub fn list(&self, name: &str) -> Vec<&Parameter> {
        self.0.iter().filter(|p| p.name == name).collect()
    }
}

/// One node of a contact flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    #[serde(rename = "type")]
    pub block_type: BlockType,
    #[serde(default)]
    pub branches: BranchList,
    #[serde(default)]
    pub parameters: ParameterList,
    #[serde(default)]
    pub metadata: Option<Value>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub target: Option<BlockTarget>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowMetadata {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "type")]
    pub flow_type: String,
}

/// An exported contact flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flow {
    #[serde(rename = "modules")]
    pub blocks: Vec<Block>,
    pub start: BlockId,
    pub metadata: FlowMetadata,
}

impl Flow {
    pub fn from_json(json: &str) -> Result<Self, CallError> {
        serde_json::from_str(json).map_err(|e| CallError::FlowParseError(e.to_string()))
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }
}

fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: From<String>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.is_empty()).map(T::from))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_block_deserialize() {
        let block: Block = serde_json::from_value(json!({
            "id": "b1",
            "type": "Transfer",
            "target": "Queue",
            "branches": [
                {"condition": "Success", "transition": "b2"},
                {"condition": "Error", "transition": "b3"}
            ],
            "parameters": [
                {"name": "Queue", "value": "arn:queue/1", "resourceName": "Support", "namespace": null}
            ]
        }))
        .unwrap();

        assert_eq!(block.block_type, BlockType::Transfer);
        assert_eq!(block.target, Some(BlockTarget::Queue));
        assert_eq!(
            block.parameters.get("Queue").unwrap().resource_name.as_deref(),
            Some("Support")
        );
        assert!(block.parameters.get("Nope").is_none());
    }

    #[test]
    fn test_unknown_type_kept_verbatim() {
        let block: Block =
            serde_json::from_value(json!({"id": "x", "type": "WhatIsThisIDontEven", "target": ""}))
                .unwrap();
        assert_eq!(block.block_type, BlockType::Other("WhatIsThisIDontEven".into()));
        assert_eq!(block.target, None);
        assert_eq!(block.block_type.to_string(), "WhatIsThisIDontEven");
    }

    #[test]
    fn test_deprecated_types() {
        for t in ["SetScreenPop", "StoreCustomerInput", "PlayAudio", "TransferToFlow", "CustomerInQueue"] {
            assert!(BlockType::from(t).is_deprecated(), "{}", t);
        }
        assert!(!BlockType::PlayPrompt.is_deprecated());
        assert!(!BlockType::Other("Brand new".into()).is_deprecated());
    }

    #[test]
    fn test_get_link_returns_first_match() {
        let branches: BranchList = serde_json::from_value(json!([
            {"condition": "Evaluate", "conditionType": "Equals", "conditionValue": "1", "transition": "e1"},
            {"condition": "Success", "transition": "s1"},
            {"condition": "Success", "transition": "s2"},
            {"condition": "Evaluate", "conditionType": "Equals", "conditionValue": "2", "transition": "e2"}
        ]))
        .unwrap();

        assert_eq!(branches.get_link(&BranchCondition::Success), Some(BlockId::from("s1")));
        assert_eq!(branches.get_link(&BranchCondition::Error), None);
        let evaluates = branches.list(&BranchCondition::Evaluate);
        assert_eq!(evaluates.len(), 2);
        assert_eq!(evaluates[1].transition, BlockId::from("e2"));
    }

    #[test]
    fn test_user_defined_namespace() {
        let param: Parameter = serde_json::from_value(json!({
            "name": "Attribute", "key": "k", "value": "v", "namespace": "User Defined"
        }))
        .unwrap();
        assert_eq!(param.namespace, Some(Namespace::UserDefined));
    }

    #[test]
    fn test_flow_from_json_error() {
        let err = Flow::from_json("{not json").unwrap_err();
        assert!(matches!(err, CallError::FlowParseError(_)));
    }
}
