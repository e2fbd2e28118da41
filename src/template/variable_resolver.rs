use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

use crate::error::BlockError;
use crate::flow::{Namespace, Parameter, SystemKey};

/// Read access to the three lookup namespaces of a call.
pub trait ValueLookup {
    fn lookup(&self, namespace: Namespace, key: &str) -> Option<String>;
}

fn reference_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\.(External|Attributes|System)\.").expect("reference pattern is valid")
    })
}

fn key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_\-]+").expect("key pattern is valid"))
}

/// Key of a reference whose namespace prefix ends right before `rest`.
fn reference_key(namespace: Namespace, rest: &str) -> Option<&str> {
    if namespace == Namespace::System {
        if let Some(name) = SystemKey::longest_prefix(rest) {
            return Some(&rest[..name.len()]);
        }
    }
    key_pattern().find(rest).map(|m| m.as_str())
}

fn reference_namespace(name: &str) -> Option<Namespace> {
    match name {
        "External" => Some(Namespace::External),
        "Attributes" => Some(Namespace::UserDefined),
        "System" => Some(Namespace::System),
        _ => None,
    }
}

/// Replaces every `$.<Namespace>.<key>` reference in `text` with its looked-up
/// value. References whose key is not found stay in place verbatim.
pub fn resolve_text<L: ValueLookup + ?Sized>(text: &str, lookup: &L) -> String {
    if !text.contains("$.") {
        return text.to_string();
    }
    let mut resolved = String::with_capacity(text.len());
    let mut copied = 0;
    for caps in reference_pattern().captures_iter(text) {
        let (Some(prefix), Some(namespace)) = (caps.get(0), reference_namespace(&caps[1])) else {
            continue;
        };
        let Some(key) = reference_key(namespace, &text[prefix.end()..]) else {
            continue;
        };
        if let Some(value) = lookup.lookup(namespace, key) {
            resolved.push_str(&text[copied..prefix.start()]);
            resolved.push_str(&value);
            copied = prefix.end() + key.len();
        }
    }
    resolved.push_str(&text[copied..]);
    resolved
}

/// Textual form of a raw parameter value, used as a lookup key.
pub fn value_as_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Resolves a parameter's value. Without a namespace the raw value is
/// returned unchanged; with one, the value is a key and a miss gives `None`.
pub fn resolve_parameter<L: ValueLookup + ?Sized>(param: &Parameter, lookup: &L) -> Option<Value> {
    match param.namespace {
        None => Some(param.value.clone()),
        Some(ns) => lookup
            .lookup(ns, &value_as_text(&param.value))
            .map(Value::String),
    }
}

/// Resolves a parameter that must be text, then substitutes inline
/// references. A namespace miss reads as the empty string.
pub fn resolve_text_parameter<L: ValueLookup + ?Sized>(
    param: &Parameter,
    lookup: &L,
) -> Result<String, BlockError> {
    match resolve_parameter(param, lookup) {
        None => Ok(String::new()),
        Some(Value::String(s)) => Ok(resolve_text(&s, lookup)),
        Some(other) => Err(BlockError::InvalidParameter {
            name: param.name.clone(),
            reason: format!("expected text but got {}", other),
        }),
    }
}
