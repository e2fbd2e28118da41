//! Typed access to a block's parameter list.

use serde_json::Value;

use crate::error::{BlockError, BlockResult};
use crate::flow::{Block, Parameter};
use crate::template::{resolve_parameter, resolve_text, resolve_text_parameter, value_as_text, ValueLookup};

pub struct ParamReader<'a, L: ValueLookup + ?Sized> {
    block: &'a Block,
    lookup: &'a L,
}

impl<'a, L: ValueLookup + ?Sized> ParamReader<'a, L> {
    pub fn new(block: &'a Block, lookup: &'a L) -> Self {
        ParamReader { block, lookup }
    }

    pub fn get(&self, name: &str) -> Option<&'a Parameter> {
        self.block.parameters.get(name)
    }

    pub fn required(&self, name: &str) -> BlockResult<&'a Parameter> {
        self.get(name)
            .ok_or_else(|| BlockError::MissingParameter(name.to_string()))
    }

    /// Resolved value of a required parameter. A namespace miss counts as
    /// missing.
    pub fn value(&self, name: &str) -> BlockResult<Value> {
        let param = self.required(name)?;
        resolve_parameter(param, self.lookup)
            .ok_or_else(|| BlockError::MissingParameter(name.to_string()))
    }

    pub fn text(&self, name: &str) -> BlockResult<String> {
        resolve_text_parameter(self.required(name)?, self.lookup)
    }

    pub fn opt_text(&self, name: &str) -> BlockResult<Option<String>> {
        match self.get(name) {
            Some(param) => resolve_text_parameter(param, self.lookup).map(Some),
            None => Ok(None),
        }
    }

    pub fn bool(&self, name: &str) -> BlockResult<bool> {
        match self.value(name)? {
            Value::Bool(b) => Ok(b),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(true),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(false),
            other => Err(BlockError::InvalidParameter {
                name: name.to_string(),
                reason: format!("expected a boolean but got {}", other),
            }),
        }
    }

    pub fn opt_bool(&self, name: &str) -> BlockResult<Option<bool>> {
        match self.get(name) {
            Some(_) => self.bool(name).map(Some),
            None => Ok(None),
        }
    }

    /// Whole number, given either as a JSON number or as decimal text.
    pub fn int(&self, name: &str) -> BlockResult<u64> {
        let malformed = |reason: String| BlockError::MalformedNumber {
            name: name.to_string(),
            reason,
        };
        match self.value(name)? {
            Value::Number(n) => n
                .as_u64()
                .ok_or_else(|| malformed(format!("{} is not a whole number", n))),
            Value::String(s) => s.trim().parse::<u64>().map_err(|e| malformed(e.to_string())),
            other => Err(malformed(format!("unexpected value {}", other))),
        }
    }

    pub fn opt_int(&self, name: &str) -> BlockResult<Option<u64>> {
        match self.get(name) {
            Some(_) => self.int(name).map(Some),
            None => Ok(None),
        }
    }

    /// Every parameter called `name` as a `(key, value)` pair, in order.
    /// Values are resolved and template-substituted; a namespace miss gives
    /// an empty value.
    pub fn key_values(&self, name: &str) -> BlockResult<Vec<(String, String)>> {
        self.block
            .parameters
            .list(name)
            .into_iter()
            .map(|param| {
                let key = param.key.clone().ok_or_else(|| BlockError::InvalidParameter {
                    name: name.to_string(),
                    reason: "entry has no key".to_string(),
                })?;
                let value = match resolve_parameter(param, self.lookup) {
                    None => String::new(),
                    Some(Value::String(s)) => resolve_text(&s, self.lookup),
                    Some(other) => value_as_text(&other),
                };
                Ok((key, value))
            })
            .collect()
    }
}
