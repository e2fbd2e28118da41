//! Dynamic parameter resolution and inline `$.Namespace.key` substitution.

pub mod variable_resolver;

pub use variable_resolver::{
    resolve_parameter, resolve_text, resolve_text_parameter, value_as_text, ValueLookup,
};
