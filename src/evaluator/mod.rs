//! Comparison operators used to pick Evaluate branches.

pub mod operators;

pub use operators::evaluate;
