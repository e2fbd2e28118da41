pub mod executor;
pub mod control_flow;
pub mod data_transform;
pub mod input;
pub mod lambda;
pub mod params;

#[cfg(test)]
pub(crate) mod test_support;

pub use executor::*;
