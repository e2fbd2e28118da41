//! Public API layer: simulator setup and the driver's handle on a call.

mod call;
mod simulator;

pub use call::Call;
pub use simulator::{CallConfig, Simulator};
