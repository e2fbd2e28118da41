//! # XContactFlow: a contact-flow call simulator
//!
//! `xcontactflow` runs contact flows exported from the Amazon Connect flow
//! designer against simulated inbound calls, so flow logic can be exercised
//! and asserted on without telephony:
//!
//! - **Flow model**: the exported JSON graph of typed blocks, with deprecated
//!   block types normalised at load time.
//! - **Block runners**: StoreUserInput, GetUserInput, PlayPrompt, Transfer,
//!   SetQueue, SetAttributes, SetVoice, CheckAttribute,
//!   CheckHoursOfOperation, InvokeExternalResource and Disconnect. Unknown
//!   types pass through along their Success branch.
//! - **Dynamic parameters**: namespace lookups (External, System, User
//!   Defined) and inline `$.Namespace.key` substitution.
//! - **Calls**: each call runs on its own tokio task. The driver presses
//!   keys, reads prompts and asserts on the ordered event stream.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use xcontactflow::{CallConfig, Simulator};
//!
//! #[tokio::main]
//! async fn main() {
//!     let json = std::fs::read_to_string("main-flow.json").unwrap();
//!     let mut sim = Simulator::new();
//!     sim.load_flow_json(&json).unwrap();
//!     sim.set_starting_flow_for("+441234567890", "Main").unwrap();
//!
//!     let mut call = sim
//!         .start_call(CallConfig::new("+447700900000", "+441234567890"))
//!         .unwrap();
//!     println!("{:?}", call.next_prompt().await);
//!     call.press("12345678#").unwrap();
//!     call.expect().transfer().to_queue("Support").await.unwrap();
//! }
//! ```

pub mod api;
pub mod core;
pub mod error;
pub mod evaluator;
pub mod expect;
pub mod flow;
pub mod nodes;
pub mod template;

pub use crate::api::{Call, CallConfig, Simulator};
pub use crate::core::dispatcher::EngineConfig;
pub use crate::core::{
    CallEvent, CallStatus, Connector, EventKind, FakeIdGenerator, FakeTimeProvider, IdGenerator,
    LambdaHandler, Prompt, RealIdGenerator, RealTimeProvider, RuntimeContext, TimeProvider,
};
pub use crate::error::{BlockError, CallError};
pub use crate::expect::{AssertionFailure, Expect};
pub use crate::flow::{Block, BlockId, BlockType, Flow, SystemKey};
pub use crate::nodes::{BlockRunner, RunnerRegistry};
