pub mod call_connector;
pub mod call_state;
pub mod connector;
pub mod dispatcher;
pub mod event_log;
pub mod flow_set;
pub mod hooks;
pub mod runtime_context;
pub mod status;

pub use call_connector::{CallChannels, CallConnector, Prompt};
pub use call_state::CallState;
pub use connector::{Connector, LambdaOutcome};
pub use dispatcher::{CallDispatcher, EngineConfig};
pub use event_log::{CallEvent, EventKind, EventLog};
pub use flow_set::{FlowSet, LoadedBlock, Setup};
pub use hooks::{Hooks, LambdaHandler};
pub use runtime_context::{FakeIdGenerator, FakeTimeProvider, IdGenerator, RealIdGenerator, RealTimeProvider, RuntimeContext, TimeProvider};
pub use status::CallStatus;
