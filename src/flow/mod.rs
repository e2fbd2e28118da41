//! Contact-flow graph model as exported by the flow designer.

pub mod deprecation;
pub mod system_key;
pub mod types;

pub use deprecation::{normalize_block, normalize_flow};
pub use system_key::SystemKey;
pub use types::{
    Block, BlockId, BlockTarget, BlockType, Branch, BranchCondition, BranchList, ConditionType,
    Flow, FlowMetadata, Namespace, Parameter, ParameterList,
};
