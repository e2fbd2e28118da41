//! Loaded flows and the read-only setup every call shares.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::core::dispatcher::EngineConfig;
use crate::core::hooks::Hooks;
use crate::core::runtime_context::RuntimeContext;
use crate::flow::{normalize_flow, Block, BlockId, Flow};
use crate::nodes::{BlockRunner, RunnerRegistry};

/// A block paired with the runner chosen for it at load time.
#[derive(Clone)]
pub struct LoadedBlock {
    pub block: Block,
    pub runner: Arc<dyn BlockRunner>,
}

/// Every loaded flow, indexed by name, and every block, indexed by id.
#[derive(Clone, Default)]
pub struct FlowSet {
    flows: Vec<Flow>,
    blocks: HashMap<BlockId, LoadedBlock>,
}

impl FlowSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalises deprecated block types and resolves each block's runner.
    /// A flow with the same name as one already loaded replaces it.
    pub fn insert_flow(&mut self, flow: Flow, registry: &RunnerRegistry) {
        for block in flow.blocks.iter().filter(|b| b.block_type.is_deprecated()) {
            tracing::info!(
                block = %block.id,
                block_type = %block.block_type,
                flow = %flow.name(),
                "flow uses a deprecated block type"
            );
        }
        let flow = normalize_flow(flow);
        for block in &flow.blocks {
            if self.blocks.contains_key(&block.id) {
                tracing::warn!(block = %block.id, flow = %flow.name(), "block id already loaded, replacing");
            }
            self.blocks.insert(
                block.id.clone(),
                LoadedBlock {
                    block: block.clone(),
                    runner: registry.get(&block.block_type),
                },
            );
        }
        tracing::debug!(flow = %flow.name(), blocks = flow.blocks.len(), "flow loaded");
        match self.flows.iter_mut().find(|f| f.name() == flow.name()) {
            Some(slot) => *slot = flow,
            None => self.flows.push(flow),
        }
    }

    pub fn flow(&self, name: &str) -> Option<&Flow> {
        self.flows.iter().find(|f| f.name() == name)
    }

    pub fn flow_start(&self, name: &str) -> Option<BlockId> {
        self.flow(name).map(|f| f.start.clone())
    }

    pub fn block(&self, id: &BlockId) -> Option<&LoadedBlock> {
        self.blocks.get(id)
    }

    /// Loaded flows in load order.
    pub fn flows(&self) -> Vec<&Flow> {
        self.flows.iter().collect()
    }
}

impl fmt::Debug for FlowSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlowSet")
            .field("flows", &self.flows.iter().map(|f| f.name()).collect::<Vec<_>>())
            .field("blocks", &self.blocks.len())
            .finish()
    }
}

/// Everything a call reads but never writes. Snapshotted when a call starts.
#[derive(Clone, Default)]
pub struct Setup {
    pub flows: FlowSet,
    pub hooks: Hooks,
    /// Dialed number to the name of the flow that answers it.
    pub starting_flows: HashMap<String, String>,
    pub config: EngineConfig,
    pub context: RuntimeContext,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::BlockType;
    use serde_json::json;

    fn flow(name: &str, ids: &[&str]) -> Flow {
        let modules: Vec<_> = ids
            .iter()
            .map(|id| json!({"id": id, "type": "PlayAudio", "parameters": []}))
            .collect();
        serde_json::from_value(json!({
            "modules": modules,
            "start": ids[0],
            "metadata": {"name": name}
        }))
        .unwrap()
    }

    #[test]
    fn test_insert_and_lookup() {
        let registry = RunnerRegistry::new();
        let mut set = FlowSet::new();
        set.insert_flow(flow("Main", &["a", "b"]), &registry);
        set.insert_flow(flow("Billing", &["c"]), &registry);

        assert_eq!(set.flow_start("Billing"), Some(BlockId::from("c")));
        assert_eq!(set.flow_start("Nope"), None);
        assert_eq!(
            set.flows().iter().map(|f| f.name()).collect::<Vec<_>>(),
            vec!["Main", "Billing"]
        );
        // deprecated types are normalised before they become dispatchable
        let b = set.block(&BlockId::from("b")).unwrap();
        assert_eq!(b.block.block_type, BlockType::PlayPrompt);
    }

    #[test]
    fn test_reload_replaces_flow() {
        let registry = RunnerRegistry::new();
        let mut set = FlowSet::new();
        set.insert_flow(flow("Main", &["a"]), &registry);
        set.insert_flow(flow("Main", &["z"]), &registry);
        assert_eq!(set.flows().len(), 1);
        assert_eq!(set.flow_start("Main"), Some(BlockId::from("z")));
    }
}
