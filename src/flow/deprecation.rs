//! Rewrites legacy block types into their modern equivalents before a flow
//! becomes dispatchable.

use super::types::{Block, BlockTarget, BlockType, Flow};

pub fn normalize_flow(mut flow: Flow) -> Flow {
    flow.blocks = flow.blocks.into_iter().map(normalize_block).collect();
    flow
}

pub fn normalize_block(mut block: Block) -> Block {
    match block.block_type {
        BlockType::StoreCustomerInput => {
            block.block_type = BlockType::StoreUserInput;
        }
        BlockType::PlayAudio => {
            block.block_type = BlockType::PlayPrompt;
        }
        BlockType::TransferToFlow => {
            block.block_type = BlockType::Transfer;
            block.target = Some(BlockTarget::Flow);
        }
        // SetScreenPop and CustomerInQueue have no modern counterpart and
        // fall through to the passthrough runner.
        _ => {}
    }
    block
}
