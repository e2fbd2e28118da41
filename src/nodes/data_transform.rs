use async_trait::async_trait;

use crate::core::connector::Connector;
use crate::core::event_log::CallEvent;
use crate::error::{BlockError, BlockResult};
use crate::flow::{Block, BlockId, BlockType, BranchCondition, SystemKey};
use crate::nodes::executor::{ensure_type, follow, BlockRunner};
use crate::nodes::params::ParamReader;
use crate::template::value_as_text;

// ================================
// SetQueue
// ================================

pub struct SetQueueRunner;

#[async_trait]
impl BlockRunner for SetQueueRunner {
    async fn run(&self, block: &Block, call: &dyn Connector) -> BlockResult<Option<BlockId>> {
        ensure_type(block, BlockType::SetQueue, "setQueue")?;
        let queue = ParamReader::new(block, call).required("Queue")?;
        call.set_system(SystemKey::QueueArn, value_as_text(&queue.value));
        call.set_system(
            SystemKey::QueueName,
            queue.resource_name.clone().unwrap_or_default(),
        );
        Ok(follow(block, BranchCondition::Success))
    }
}

// ================================
// SetAttributes
// ================================

pub struct SetAttributesRunner;

#[async_trait]
impl BlockRunner for SetAttributesRunner {
    async fn run(&self, block: &Block, call: &dyn Connector) -> BlockResult<Option<BlockId>> {
        ensure_type(block, BlockType::SetAttributes, "setAttributes")?;
        let pairs = ParamReader::new(block, call).key_values("Attribute")?;
        for (key, value) in pairs {
            call.set_contact_data(&key, value.clone());
            call.emit(CallEvent::AttributeSet { key, value });
        }
        Ok(follow(block, BranchCondition::Success))
    }
}

// ================================
// SetVoice
// ================================

pub struct SetVoiceRunner;

#[async_trait]
impl BlockRunner for SetVoiceRunner {
    async fn run(&self, block: &Block, call: &dyn Connector) -> BlockResult<Option<BlockId>> {
        ensure_type(block, BlockType::SetVoice, "setVoice")?;
        let voice = ParamReader::new(block, call).text("GlobalVoice")?;
        call.set_system(SystemKey::TextToSpeechVoice, voice);
        Ok(follow(block, BranchCondition::Success))
    }
}

// ================================
// PlayPrompt
// ================================

/// Speaks a text prompt, or names the audio prompt it would have played.
pub struct PlayPromptRunner;

#[async_trait]
impl BlockRunner for PlayPromptRunner {
    async fn run(&self, block: &Block, call: &dyn Connector) -> BlockResult<Option<BlockId>> {
        ensure_type(block, BlockType::PlayPrompt, "playPrompt")?;
        let params = ParamReader::new(block, call);

        if params.get("Text").is_some() {
            let text = params.text("Text")?;
            let ssml = params
                .opt_text("TextToSpeechType")?
                .map_or(false, |t| t.eq_ignore_ascii_case("ssml"));
            call.send(&text, ssml);
        } else if let Some(audio) = params.get("AudioPrompt") {
            let name = audio
                .resource_name
                .clone()
                .unwrap_or_else(|| value_as_text(&audio.value));
            call.send(&name, false);
        } else {
            return Err(BlockError::MissingParameter("Text".to_string()));
        }
        Ok(follow(block, BranchCondition::Success))
    }
}
