use async_trait::async_trait;
use base64::Engine as _;
use std::time::Duration;

use crate::core::connector::Connector;
use crate::error::{BlockError, BlockResult};
use crate::flow::{Block, BlockId, BlockTarget, BlockType, BranchCondition, SystemKey};
use crate::nodes::executor::{ensure_type, follow, match_evaluate, BlockRunner};
use crate::nodes::params::ParamReader;

const DEFAULT_TERMINATOR: char = '#';
/// No keypad produces it, so `#` and `*` reach a menu as ordinary keys.
const MENU_TERMINATOR: char = '\0';

fn is_ssml<L: crate::template::ValueLookup + ?Sized>(params: &ParamReader<'_, L>) -> BlockResult<bool> {
    Ok(params
        .opt_text("TextToSpeechType")?
        .map_or(false, |t| t.eq_ignore_ascii_case("ssml")))
}

// ================================
// StoreUserInput
// ================================

/// Speaks a prompt and stores the keys the caller enters as the System
/// "Stored customer input" value.
pub struct StoreUserInputRunner;

#[async_trait]
impl BlockRunner for StoreUserInputRunner {
    async fn run(&self, block: &Block, call: &dyn Connector) -> BlockResult<Option<BlockId>> {
        ensure_type(block, BlockType::StoreUserInput, "storeUserInput")?;
        let params = ParamReader::new(block, call);

        let text = params.text("Text")?;
        let ssml = is_ssml(&params)?;
        let timeout = params.int("Timeout")?;
        let max_digits = params.int("MaxDigits")?;
        let encrypt = params.bool("EncryptEntry")?;
        // Read for validation only: there is no cancel key in a simulated call.
        params.bool("DisableCancel")?;
        let terminator = params
            .opt_text("TerminatorDigits")?
            .and_then(|t| t.chars().next())
            .unwrap_or(DEFAULT_TERMINATOR);
        let encryption = if encrypt {
            Some((params.text("EncryptionKeyId")?, params.text("EncryptionKey")?))
        } else {
            None
        };

        call.send(&text, ssml);
        let received = call
            .receive(max_digits as usize, Duration::from_secs(timeout), terminator)
            .await;

        match received {
            Some(input) => {
                let stored = match encryption {
                    Some((key_id, certificate)) => {
                        let sealed = call.encrypt(&input, &key_id, certificate.as_bytes());
                        base64::engine::general_purpose::STANDARD.encode(sealed)
                    }
                    None => input,
                };
                call.set_system(SystemKey::LastUserInput, stored);
            }
            None => {
                tracing::debug!(block = %block.id, "no input before timeout");
            }
        }
        Ok(follow(block, BranchCondition::Success))
    }
}

// ================================
// GetUserInput
// ================================

/// Plays a menu prompt and routes on a single key press.
pub struct GetUserInputRunner;

#[async_trait]
impl BlockRunner for GetUserInputRunner {
    async fn run(&self, block: &Block, call: &dyn Connector) -> BlockResult<Option<BlockId>> {
        ensure_type(block, BlockType::GetUserInput, "getUserInput")?;
        match &block.target {
            Some(BlockTarget::Digits) => {}
            other => {
                return Err(BlockError::UnhandledTarget {
                    block: "getUserInput",
                    target: other.as_ref().map(|t| t.to_string()).unwrap_or_default(),
                })
            }
        }
        let params = ParamReader::new(block, call);
        let text = params.text("Text")?;
        let ssml = is_ssml(&params)?;
        let timeout = params.int("Timeout")?;

        call.send(&text, ssml);
        let Some(key) = call
            .receive(1, Duration::from_secs(timeout), MENU_TERMINATOR)
            .await
        else {
            return Ok(follow(block, BranchCondition::Timeout));
        };

        match match_evaluate(block, &key) {
            Some(next) => Ok(Some(next)),
            None => Ok(follow(block, BranchCondition::NoMatch)),
        }
    }
}
