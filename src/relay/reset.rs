//! Reset-command detection for inbound messages.
//!
//! Two shapes are recognized, case-insensitively, after trimming:
//! - `reset` — reset with the configured default agent name and the
//!   configured fixed default prompt id.
//! - `reset <promptId> <agentName>` — reset with the given identifiers,
//!   case preserved as typed.
//!
//! Anything else is not a reset.

use std::sync::LazyLock;

use regex::Regex;
use tracing::info;

use crate::relay::config::ChatConfig;
use crate::relay::history::{ChatHistory, ChatHistoryStore};

// The pattern is a constant; compilation is exercised by tests.
#[allow(clippy::unwrap_used)]
static RESET_WITH_ARGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^reset\s+(\w+)\s+(\w+)$").unwrap());

/// A parsed reset command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResetCommand {
    /// Prompt id the new history should use.
    pub prompt_id: String,
    /// Agent name the new history should use.
    pub agent_name: String,
}

/// Detect a reset command in a raw inbound message.
///
/// Returns `None` when the message is not a reset, which is distinct from
/// "reset occurred".
#[must_use]
pub fn parse_reset(message: &str, defaults: &ChatConfig) -> Option<ResetCommand> {
    let trimmed = message.trim();
    if trimmed.eq_ignore_ascii_case("reset") {
        return Some(ResetCommand {
            prompt_id: defaults.default_prompt_id.clone(),
            agent_name: defaults.default_agent_name.clone(),
        });
    }

    let captures = RESET_WITH_ARGS.captures(trimmed)?;
    Some(ResetCommand {
        prompt_id: captures[1].to_string(),
        agent_name: captures[2].to_string(),
    })
}

/// Apply a possible reset, replacing the caller's history.
///
/// Returns the fresh history when a reset occurred, `None` otherwise.
pub fn handle_possible_reset(
    store: &ChatHistoryStore,
    caller_id: &str,
    message: &str,
    defaults: &ChatConfig,
) -> Option<ChatHistory> {
    let command = parse_reset(message, defaults)?;
    info!(
        caller_id,
        prompt_id = %command.prompt_id,
        agent_name = %command.agent_name,
        "resetting chat history"
    );
    Some(store.create(caller_id, &command.agent_name, &command.prompt_id))
}
