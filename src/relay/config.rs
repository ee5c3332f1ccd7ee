//! Configuration for the relay engine.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::relay::errors::{RelayError, RelayResult};

/// Top-level configuration for the relay engine.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Prompt construction settings.
    pub prompt: PromptConfig,
    /// Chat defaults for new histories.
    pub chat: ChatConfig,
    /// Completion service settings.
    pub completion: CompletionConfig,
    /// Prompt template provider settings.
    pub provider: PromptSourceConfig,
}

impl RelayConfig {
    /// Validate configuration invariants.
    ///
    /// # Errors
    /// Returns an error if any values are out of range or invalid.
    pub fn validate(&self) -> RelayResult<()> {
        if self.prompt.max_prompt_tokens == 0 {
            return Err(RelayError::InvalidConfig(
                "prompt.max_prompt_tokens must be > 0".to_string(),
            ));
        }

        if self.chat.default_agent_name.is_empty() {
            return Err(RelayError::InvalidConfig(
                "chat.default_agent_name must not be empty".to_string(),
            ));
        }

        if self.chat.default_prompt_id.is_empty() {
            return Err(RelayError::InvalidConfig(
                "chat.default_prompt_id must not be empty".to_string(),
            ));
        }

        if self.chat.user_speaker.is_empty() {
            return Err(RelayError::InvalidConfig(
                "chat.user_speaker must not be empty".to_string(),
            ));
        }

        if self.completion.max_attempts == 0 {
            return Err(RelayError::InvalidConfig(
                "completion.max_attempts must be > 0".to_string(),
            ));
        }

        if self.provider.max_attempts == 0 {
            return Err(RelayError::InvalidConfig(
                "provider.max_attempts must be > 0".to_string(),
            ));
        }

        Url::parse(&self.completion.base_url)?;
        Url::parse(&self.provider.base_url)?;

        Ok(())
    }
}

/// Prompt construction settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PromptConfig {
    /// Total token budget for the final prompt, template included.
    pub max_prompt_tokens: usize,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            max_prompt_tokens: 4000,
        }
    }
}

/// Chat defaults applied when a caller has no history yet.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Agent name used when none was chosen by a reset command.
    pub default_agent_name: String,
    /// Prompt id used when none was chosen by a reset command.
    pub default_prompt_id: String,
    /// Speaker label recorded for inbound user turns.
    pub user_speaker: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            default_agent_name: "Assistant".to_string(),
            default_prompt_id: "default".to_string(),
            user_speaker: "User".to_string(),
        }
    }
}

/// Completion service settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CompletionConfig {
    /// Completion model name.
    pub model: String,
    /// Service base URL.
    pub base_url: String,
    /// Maximum attempts per call, first try included.
    pub max_attempts: u32,
    /// Initial backoff between attempts in milliseconds; doubles per retry.
    pub backoff_ms: u64,
    /// Per-request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            model: "text-davinci-003".to_string(),
            base_url: "https://api.openai.com".to_string(),
            max_attempts: 3,
            backoff_ms: 500,
            timeout_seconds: 30,
        }
    }
}

/// Prompt template provider settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PromptSourceConfig {
    /// Provider base URL.
    pub base_url: String,
    /// Maximum attempts per lookup, first try included.
    pub max_attempts: u32,
    /// Initial backoff between attempts in milliseconds; doubles per retry.
    pub backoff_ms: u64,
    /// Per-request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for PromptSourceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://promptable.ai".to_string(),
            max_attempts: 3,
            backoff_ms: 500,
            timeout_seconds: 10,
        }
    }
}
