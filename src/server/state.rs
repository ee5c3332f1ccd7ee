//! Application state shared across all request handlers.

use std::sync::Arc;

use crate::llm::completion::ModelParams;
use crate::llm::openai::OpenAiCompletionClient;
use crate::prompts::provider::{HttpPromptProvider, PromptProvider, StaticPromptProvider};
use crate::relay::config::RelayConfig;
use crate::relay::engine::RelayEngine;
use crate::relay::errors::RelayResult;

/// Environment variable holding the completion service API key.
const API_KEY_ENV: &str = "OPENAI_API_KEY";
/// Optional completion model override.
const MODEL_ENV: &str = "RELAY_MODEL";
/// Optional completion base URL override.
const COMPLETION_URL_ENV: &str = "RELAY_COMPLETION_BASE_URL";
/// Optional prompt provider base URL override.
const PROMPT_URL_ENV: &str = "RELAY_PROMPT_BASE_URL";
/// Optional fixed prompt template, bypassing the remote provider.
const TEMPLATE_ENV: &str = "RELAY_PROMPT_TEMPLATE";
/// Optional default prompt id override.
const PROMPT_ID_ENV: &str = "RELAY_DEFAULT_PROMPT_ID";

/// Shared application state.
pub struct AppState {
    /// Relay engine handling inbound messages.
    pub engine: RelayEngine,
}

impl AppState {
    /// Build state from environment-backed configuration.
    ///
    /// # Errors
    /// Returns an error if configuration is invalid or the clients cannot
    /// be built.
    pub fn from_env() -> RelayResult<Arc<Self>> {
        let mut config = RelayConfig::default();
        if let Ok(model) = std::env::var(MODEL_ENV) {
            config.completion.model = model;
        }
        if let Ok(base_url) = std::env::var(COMPLETION_URL_ENV) {
            config.completion.base_url = base_url;
        }
        if let Ok(base_url) = std::env::var(PROMPT_URL_ENV) {
            config.provider.base_url = base_url;
        }
        if let Ok(prompt_id) = std::env::var(PROMPT_ID_ENV) {
            config.chat.default_prompt_id = prompt_id;
        }

        let api_key = std::env::var(API_KEY_ENV).unwrap_or_default();
        let completion = Arc::new(OpenAiCompletionClient::new(&config.completion, api_key)?);

        let prompts: Arc<dyn PromptProvider> = match std::env::var(TEMPLATE_ENV) {
            Ok(template) => {
                let params = ModelParams {
                    model: config.completion.model.clone(),
                    ..ModelParams::default()
                };
                Arc::new(StaticPromptProvider::new(template, params))
            }
            Err(_) => Arc::new(HttpPromptProvider::new(&config.provider)?),
        };

        let engine = RelayEngine::new(config, completion, prompts)?;
        Ok(Arc::new(Self { engine }))
    }
}
