//! Relay engine orchestration.
//!
//! Control flow for one inbound message: reset detection, history
//! lookup/creation, user-turn append, template fetch, compaction,
//! completion call, agent-turn append.

use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::llm::completion::{CompletionClient, CompletionRequest};
use crate::prompts::provider::PromptProvider;
use crate::relay::compactor::PromptCompactor;
use crate::relay::config::RelayConfig;
use crate::relay::errors::{RelayError, RelayResult};
use crate::relay::history::{ChatHistory, ChatHistoryStore};
use crate::relay::reset::handle_possible_reset;
use crate::relay::tokenizer::Tokenizer;

/// Reply returned to the inbound caller.
#[derive(Clone, Debug, Serialize)]
pub struct Reply {
    /// Generated agent text.
    pub text: String,
}

/// Orchestrates the message → prompt → completion → reply flow.
pub struct RelayEngine {
    config: RelayConfig,
    store: ChatHistoryStore,
    compactor: PromptCompactor,
    completion: Arc<dyn CompletionClient>,
    prompts: Arc<dyn PromptProvider>,
    caller_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl RelayEngine {
    /// Create a new engine.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid or the tokenizer
    /// vocabulary cannot be loaded.
    pub fn new(
        config: RelayConfig,
        completion: Arc<dyn CompletionClient>,
        prompts: Arc<dyn PromptProvider>,
    ) -> RelayResult<Self> {
        config.validate()?;
        let tokenizer = Arc::new(Tokenizer::new()?);
        let compactor = PromptCompactor::new(tokenizer, config.prompt.max_prompt_tokens);

        Ok(Self {
            config,
            store: ChatHistoryStore::new(),
            compactor,
            completion,
            prompts,
            caller_locks: DashMap::new(),
        })
    }

    /// Read access to the history store.
    #[must_use]
    pub fn store(&self) -> &ChatHistoryStore {
        &self.store
    }

    /// Lazily created serialization unit for one caller. Unrelated callers
    /// never contend on the same lock.
    fn caller_lock(&self, caller_id: &str) -> Arc<Mutex<()>> {
        self.caller_locks
            .entry(caller_id.to_string())
            .or_default()
            .value()
            .clone()
    }

    fn get_or_create_history(&self, caller_id: &str, message: &str) -> ChatHistory {
        if let Some(history) =
            handle_possible_reset(&self.store, caller_id, message, &self.config.chat)
        {
            return history;
        }
        match self.store.get(caller_id) {
            Some(history) => history,
            None => self.store.create(
                caller_id,
                &self.config.chat.default_agent_name,
                &self.config.chat.default_prompt_id,
            ),
        }
    }

    /// Handle one inbound message and produce the agent reply.
    ///
    /// All turn appends for one caller are strictly ordered by a
    /// per-caller lock held across the request; the completion call awaits
    /// under that lock without blocking unrelated callers. On failure the
    /// user turn stays recorded and no agent turn is stored.
    ///
    /// # Errors
    /// Returns an error if the template is invalid, tokenization fails, or
    /// either upstream call fails.
    pub async fn get_reply(&self, message: &str, caller_id: &str) -> RelayResult<Reply> {
        let request_id = Uuid::new_v4();
        let message = message.trim();
        info!(%request_id, caller_id, "inbound message");

        let lock = self.caller_lock(caller_id);
        let _serialized = lock.lock().await;

        self.get_or_create_history(caller_id, message);
        self.store
            .add(caller_id, message, &self.config.chat.user_speaker)?;
        let history = self
            .store
            .get(caller_id)
            .ok_or_else(|| RelayError::HistoryNotFound(caller_id.to_string()))?;

        let spec = self.prompts.fetch(&history.prompt_id).await?;
        let prompt = self.compactor.render(&spec.template, &history.turns)?;
        debug!(
            %request_id,
            prompt_id = %history.prompt_id,
            prompt_chars = prompt.len(),
            "prompt built"
        );

        let generated = self
            .completion
            .complete(CompletionRequest {
                prompt,
                params: spec.params,
            })
            .await?;
        let text = generated.trim().to_string();

        self.store.add(caller_id, &text, &history.agent_name)?;
        info!(%request_id, caller_id, agent_name = %history.agent_name, "reply recorded");

        Ok(Reply { text })
    }
}
