//! Completion-service components.

pub mod completion;
pub mod openai;
pub mod retry;

pub use completion::{CompletionClient, CompletionRequest, LlmFuture, ModelParams};
pub use openai::OpenAiCompletionClient;
pub use retry::retry_with_backoff;
