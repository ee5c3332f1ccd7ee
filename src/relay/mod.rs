//! Core relay domain.
//!
//! Organized into:
//! - `config`: Configuration sections with defaults and validation
//! - `errors`: Error taxonomy and result alias
//! - `history`: Per-caller chat history store
//! - `reset`: Reset-command detection
//! - `tokenizer`: Shared subword tokenizer
//! - `compactor`: Token-budgeted prompt construction
//! - `engine`: Orchestration of the reply flow

pub mod compactor;
pub mod config;
pub mod engine;
pub mod errors;
pub mod history;
pub mod reset;
pub mod tokenizer;

// Re-export commonly used types for convenience
pub use compactor::{INPUT_VARIABLE, PromptCompactor, inject_variables};
pub use config::{ChatConfig, CompletionConfig, PromptConfig, PromptSourceConfig, RelayConfig};
pub use engine::{RelayEngine, Reply};
pub use errors::{RelayError, RelayResult};
pub use history::{ChatHistory, ChatHistoryStore, Turn};
pub use reset::{ResetCommand, handle_possible_reset, parse_reset};
pub use tokenizer::Tokenizer;
