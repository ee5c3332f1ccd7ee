//! Prompt template retrieval components.

pub mod provider;

pub use provider::{HttpPromptProvider, PromptProvider, PromptSpec, StaticPromptProvider};
