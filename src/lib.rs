//! Conversational relay agent: per-caller transcripts compacted into
//! token-budgeted prompts for an LLM completion service.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::print_stdout)]

/// Completion-service client abstraction and HTTP adapter.
pub mod llm;
/// Prompt template retrieval.
pub mod prompts;
/// Core relay domain: history store, compaction, orchestration.
pub mod relay;
/// HTTP server and API routes.
pub mod server;
/// Entry helpers to start the relay server.
pub mod start_relay_agent;
