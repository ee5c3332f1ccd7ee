//! Completion-service abstraction.
//!
//! The engine depends only on "submit prompt + params, receive text";
//! provider-specific request and response shapes belong to adapters.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::relay::errors::RelayResult;

/// Boxed future type for LLM operations.
pub type LlmFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Sampling parameters for a completion call.
///
/// Deserializable from a prompt deployment response; every field falls
/// back to a sensible default when the provider omits it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModelParams {
    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,
    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Maximum tokens to generate.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Nucleus sampling cutoff.
    #[serde(default = "default_top_p")]
    pub top_p: f64,
    /// Frequency penalty.
    #[serde(default)]
    pub frequency_penalty: f64,
    /// Presence penalty.
    #[serde(default)]
    pub presence_penalty: f64,
    /// Optional stop sequences.
    #[serde(default)]
    pub stop: Option<Vec<String>>,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            top_p: default_top_p(),
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
            stop: None,
        }
    }
}

fn default_model() -> String {
    "text-davinci-003".to_string()
}

const fn default_temperature() -> f64 {
    0.7
}

const fn default_max_tokens() -> u32 {
    256
}

const fn default_top_p() -> f64 {
    1.0
}

/// A prompt ready to submit with its sampling parameters.
#[derive(Clone, Debug)]
pub struct CompletionRequest {
    /// Final prompt text.
    pub prompt: String,
    /// Sampling parameters.
    pub params: ModelParams,
}

/// Submit a prompt, receive generated text.
pub trait CompletionClient: Send + Sync {
    /// Generate a completion for the request.
    ///
    /// # Errors
    /// Returns an error if the service call fails.
    fn complete(&self, request: CompletionRequest) -> LlmFuture<'_, RelayResult<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_deserialize_with_defaults() {
        let params: ModelParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.model, "text-davinci-003");
        assert_eq!(params.max_tokens, 256);
        assert!(params.stop.is_none());
    }

    #[test]
    fn test_params_deserialize_overrides() {
        let params: ModelParams =
            serde_json::from_str(r#"{"model":"gpt-3.5-turbo-instruct","temperature":0.2}"#)
                .unwrap();
        assert_eq!(params.model, "gpt-3.5-turbo-instruct");
        assert!((params.temperature - 0.2).abs() < f64::EPSILON);
        assert!((params.top_p - 1.0).abs() < f64::EPSILON);
    }
}
