//! OpenAI completions adapter.
//!
//! Owns the HTTP request/response shapes. Calls go through the shared
//! bounded-backoff retry for retryable failures only.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::llm::completion::{CompletionClient, CompletionRequest, LlmFuture};
use crate::llm::retry::retry_with_backoff;
use crate::relay::config::CompletionConfig;
use crate::relay::errors::{RelayError, RelayResult};

/// Service label used in upstream errors.
const SERVICE: &str = "completions";

#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    temperature: f64,
    max_tokens: u32,
    top_p: f64,
    frequency_penalty: f64,
    presence_penalty: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<&'a [String]>,
}

#[derive(Deserialize)]
struct ApiResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    text: String,
}

/// HTTP client for an OpenAI-style completions endpoint.
pub struct OpenAiCompletionClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    max_attempts: u32,
    backoff: Duration,
}

impl OpenAiCompletionClient {
    /// Build a client from configuration and an API key.
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: &CompletionConfig, api_key: String) -> RelayResult<Self> {
        url::Url::parse(&config.base_url)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            max_attempts: config.max_attempts.max(1),
            backoff: Duration::from_millis(config.backoff_ms),
        })
    }

    async fn post_completion(&self, request: &CompletionRequest) -> RelayResult<String> {
        let params = &request.params;
        let body = ApiRequest {
            model: &params.model,
            prompt: &request.prompt,
            temperature: params.temperature,
            max_tokens: params.max_tokens,
            top_p: params.top_p,
            frequency_penalty: params.frequency_penalty,
            presence_penalty: params.presence_penalty,
            stop: params.stop.as_deref(),
        };

        let url = format!("{}/v1/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RelayError::UpstreamStatus {
                service: SERVICE,
                status: status.as_u16(),
            });
        }

        let payload: ApiResponse = response.json().await?;
        let choice = payload
            .choices
            .into_iter()
            .next()
            .ok_or(RelayError::EmptyCompletion)?;
        Ok(choice.text)
    }
}

impl CompletionClient for OpenAiCompletionClient {
    fn complete(&self, request: CompletionRequest) -> LlmFuture<'_, RelayResult<String>> {
        Box::pin(async move {
            retry_with_backoff(self.max_attempts, self.backoff, || {
                self.post_completion(&request)
            })
            .await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::completion::ModelParams;

    #[test]
    fn test_request_body_omits_missing_stop() {
        let params = ModelParams::default();
        let body = ApiRequest {
            model: &params.model,
            prompt: "User: Hi",
            temperature: params.temperature,
            max_tokens: params.max_tokens,
            top_p: params.top_p,
            frequency_penalty: params.frequency_penalty,
            presence_penalty: params.presence_penalty,
            stop: None,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["model"], "text-davinci-003");
        assert_eq!(value["prompt"], "User: Hi");
        assert!(value.get("stop").is_none());
    }

    #[test]
    fn test_response_parses_first_choice() {
        let payload: ApiResponse =
            serde_json::from_str(r#"{"choices":[{"text":" Hello! "},{"text":"other"}]}"#).unwrap();
        assert_eq!(payload.choices[0].text, " Hello! ");
    }

    #[test]
    fn test_client_normalizes_trailing_slash() {
        let mut config = CompletionConfig::default();
        config.base_url = "https://api.openai.com/".to_string();
        let client = OpenAiCompletionClient::new(&config, "key".to_string()).unwrap();
        assert_eq!(client.base_url, "https://api.openai.com");
    }
}
