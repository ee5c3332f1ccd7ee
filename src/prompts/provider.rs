//! Prompt template retrieval.
//!
//! The engine depends only on "given a prompt id, return a template plus
//! model parameters". The remote provider mirrors an active-deployment
//! lookup and goes through the shared bounded-backoff retry; the static
//! provider serves a fixed template for offline runs and tests.

use std::time::Duration;

use serde::Deserialize;

use crate::llm::completion::{LlmFuture, ModelParams};
use crate::llm::retry::retry_with_backoff;
use crate::relay::config::PromptSourceConfig;
use crate::relay::errors::{RelayError, RelayResult};

/// Service label used in upstream errors.
const SERVICE: &str = "prompt provider";

/// Template plus sampling parameters for one prompt id.
///
/// Fetched per request, never persisted.
#[derive(Clone, Debug)]
pub struct PromptSpec {
    /// Template text containing the `{{input}}` placeholder.
    pub template: String,
    /// Sampling parameters for the completion call.
    pub params: ModelParams,
}

/// Fetches the active template for a prompt id.
pub trait PromptProvider: Send + Sync {
    /// Fetch the spec for `prompt_id`.
    ///
    /// # Errors
    /// Returns an error if the lookup fails.
    fn fetch(&self, prompt_id: &str) -> LlmFuture<'_, RelayResult<PromptSpec>>;
}

#[derive(Deserialize)]
struct DeploymentResponse {
    text: String,
    #[serde(default)]
    config: Option<ModelParams>,
}

/// HTTP provider hitting a remote active-deployment endpoint.
pub struct HttpPromptProvider {
    client: reqwest::Client,
    base_url: String,
    max_attempts: u32,
    backoff: Duration,
}

impl HttpPromptProvider {
    /// Build a provider from configuration.
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: &PromptSourceConfig) -> RelayResult<Self> {
        url::Url::parse(&config.base_url)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            max_attempts: config.max_attempts.max(1),
            backoff: Duration::from_millis(config.backoff_ms),
        })
    }

    async fn get_deployment(&self, prompt_id: &str) -> RelayResult<PromptSpec> {
        let mut url = url::Url::parse(&self.base_url)?.join("/api/deployment/active")?;
        url.query_pairs_mut().append_pair("promptId", prompt_id);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RelayError::UpstreamStatus {
                service: SERVICE,
                status: status.as_u16(),
            });
        }

        let payload: DeploymentResponse = response.json().await?;
        Ok(PromptSpec {
            template: payload.text,
            params: payload.config.unwrap_or_default(),
        })
    }
}

impl PromptProvider for HttpPromptProvider {
    fn fetch(&self, prompt_id: &str) -> LlmFuture<'_, RelayResult<PromptSpec>> {
        let prompt_id = prompt_id.to_string();
        Box::pin(async move {
            retry_with_backoff(self.max_attempts, self.backoff, || {
                self.get_deployment(&prompt_id)
            })
            .await
        })
    }
}

/// In-process provider serving one fixed template for every prompt id.
pub struct StaticPromptProvider {
    spec: PromptSpec,
}

impl StaticPromptProvider {
    /// Create a provider from a template and parameters.
    #[must_use]
    pub fn new(template: impl Into<String>, params: ModelParams) -> Self {
        Self {
            spec: PromptSpec {
                template: template.into(),
                params,
            },
        }
    }
}

impl PromptProvider for StaticPromptProvider {
    fn fetch(&self, _prompt_id: &str) -> LlmFuture<'_, RelayResult<PromptSpec>> {
        let spec = self.spec.clone();
        Box::pin(async move { Ok(spec) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_provider_takes_retry_settings_from_config() {
        let mut config = PromptSourceConfig::default();
        config.max_attempts = 5;
        config.backoff_ms = 250;
        let provider = HttpPromptProvider::new(&config).unwrap();
        assert_eq!(provider.max_attempts, 5);
        assert_eq!(provider.backoff, Duration::from_millis(250));
    }

    #[test]
    fn test_http_provider_floors_attempts_at_one() {
        let mut config = PromptSourceConfig::default();
        config.max_attempts = 0;
        let provider = HttpPromptProvider::new(&config).unwrap();
        assert_eq!(provider.max_attempts, 1);
    }

    #[tokio::test]
    async fn test_static_provider_ignores_prompt_id() {
        let provider = StaticPromptProvider::new("{{input}}", ModelParams::default());
        let spec = provider.fetch("anything").await.unwrap();
        assert_eq!(spec.template, "{{input}}");
    }

    #[test]
    fn test_deployment_response_without_config() {
        let payload: DeploymentResponse =
            serde_json::from_str(r#"{"text":"Say hi: {{input}}"}"#).unwrap();
        assert_eq!(payload.text, "Say hi: {{input}}");
        assert!(payload.config.is_none());
    }

    #[test]
    fn test_deployment_response_with_config() {
        let payload: DeploymentResponse =
            serde_json::from_str(r#"{"text":"{{input}}","config":{"temperature":0.1}}"#).unwrap();
        let params = payload.config.unwrap();
        assert!((params.temperature - 0.1).abs() < f64::EPSILON);
    }
}
