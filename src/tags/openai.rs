//! OpenAI-compatible embedding client.
//!
//! Blocking `reqwest` client against `{base_url}/embeddings`. Transient
//! failures are retried with exponential backoff up to `max_retries` times.
//! The API key is only required once a request is actually made, so a run
//! served entirely from the cache works offline.

use backoff::{backoff::Backoff, ExponentialBackoff};
use reqwest::blocking::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, warn};

use super::provider::{EmbeddingProvider, ProviderError};
use crate::core::config::EmbeddingConfig;

/// Configuration for the OpenAI embedding client.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// API base URL (e.g., "https://api.openai.com/v1")
    pub base_url: String,

    /// Embedding model (e.g., "text-embedding-3-large")
    pub model: String,

    /// API key, `None` when the env var is unset or blank
    pub api_key: Option<SecretString>,

    /// Env var the key was read from, for error messages
    pub api_key_env: String,

    /// Request timeout
    pub timeout: Duration,

    /// Retries after the first attempt
    pub max_retries: u32,
}

impl OpenAiConfig {
    /// Build from project config, reading the key from the configured env var.
    pub fn from_embedding_config(config: &EmbeddingConfig) -> Self {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .map(SecretString::from);

        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            api_key_env: config.api_key_env.clone(),
            timeout: config.timeout(),
            max_retries: config.max_retries,
        }
    }

    fn require_api_key(&self) -> Result<&SecretString, ProviderError> {
        self.api_key
            .as_ref()
            .ok_or_else(|| ProviderError::MissingApiKey(self.api_key_env.clone()))
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

/// Remote embedding provider.
pub struct OpenAiProvider {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiProvider {
    pub fn new(config: OpenAiConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::Http(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn from_embedding_config(config: &EmbeddingConfig) -> Result<Self, ProviderError> {
        Self::new(OpenAiConfig::from_embedding_config(config))
    }

    /// Call the API, retrying transient failures.
    fn call_api(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, ProviderError> {
        let api_key = self.config.require_api_key()?;

        let backoff = ExponentialBackoff {
            max_elapsed_time: Some(Duration::from_secs(120)),
            ..Default::default()
        };

        with_retry(self.config.max_retries, backoff, || {
            debug!(count = texts.len(), "Calling embedding API");
            self.make_request(api_key, texts)
        })
    }

    /// Make a single API request.
    fn make_request(
        &self,
        api_key: &SecretString,
        texts: &[&str],
    ) -> Result<Vec<Vec<f32>>, ProviderError> {
        let request = EmbeddingRequest {
            model: &self.config.model,
            input: texts,
        };

        let url = format!("{}/embeddings", self.config.base_url);

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", api_key.expose_secret()),
            )
            .json(&request)
            .send()
            .map_err(|e| ProviderError::Http(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(ProviderError::RateLimited);
        }

        let body = response
            .text()
            .map_err(|e| ProviderError::Http(e.to_string()))?;

        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        parse_response(&body, texts.len())
    }
}

/// Run `op`, retrying transient errors up to `max_retries` times with the
/// delays given by `backoff`. Permanent errors are returned immediately.
fn with_retry<T, B, F>(max_retries: u32, mut backoff: B, mut op: F) -> Result<T, ProviderError>
where
    B: Backoff,
    F: FnMut() -> Result<T, ProviderError>,
{
    let mut attempts = 0;

    loop {
        attempts += 1;

        match op() {
            Ok(value) => return Ok(value),
            Err(e) => {
                if !e.is_transient() || attempts > max_retries {
                    error!(error = %e, attempts, "Embedding request failed");
                    return Err(e);
                }

                match backoff.next_backoff() {
                    Some(duration) => {
                        warn!(
                            error = %e,
                            attempt = attempts,
                            retry_in_ms = duration.as_millis(),
                            "Embedding request failed, retrying"
                        );
                        std::thread::sleep(duration);
                    }
                    None => {
                        error!(error = %e, attempts, "Backoff exhausted");
                        return Err(e);
                    }
                }
            }
        }
    }
}

/// Decode an `/embeddings` response body into vectors ordered by input index.
fn parse_response(body: &str, expected: usize) -> Result<Vec<Vec<f32>>, ProviderError> {
    let mut response: EmbeddingResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Parse(e.to_string()))?;

    if response.data.len() != expected {
        return Err(ProviderError::Parse(format!(
            "expected {} embeddings, got {}",
            expected,
            response.data.len()
        )));
    }

    response.data.sort_by_key(|d| d.index);

    if let Some(empty) = response.data.iter().find(|d| d.embedding.is_empty()) {
        return Err(ProviderError::Parse(format!(
            "empty embedding at index {}",
            empty.index
        )));
    }

    Ok(response.data.into_iter().map(|d| d.embedding).collect())
}

impl EmbeddingProvider for OpenAiProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        let mut embeddings = self.call_api(&[text])?;
        embeddings
            .pop()
            .ok_or_else(|| ProviderError::Parse("no embedding in response".to_string()))
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, ProviderError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.call_api(texts)
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}
