//! Generation calls against the hosted model provider.
//!
//! The relay loop talks to the model through the [`GenerativeModel`] trait so
//! tests can substitute a scripted implementation; [`GeminiClient`] is the
//! real one, speaking the generateContent endpoint of the Google
//! generative-language API.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{Value, json};
use thiserror::Error;

use crate::secret::{ExposeSecret, SecretString};

/// Longest error-body excerpt carried into an error message.
const ERROR_BODY_LIMIT: usize = 200;

/// Failures of a single generation call.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("generation call timed out after {0:?}")]
    Timeout(Duration),
    #[error("request to model provider failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("model provider returned {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("invalid JSON from model provider: {0}")]
    InvalidJson(#[source] reqwest::Error),
}

/// A handle to a hosted generative-language model.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Run one generation call and return the provider's raw response value.
    /// Normalization into text is the caller's job.
    async fn generate(&self, prompt: &str) -> Result<Value>;

    /// Short human-readable description for startup output.
    fn describe(&self) -> String;
}

/// Client for the Google generative-language API.
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: SecretString,
    timeout: Duration,
}

impl GeminiClient {
    /// Build a client bound to one model, with a per-request timeout.
    /// The credential travels in a request header, never in the URL.
    pub fn new(
        api_key: SecretString,
        model: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to construct HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            model: model.into(),
            api_key,
            timeout,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model,
        )
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<Value> {
        let resp = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&request_body(prompt))
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    ModelError::Timeout(self.timeout)
                } else {
                    ModelError::Http(err)
                }
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(ModelError::Api {
                status,
                body: excerpt(&body),
            }
            .into());
        }

        let data: Value = resp.json().await.map_err(|err| {
            if err.is_timeout() {
                ModelError::Timeout(self.timeout)
            } else {
                ModelError::InvalidJson(err)
            }
        })?;
        Ok(data)
    }

    fn describe(&self) -> String {
        format!("{} ({})", self.model, self.base_url)
    }
}

/// generateContent request body carrying a single user turn.
fn request_body(prompt: &str) -> Value {
    json!({
        "contents": [{ "role": "user", "parts": [{ "text": prompt }] }]
    })
}

/// Bound an error body to a single loggable excerpt.
fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= ERROR_BODY_LIMIT {
        return trimmed.to_string();
    }
    let prefix: String = trimmed.chars().take(ERROR_BODY_LIMIT).collect();
    format!("{prefix}...")
}
