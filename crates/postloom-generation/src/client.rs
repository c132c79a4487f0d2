// SPDX-FileCopyrightText: 2026 Postloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the generation collaborator.
//!
//! Provides [`GenerationClient`] which handles request construction,
//! authentication, and transient error retry. Deadlines are imposed by the
//! orchestrator wrapping these calls, not here.

use std::time::Duration;

use async_trait::async_trait;
use postloom_config::model::GenerationConfig;
use postloom_core::types::{AdapterType, BatchRequest, GenerationRequest, HealthStatus};
use postloom_core::{GenerationAdapter, PluginAdapter, PostloomError};
use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::types::{
    ApiErrorResponse, BatchWireRequest, BatchWireResponse, GenerateWireRequest,
    GenerateWireResponse,
};

/// Transport-level ceiling; semantic deadlines live in the orchestrator.
const HTTP_TIMEOUT: Duration = Duration::from_secs(300);

/// HTTP client for the generation collaborator.
///
/// Manages authentication headers, connection pooling, and retry logic for
/// transient errors (429, 500, 503): one retry after a 1-second delay.
#[derive(Debug, Clone)]
pub struct GenerationClient {
    client: reqwest::Client,
    base_url: String,
    default_model: String,
    max_retries: u32,
}

impl GenerationClient {
    /// Creates a new generation client from the config section.
    ///
    /// Fails with `Config` when no API key is set.
    pub fn new(config: &GenerationConfig) -> Result<Self, PostloomError> {
        let api_key = config.api_key.as_deref().ok_or_else(|| {
            PostloomError::Config("generation.api_key is required".to_string())
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(
            "authorization",
            HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|e| {
                PostloomError::Config(format!("invalid API key header value: {e}"))
            })?,
        );
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| PostloomError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            default_model: config.default_model.clone(),
            max_retries: 1,
        })
    }

    /// Returns the default model identifier.
    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// POST `body` to `path`, retrying once after 1s on a transient status.
    async fn post<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, PostloomError> {
        let url = format!("{}{path}", self.base_url);
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, path, "retrying request after transient error");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            let response = self
                .client
                .post(&url)
                .json(body)
                .send()
                .await
                .map_err(|e| PostloomError::Provider {
                    message: format!("HTTP request failed: {e}"),
                    source: Some(Box::new(e)),
                })?;

            let status = response.status();
            debug!(status = %status, attempt, path, "response received");

            if status.is_success() {
                let text = response.text().await.map_err(|e| PostloomError::Provider {
                    message: format!("failed to read response body: {e}"),
                    source: Some(Box::new(e)),
                })?;
                return serde_json::from_str(&text).map_err(|e| PostloomError::Provider {
                    message: format!("failed to parse API response: {e}"),
                    source: Some(Box::new(e)),
                });
            }

            let text = response.text().await.unwrap_or_default();
            if is_transient_error(status) && attempt < self.max_retries {
                warn!(status = %status, body = %text, "transient error, will retry");
                last_error = Some(PostloomError::Provider {
                    message: format!("API returned {status}: {text}"),
                    source: None,
                });
                continue;
            }

            // Non-transient error or exhausted retries.
            let message = if let Ok(api_err) = serde_json::from_str::<ApiErrorResponse>(&text) {
                format!(
                    "generation API error ({}): {}",
                    api_err.error.type_, api_err.error.message
                )
            } else {
                format!("API returned {status}: {text}")
            };
            return Err(PostloomError::Provider {
                message,
                source: None,
            });
        }

        Err(last_error.unwrap_or_else(|| PostloomError::Provider {
            message: "request failed after retries".into(),
            source: None,
        }))
    }
}

#[async_trait]
impl PluginAdapter for GenerationClient {
    fn name(&self) -> &str {
        "generation-http"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Generation
    }

    async fn health_check(&self) -> Result<HealthStatus, PostloomError> {
        let url = format!("{}/health", self.base_url);
        match self.client.get(&url).send().await {
            Ok(resp) if resp.status().is_success() => Ok(HealthStatus::Healthy),
            Ok(resp) => Ok(HealthStatus::Degraded(format!(
                "health endpoint returned {}",
                resp.status()
            ))),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }

    async fn shutdown(&self) -> Result<(), PostloomError> {
        Ok(())
    }
}

#[async_trait]
impl GenerationAdapter for GenerationClient {
    async fn generate(&self, request: GenerationRequest) -> Result<String, PostloomError> {
        let wire = GenerateWireRequest {
            model: request
                .model
                .unwrap_or_else(|| self.default_model.clone()),
            prompt: request.prompt,
            platform: request.platform,
            voice: request.voice,
        };
        let response: GenerateWireResponse = self.post("/v1/generate", &wire).await?;
        debug!(id = %response.id, model = %response.model, "generation complete");
        Ok(response.text)
    }

    async fn generate_batch(&self, request: BatchRequest) -> Result<Vec<String>, PostloomError> {
        let wire = BatchWireRequest {
            model: self.default_model.clone(),
            transcript: request.transcript,
            platform: request.platform,
            style: request.style,
            count: request.count.into(),
        };
        let response: BatchWireResponse = self.post("/v1/generate/batch", &wire).await?;
        debug!(id = %response.id, items = response.items.len(), "batch complete");
        Ok(response.items)
    }
}

/// True for HTTP status codes that indicate transient errors worth retrying.
fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 503)
}
