// SPDX-FileCopyrightText: 2026 Postloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the billing collaborator.
//!
//! Postloom only opens checkout/portal sessions here. Plan changes arrive
//! out of band and land as `set_plan` on the user row; webhook parsing is
//! out of scope.

use std::time::Duration;

use async_trait::async_trait;
use postloom_config::model::BillingConfig;
use postloom_core::types::{AdapterType, HealthStatus, PlanTier};
use postloom_core::{BillingAdapter, PluginAdapter, PostloomError};
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Serialize)]
struct CheckoutWireRequest {
    plan: PlanTier,
}

#[derive(Debug, Serialize)]
struct PortalWireRequest<'a> {
    customer_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct SessionWireResponse {
    url: String,
}

/// HTTP client for the billing collaborator.
#[derive(Debug, Clone)]
pub struct BillingClient {
    client: reqwest::Client,
    base_url: String,
}

impl BillingClient {
    /// Creates a billing client; fails with `Config` when the section is
    /// incomplete.
    pub fn new(config: &BillingConfig) -> Result<Self, PostloomError> {
        let api_key = config
            .api_key
            .as_deref()
            .ok_or_else(|| PostloomError::Config("billing.api_key is required".to_string()))?;
        let base_url = config
            .base_url
            .as_deref()
            .ok_or_else(|| PostloomError::Config("billing.base_url is required".to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert(
            "authorization",
            HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|e| {
                PostloomError::Config(format!("invalid API key header value: {e}"))
            })?,
        );
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| PostloomError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn session<B: Serialize>(&self, path: &str, body: &B) -> Result<String, PostloomError> {
        let url = format!("{}{path}", self.base_url);
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
        debug!(status = %status, path, "billing response received");
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PostloomError::Provider {
                message: format!("billing API returned {status}: {body}"),
                source: None,
            });
        }
        let session: SessionWireResponse =
            response.json().await.map_err(|e| PostloomError::Provider {
                message: format!("failed to parse billing response: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(session.url)
    }
}

#[async_trait]
impl PluginAdapter for BillingClient {
    fn name(&self) -> &str {
        "billing-http"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Billing
    }

    async fn health_check(&self) -> Result<HealthStatus, PostloomError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), PostloomError> {
        Ok(())
    }
}

#[async_trait]
impl BillingAdapter for BillingClient {
    async fn checkout_session(&self, plan: PlanTier) -> Result<String, PostloomError> {
        self.session("/v1/checkout/sessions", &CheckoutWireRequest { plan })
            .await
    }

    async fn portal_session(&self, customer_id: &str) -> Result<String, PostloomError> {
        self.session("/v1/portal/sessions", &PortalWireRequest { customer_id })
            .await
    }
}
