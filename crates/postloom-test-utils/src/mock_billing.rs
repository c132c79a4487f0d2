// SPDX-FileCopyrightText: 2026 Postloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock billing adapter returning canned session URLs.

use async_trait::async_trait;

use postloom_core::traits::{BillingAdapter, PluginAdapter};
use postloom_core::types::{AdapterType, HealthStatus, PlanTier};
use postloom_core::PostloomError;

/// A mock billing collaborator. Session URLs embed the input so tests can
/// assert the right values were forwarded.
#[derive(Debug, Default)]
pub struct MockBilling;

impl MockBilling {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PluginAdapter for MockBilling {
    fn name(&self) -> &str {
        "mock-billing"
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
impl BillingAdapter for MockBilling {
    async fn checkout_session(&self, plan: PlanTier) -> Result<String, PostloomError> {
        Ok(format!("https://billing.test/checkout/{plan}"))
    }

    async fn portal_session(&self, customer_id: &str) -> Result<String, PostloomError> {
        Ok(format!("https://billing.test/portal/{customer_id}"))
    }
}
