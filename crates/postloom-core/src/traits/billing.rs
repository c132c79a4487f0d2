// SPDX-FileCopyrightText: 2026 Postloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Billing adapter trait for the subscription/billing collaborator.

use async_trait::async_trait;

use crate::error::PostloomError;
use crate::traits::adapter::PluginAdapter;
use crate::types::PlanTier;

/// Adapter for the billing collaborator.
///
/// Postloom only initiates checkout/portal sessions and reflects the
/// collaborator's authoritative plan updates via `set_plan` on the user
/// service. Webhook parsing lives outside this core.
#[async_trait]
pub trait BillingAdapter: PluginAdapter {
    /// Create a checkout session for upgrading to the given plan.
    /// Returns the session URL the user is redirected to.
    async fn checkout_session(&self, plan: PlanTier) -> Result<String, PostloomError>;

    /// Create a billing-portal session for the given customer reference.
    async fn portal_session(&self, customer_id: &str) -> Result<String, PostloomError>;
}
