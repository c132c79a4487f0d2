// SPDX-FileCopyrightText: 2026 Postloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identity adapter trait for session/principal resolution.

use async_trait::async_trait;

use crate::error::PostloomError;
use crate::traits::adapter::PluginAdapter;
use crate::types::Principal;

/// Adapter resolving a request credential to a caller identity.
///
/// `Ok(None)` means "not authenticated" and every quota-gated mutation
/// must fail with `Unauthenticated` in that case. Authentication mechanics
/// (session cookies, token issuance) live entirely in the collaborator.
#[async_trait]
pub trait IdentityAdapter: PluginAdapter {
    /// Resolve the bearer credential from a request, if it maps to a
    /// known principal.
    async fn current_principal(
        &self,
        credential: &str,
    ) -> Result<Option<Principal>, PostloomError>;
}
