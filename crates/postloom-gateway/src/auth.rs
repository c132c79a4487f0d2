// SPDX-FileCopyrightText: 2026 Postloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authentication middleware for the gateway.
//!
//! Every `/v1` route requires a bearer credential (`Authorization: Bearer
//! <token>`). The credential is resolved to a [`Principal`] by the identity
//! collaborator, and the owning [`User`] row is loaded (created lazily on
//! first access) and attached to the request as an extension.
//!
//! When no identity adapter is configured, all requests are rejected
//! (fail-closed).

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use postloom_core::traits::IdentityAdapter;
use postloom_core::types::Principal;
use postloom_storage::queries::users;
use postloom_storage::Database;

/// Authentication state shared by the auth middleware.
#[derive(Clone)]
pub struct AuthState {
    /// Identity collaborator resolving credentials to principals.
    /// `None` means auth is unconfigured and every request is rejected.
    pub identity: Option<Arc<dyn IdentityAdapter>>,
    /// Database handle for the lazy user-row lookup.
    pub db: Database,
}

impl std::fmt::Debug for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthState")
            .field(
                "identity",
                &self.identity.as_ref().map(|a| a.name()),
            )
            .finish_non_exhaustive()
    }
}

/// Middleware that resolves the bearer credential to an authenticated user.
///
/// On success the request carries a [`Principal`] and a [`User`] extension
/// for downstream handlers. Missing or unknown credentials yield 401; an
/// identity-collaborator failure yields 502.
///
/// [`User`]: postloom_core::types::User
pub async fn auth_middleware(
    State(auth): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    // No identity adapter configured: reject all requests (fail-closed).
    let Some(identity) = auth.identity.as_ref() else {
        tracing::error!("gateway has no identity adapter configured -- rejecting request");
        return Err(StatusCode::UNAUTHORIZED);
    };

    let credential = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    let Some(credential) = credential else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    let principal: Principal = match identity.current_principal(credential).await {
        Ok(Some(principal)) => principal,
        Ok(None) => return Err(StatusCode::UNAUTHORIZED),
        Err(e) => {
            tracing::warn!(error = %e, "identity collaborator failed to resolve credential");
            return Err(StatusCode::BAD_GATEWAY);
        }
    };

    let user = users::ensure_user(&auth.db, &principal.id, &principal.email, chrono::Utc::now())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, principal_id = %principal.id, "user lookup failed");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    request.extensions_mut().insert(principal);
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Identity adapter backed by the single configured service token.
///
/// Every request presenting the exact token resolves to the same fixed
/// principal. Used for single-operator deployments without an external
/// identity collaborator.
pub struct StaticTokenIdentity {
    token: String,
    principal: Principal,
}

impl StaticTokenIdentity {
    pub fn new(token: String) -> Self {
        Self {
            token,
            principal: Principal {
                id: "local-operator".to_string(),
                email: "operator@localhost".to_string(),
            },
        }
    }
}

impl std::fmt::Debug for StaticTokenIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticTokenIdentity")
            .field("token", &"[redacted]")
            .field("principal", &self.principal)
            .finish()
    }
}

#[async_trait::async_trait]
impl postloom_core::traits::PluginAdapter for StaticTokenIdentity {
    fn name(&self) -> &str {
        "static-token"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> postloom_core::types::AdapterType {
        postloom_core::types::AdapterType::Identity
    }

    async fn health_check(
        &self,
    ) -> Result<postloom_core::types::HealthStatus, postloom_core::PostloomError> {
        Ok(postloom_core::types::HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), postloom_core::PostloomError> {
        Ok(())
    }
}

#[async_trait::async_trait]
impl IdentityAdapter for StaticTokenIdentity {
    async fn current_principal(
        &self,
        credential: &str,
    ) -> Result<Option<Principal>, postloom_core::PostloomError> {
        if credential == self.token {
            Ok(Some(self.principal.clone()))
        } else {
            Ok(None)
        }
    }
}
