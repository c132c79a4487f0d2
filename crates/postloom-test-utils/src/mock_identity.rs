// SPDX-FileCopyrightText: 2026 Postloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock identity adapter mapping fixed credentials to principals.

use async_trait::async_trait;
use dashmap::DashMap;

use postloom_core::traits::{IdentityAdapter, PluginAdapter};
use postloom_core::types::{AdapterType, HealthStatus, Principal};
use postloom_core::PostloomError;

/// A mock identity collaborator backed by a credential -> principal map.
///
/// Unknown credentials resolve to `Ok(None)`, matching the contract the
/// auth middleware turns into 401.
#[derive(Default)]
pub struct MockIdentity {
    principals: DashMap<String, Principal>,
}

impl MockIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a credential for the given principal.
    pub fn register(&self, credential: &str, principal: Principal) {
        self.principals.insert(credential.to_string(), principal);
    }

    /// Register a fresh principal under `credential` and return it.
    pub fn register_new(&self, credential: &str, email: &str) -> Principal {
        let principal = Principal {
            id: format!("principal-{}", uuid::Uuid::new_v4()),
            email: email.to_string(),
        };
        self.register(credential, principal.clone());
        principal
    }

    /// Forget a credential, simulating session expiry.
    pub fn revoke(&self, credential: &str) {
        self.principals.remove(credential);
    }
}

#[async_trait]
impl PluginAdapter for MockIdentity {
    fn name(&self) -> &str {
        "mock-identity"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Identity
    }

    async fn health_check(&self) -> Result<HealthStatus, PostloomError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), PostloomError> {
        Ok(())
    }
}

#[async_trait]
impl IdentityAdapter for MockIdentity {
    async fn current_principal(
        &self,
        credential: &str,
    ) -> Result<Option<Principal>, PostloomError> {
        Ok(self.principals.get(credential).map(|p| p.clone()))
    }
}
