// SPDX-FileCopyrightText: 2026 Postloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles the full service stack over an in-memory SQLite
//! database with mock collaborators: one authenticated user, the brand and
//! post services, the usage ledger, and a mock-backed orchestrator and
//! media service.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use postloom_content::{BrandService, PostService};
use postloom_core::types::{PlanTier, User};
use postloom_core::PostloomError;
use postloom_generation::{MediaService, Orchestrator};
use postloom_quota::UsageLedger;
use postloom_storage::queries::users;
use postloom_storage::Database;

use crate::mock_generator::MockGenerator;
use crate::mock_identity::MockIdentity;
use crate::mock_media::MockMedia;

const TEST_CREDENTIAL: &str = "test-token";

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    plan: PlanTier,
    deadline: Duration,
    email: String,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            plan: PlanTier::Free,
            deadline: Duration::from_secs(30),
            email: "user@example.com".to_string(),
        }
    }

    /// Put the harness user on the given plan.
    pub fn with_plan(mut self, plan: PlanTier) -> Self {
        self.plan = plan;
        self
    }

    /// Override the orchestrator/media deadline.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Override the harness user's email.
    pub fn with_email(mut self, email: &str) -> Self {
        self.email = email.to_string();
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, PostloomError> {
        let db = Database::open_in_memory().await?;

        let identity = Arc::new(MockIdentity::new());
        let principal = identity.register_new(TEST_CREDENTIAL, &self.email);

        let mut user = users::ensure_user(&db, &principal.id, &principal.email, Utc::now()).await?;
        if self.plan != PlanTier::Free {
            users::set_plan(&db, &user.id, self.plan).await?;
            user.plan = self.plan;
        }

        let generator = Arc::new(MockGenerator::new());
        let media_adapter = Arc::new(MockMedia::new());

        Ok(TestHarness {
            brands: BrandService::new(db.clone()),
            posts: PostService::new(db.clone()),
            ledger: UsageLedger::new(db.clone()),
            orchestrator: Orchestrator::new(generator.clone(), self.deadline),
            media: MediaService::new(media_adapter.clone(), db.clone(), self.deadline),
            db,
            generator,
            media_adapter,
            identity,
            user,
        })
    }
}

/// A fully-assembled service stack with mock collaborators.
pub struct TestHarness {
    pub db: Database,
    pub brands: BrandService,
    pub posts: PostService,
    pub ledger: UsageLedger,
    pub orchestrator: Orchestrator,
    pub media: MediaService,
    /// Mock generation collaborator, for scripting outcomes.
    pub generator: Arc<MockGenerator>,
    /// Mock media collaborator, for scripting failures.
    pub media_adapter: Arc<MockMedia>,
    /// Mock identity collaborator, pre-loaded with [`TestHarness::credential`].
    pub identity: Arc<MockIdentity>,
    /// The harness user, created through the lazy first-access path.
    pub user: User,
}

impl TestHarness {
    /// Start building a harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Build a harness with all defaults (free plan, 30s deadline).
    pub async fn new() -> Result<Self, PostloomError> {
        Self::builder().build().await
    }

    /// The bearer credential the mock identity resolves to the harness user.
    pub fn credential(&self) -> &'static str {
        TEST_CREDENTIAL
    }

    /// Reload the harness user from storage, picking up counter changes.
    pub async fn refresh_user(&mut self) -> Result<(), PostloomError> {
        self.user = users::get_user(&self.db, &self.user.id)
            .await?
            .ok_or_else(|| PostloomError::NotFound {
                entity: "user",
                id: self.user.id.clone(),
            })?;
        Ok(())
    }
}
