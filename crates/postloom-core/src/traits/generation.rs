// SPDX-FileCopyrightText: 2026 Postloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generation adapter trait for external content-generation collaborators.

use async_trait::async_trait;

use crate::error::PostloomError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{BatchRequest, GenerationRequest};

/// Adapter for the external content-generation collaborator.
///
/// Both calls are opaque: the adapter owns prompt construction and wire
/// format. Deadlines are imposed by the orchestrator wrapping these calls,
/// not by the adapter itself.
#[async_trait]
pub trait GenerationAdapter: PluginAdapter {
    /// Generate a single piece of post text.
    async fn generate(&self, request: GenerationRequest) -> Result<String, PostloomError>;

    /// Turn one long-form transcript into an ordered batch of candidate
    /// post texts. A successful response carries exactly `request.count`
    /// items; short responses are a collaborator failure.
    async fn generate_batch(&self, request: BatchRequest) -> Result<Vec<String>, PostloomError>;
}
