// SPDX-FileCopyrightText: 2026 Postloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deadline and validation wrapper around the generation adapter.
//!
//! The orchestrator owns the semantic deadline: every adapter call runs
//! under `tokio::time::timeout`, and an elapsed deadline drops the in-flight
//! future and surfaces `Timeout`. Local validation failures never reach the
//! collaborator.

use std::sync::Arc;
use std::time::Duration;

use postloom_core::types::{BatchRequest, GenerationRequest};
use postloom_core::{GenerationAdapter, PostloomError};
use tracing::debug;

/// Minimum transcript length for a repurposing batch, in characters.
pub const MIN_TRANSCRIPT_CHARS: usize = 100;

/// Deadline-enforcing front door to the generation collaborator.
#[derive(Clone)]
pub struct Orchestrator {
    adapter: Arc<dyn GenerationAdapter>,
    deadline: Duration,
}

impl Orchestrator {
    pub fn new(adapter: Arc<dyn GenerationAdapter>, deadline: Duration) -> Self {
        Self { adapter, deadline }
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Generate a single post text under the deadline.
    pub async fn generate_one(
        &self,
        request: GenerationRequest,
    ) -> Result<String, PostloomError> {
        match tokio::time::timeout(self.deadline, self.adapter.generate(request)).await {
            Ok(result) => result,
            Err(_) => Err(PostloomError::Timeout {
                duration: self.deadline,
            }),
        }
    }

    /// Generate an ordered batch of candidates from a transcript.
    ///
    /// Transcripts shorter than [`MIN_TRANSCRIPT_CHARS`] fail locally before
    /// any network call. A response with the wrong item count is a
    /// `Provider` failure, never a valid short batch.
    pub async fn generate_batch(
        &self,
        request: BatchRequest,
    ) -> Result<Vec<String>, PostloomError> {
        let transcript_chars = request.transcript.chars().count();
        if transcript_chars < MIN_TRANSCRIPT_CHARS {
            return Err(PostloomError::Validation(format!(
                "transcript must be at least {MIN_TRANSCRIPT_CHARS} characters, got {transcript_chars}"
            )));
        }

        let expected = request.count.count() as usize;
        let items = match tokio::time::timeout(self.deadline, self.adapter.generate_batch(request))
            .await
        {
            Ok(result) => result?,
            Err(_) => {
                return Err(PostloomError::Timeout {
                    duration: self.deadline,
                });
            }
        };

        if items.len() != expected {
            return Err(PostloomError::Provider {
                message: format!(
                    "collaborator returned {} items, expected {expected}",
                    items.len()
                ),
                source: None,
            });
        }
        debug!(count = expected, "batch generated");
        Ok(items)
    }
}
