// SPDX-FileCopyrightText: 2026 Postloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The transcript repurposing session.
//!
//! A session walks `Input -> Configure -> Generating -> Results`. Phase
//! guards are enforced here; a collaborator failure during generation
//! returns the session to `Configure` carrying the error string, so a
//! session is never left stranded in `Generating`.

use chrono::{DateTime, Utc};
use postloom_core::types::{BatchRequest, BatchSize, Platform, User};
use postloom_core::PostloomError;
use postloom_generation::{Orchestrator, MIN_TRANSCRIPT_CHARS};
use postloom_quota::limits;
use serde::Serialize;
use tracing::{info, warn};

use crate::candidate::Candidate;

/// Workflow phase. Linear except for the failure edge back to `Configure`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Input,
    Configure,
    Generating,
    Results,
}

/// Result of a bulk commit: which candidate indexes were persisted this
/// call, and which failed with what.
#[derive(Debug, Default)]
pub struct SaveOutcome {
    pub saved: Vec<usize>,
    pub failures: Vec<(usize, String)>,
}

/// One transcript repurposing session.
#[derive(Debug)]
pub struct RepurposeSession {
    phase: Phase,
    transcript: String,
    brand_id: String,
    platform: Platform,
    style: String,
    count: BatchSize,
    error: Option<String>,
    candidates: Vec<Candidate>,
}

impl RepurposeSession {
    /// Start a new session in the `Input` phase for one brand.
    pub fn new(brand_id: impl Into<String>) -> Self {
        Self {
            phase: Phase::Input,
            transcript: String::new(),
            brand_id: brand_id.into(),
            platform: Platform::Instagram,
            style: "engaging".to_string(),
            count: BatchSize::Five,
            error: None,
            candidates: Vec::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The error carried back from a failed generation, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Replace the transcript. Only legal in the `Input` phase.
    pub fn set_transcript(&mut self, transcript: impl Into<String>) -> Result<(), PostloomError> {
        if self.phase != Phase::Input {
            return Err(PostloomError::Validation(
                "transcript can only be edited in the input phase".to_string(),
            ));
        }
        self.transcript = transcript.into();
        Ok(())
    }

    /// Advance `Input -> Configure`, guarded by the transcript length.
    pub fn advance_to_configure(&mut self) -> Result<(), PostloomError> {
        if self.phase != Phase::Input {
            return Err(PostloomError::Validation(format!(
                "cannot advance to configure from {:?}",
                self.phase
            )));
        }
        let chars = self.transcript.chars().count();
        if chars < MIN_TRANSCRIPT_CHARS {
            return Err(PostloomError::Validation(format!(
                "transcript must be at least {MIN_TRANSCRIPT_CHARS} characters, got {chars}"
            )));
        }
        self.phase = Phase::Configure;
        Ok(())
    }

    /// Set the batch parameters. Only legal in the `Configure` phase.
    pub fn configure(
        &mut self,
        platform: Platform,
        style: impl Into<String>,
        count: BatchSize,
    ) -> Result<(), PostloomError> {
        if self.phase != Phase::Configure {
            return Err(PostloomError::Validation(
                "batch parameters can only be set in the configure phase".to_string(),
            ));
        }
        self.platform = platform;
        self.style = style.into();
        self.count = count;
        Ok(())
    }

    /// Run the batch generation, moving `Configure -> Generating -> Results`.
    ///
    /// Gated on the user's `has_video_repurpose` plan flag. On collaborator
    /// failure the session returns to `Configure` with the error string set,
    /// and the error is also returned to the caller.
    pub async fn generate(
        &mut self,
        orchestrator: &Orchestrator,
        user: &User,
    ) -> Result<(), PostloomError> {
        if self.phase != Phase::Configure {
            return Err(PostloomError::Validation(format!(
                "cannot generate from {:?}",
                self.phase
            )));
        }
        if !limits(user.plan).has_video_repurpose {
            return Err(PostloomError::Validation(format!(
                "video repurposing is not included in the {} plan",
                user.plan
            )));
        }

        self.phase = Phase::Generating;
        self.error = None;
        let request = BatchRequest {
            transcript: self.transcript.clone(),
            platform: self.platform,
            style: self.style.clone(),
            count: self.count,
        };

        match orchestrator.generate_batch(request).await {
            Ok(items) => {
                self.candidates = items.into_iter().map(Candidate::new).collect();
                self.phase = Phase::Results;
                info!(count = self.candidates.len(), "repurpose batch ready");
                Ok(())
            }
            Err(e) => {
                self.error = Some(e.to_string());
                self.phase = Phase::Configure;
                warn!(error = %e, "repurpose generation failed; back to configure");
                Err(e)
            }
        }
    }

    fn candidate_mut(&mut self, index: usize) -> Result<&mut Candidate, PostloomError> {
        if self.phase != Phase::Results {
            return Err(PostloomError::Validation(
                "candidates are only available in the results phase".to_string(),
            ));
        }
        let len = self.candidates.len();
        self.candidates.get_mut(index).ok_or_else(|| {
            PostloomError::Validation(format!("candidate index {index} out of range 0..{len}"))
        })
    }

    /// Toggle one candidate's selection.
    pub fn set_selected(&mut self, index: usize, selected: bool) -> Result<(), PostloomError> {
        self.candidate_mut(index)?.selected = selected;
        Ok(())
    }

    /// The only bulk toggle: select or deselect every candidate.
    pub fn set_all_selected(&mut self, selected: bool) -> Result<(), PostloomError> {
        if self.phase != Phase::Results {
            return Err(PostloomError::Validation(
                "candidates are only available in the results phase".to_string(),
            ));
        }
        for candidate in &mut self.candidates {
            candidate.selected = selected;
        }
        Ok(())
    }

    /// Overwrite one candidate's edit buffer.
    pub fn edit_candidate(
        &mut self,
        index: usize,
        text: impl Into<String>,
    ) -> Result<(), PostloomError> {
        self.candidate_mut(index)?.edited = Some(text.into());
        Ok(())
    }

    /// Set or clear one candidate's schedule.
    pub fn schedule_candidate(
        &mut self,
        index: usize,
        at: Option<DateTime<Utc>>,
    ) -> Result<(), PostloomError> {
        self.candidate_mut(index)?.scheduled_for = at;
        Ok(())
    }

    /// Commit every `selected && !persisted` candidate, in index order.
    ///
    /// A per-candidate failure is recorded and the loop continues; persisted
    /// siblings are never rolled back. Failed candidates keep
    /// `selected && !persisted` so a later call retries exactly those.
    pub async fn save_selected(
        &mut self,
        posts: &postloom_content::PostService,
        user: &User,
        now: DateTime<Utc>,
    ) -> Result<SaveOutcome, PostloomError> {
        if self.phase != Phase::Results {
            return Err(PostloomError::Validation(
                "candidates are only available in the results phase".to_string(),
            ));
        }

        let mut outcome = SaveOutcome::default();
        for index in 0..self.candidates.len() {
            if !(self.candidates[index].selected && !self.candidates[index].persisted) {
                continue;
            }
            match self.persist_candidate(index, posts, user, now).await {
                Ok(()) => outcome.saved.push(index),
                Err(e) => {
                    warn!(index, error = %e, "candidate commit failed; continuing");
                    outcome.failures.push((index, e.to_string()));
                }
            }
        }
        Ok(outcome)
    }

    /// Commit a single candidate immediately.
    ///
    /// Returns `Ok(false)` without any side effect when the candidate is
    /// already persisted.
    pub async fn save_now(
        &mut self,
        posts: &postloom_content::PostService,
        user: &User,
        index: usize,
        now: DateTime<Utc>,
    ) -> Result<bool, PostloomError> {
        if self.candidate_mut(index)?.persisted {
            return Ok(false);
        }
        self.persist_candidate(index, posts, user, now).await?;
        Ok(true)
    }

    async fn persist_candidate(
        &mut self,
        index: usize,
        posts: &postloom_content::PostService,
        user: &User,
        now: DateTime<Utc>,
    ) -> Result<(), PostloomError> {
        let candidate = &self.candidates[index];
        let new_post = postloom_content::NewPost {
            brand_id: self.brand_id.clone(),
            content: candidate.effective_text().to_string(),
            platform: self.platform,
            scheduled_for: candidate.scheduled_for,
            image_url: None,
            audio_url: None,
            ai_generated: true,
            generated_by: Some("repurpose".to_string()),
        };
        let post = posts.create_post(user, new_post, now).await?;
        let candidate = &mut self.candidates[index];
        candidate.persisted = true;
        candidate.post_id = Some(post.id);
        Ok(())
    }
}
