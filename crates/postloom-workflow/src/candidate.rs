// SPDX-FileCopyrightText: 2026 Postloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-candidate sub-state within a repurposing session.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One generated candidate and its selection/edit/schedule/persistence
/// state. Sub-state is independent between candidates.
#[derive(Debug, Clone, Serialize)]
pub struct Candidate {
    /// The generated text, kept as returned.
    pub text: String,
    /// Edit buffer; `None` means the generated text is used as-is.
    pub edited: Option<String>,
    /// Selected for bulk commit. Defaults to true.
    pub selected: bool,
    /// Optional schedule applied when the candidate is committed.
    pub scheduled_for: Option<DateTime<Utc>>,
    /// Set once the candidate has been committed as a post.
    pub persisted: bool,
    /// The id of the created post, once persisted.
    pub post_id: Option<String>,
}

impl Candidate {
    pub fn new(text: String) -> Self {
        Self {
            text,
            edited: None,
            selected: true,
            scheduled_for: None,
            persisted: false,
            post_id: None,
        }
    }

    /// The text a commit would persist: the edit buffer when present,
    /// otherwise the generated text.
    pub fn effective_text(&self) -> &str {
        self.edited.as_deref().unwrap_or(&self.text)
    }
}
