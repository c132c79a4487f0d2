// SPDX-FileCopyrightText: 2026 Postloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The post lifecycle transition function.
//!
//! Draft and Scheduled are re-enterable in both directions; Published is
//! terminal. `published_at` is stamped exactly once, on the transition in,
//! and never overwritten because no transition leaves Published.

use chrono::{DateTime, Utc};
use postloom_core::types::PostState;
use postloom_core::PostloomError;

/// A requested status change, carried by a post patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateChange {
    /// Back to draft, clearing any schedule.
    ToDraft,
    /// Schedule (or reschedule) for the given instant.
    Schedule(DateTime<Utc>),
    /// Publish immediately.
    Publish,
}

/// Apply a state change, returning the next state or a `Validation` error
/// when the change is illegal from the current state.
pub fn transition(
    current: &PostState,
    change: StateChange,
    now: DateTime<Utc>,
) -> Result<PostState, PostloomError> {
    if let PostState::Published { .. } = current {
        return Err(PostloomError::Validation(
            "published posts cannot change status".to_string(),
        ));
    }
    Ok(match change {
        StateChange::ToDraft => PostState::Draft,
        StateChange::Schedule(at) => PostState::Scheduled { at },
        StateChange::Publish => PostState::Published { at: now },
    })
}
