// SPDX-FileCopyrightText: 2026 Postloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transcript repurposing workflow for the Postloom content service.
//!
//! A [`RepurposeSession`] turns one long-form transcript into a reviewed,
//! partially-committed batch of posts: phase transitions with guards,
//! per-candidate selection and editing, and failure-tolerant commit.

pub mod candidate;
pub mod session;

pub use candidate::Candidate;
pub use session::{Phase, RepurposeSession, SaveOutcome};
