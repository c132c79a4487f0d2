// SPDX-FileCopyrightText: 2026 Postloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Input types for the brand and post services.
//!
//! Patches are explicit field-by-field types: a `None` field is left
//! untouched, a `Some` field is written. There is no reflective or
//! map-based patching.

use chrono::{DateTime, Utc};
use postloom_core::types::Platform;
use serde::Deserialize;

use crate::lifecycle::StateChange;

/// Input for brand creation. Everything but the name can be defaulted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewBrand {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub initials: Option<String>,
    #[serde(default)]
    pub voice: Option<String>,
    #[serde(default)]
    pub topics: Option<Vec<String>>,
    #[serde(default)]
    pub voice_profile: Option<String>,
}

/// Partial update for a brand.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BrandPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub initials: Option<String>,
    #[serde(default)]
    pub voice: Option<String>,
    #[serde(default)]
    pub topics: Option<Vec<String>>,
    #[serde(default)]
    pub voice_profile: Option<String>,
}

impl BrandPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.color.is_none()
            && self.initials.is_none()
            && self.voice.is_none()
            && self.topics.is_none()
            && self.voice_profile.is_none()
    }
}

/// Input for post creation. A schedule makes the post start out Scheduled;
/// otherwise it starts as a Draft.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewPost {
    pub brand_id: String,
    pub content: String,
    pub platform: Platform,
    #[serde(default)]
    pub scheduled_for: Option<DateTime<Utc>>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub audio_url: Option<String>,
    #[serde(default)]
    pub ai_generated: bool,
    #[serde(default)]
    pub generated_by: Option<String>,
}

/// Partial update for a post. Status changes ride in `state` and go through
/// the lifecycle transition function.
#[derive(Debug, Clone, Default)]
pub struct PostPatch {
    pub content: Option<String>,
    pub platform: Option<Platform>,
    pub image_url: Option<String>,
    pub audio_url: Option<String>,
    pub state: Option<StateChange>,
}
