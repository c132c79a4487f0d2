// SPDX-FileCopyrightText: 2026 Postloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Media adapter trait for image and voiceover synthesis collaborators.

use async_trait::async_trait;

use crate::error::PostloomError;
use crate::traits::adapter::PluginAdapter;

/// Adapter for image and voiceover synthesis.
///
/// On success the returned URL references a hosted asset. The usage ledger
/// is incremented by the caller exactly once, after the URL is returned,
/// never before.
#[async_trait]
pub trait MediaAdapter: PluginAdapter {
    /// Synthesize an image for the given prompt. Returns the asset URL.
    async fn synthesize_image(&self, prompt: &str) -> Result<String, PostloomError>;

    /// Synthesize a voiceover for the given text and voice preset.
    /// Returns the audio asset URL.
    async fn synthesize_voice(&self, text: &str, voice: &str) -> Result<String, PostloomError>;
}
