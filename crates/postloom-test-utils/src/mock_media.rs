// SPDX-FileCopyrightText: 2026 Postloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock media adapter for image and voiceover synthesis tests.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use postloom_core::traits::{MediaAdapter, PluginAdapter};
use postloom_core::types::{AdapterType, HealthStatus};
use postloom_core::PostloomError;

/// A mock media collaborator returning deterministic asset URLs.
///
/// Failures can be scripted per call; an empty queue means every call
/// succeeds with a URL derived from the input.
#[derive(Default)]
pub struct MockMedia {
    failures: Arc<Mutex<VecDeque<PostloomError>>>,
}

impl MockMedia {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next synthesis call with the given error.
    pub async fn push_failure(&self, err: PostloomError) {
        self.failures.lock().await.push_back(err);
    }

    async fn take_failure(&self) -> Option<PostloomError> {
        self.failures.lock().await.pop_front()
    }
}

#[async_trait]
impl PluginAdapter for MockMedia {
    fn name(&self) -> &str {
        "mock-media"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Media
    }

    async fn health_check(&self) -> Result<HealthStatus, PostloomError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), PostloomError> {
        Ok(())
    }
}

#[async_trait]
impl MediaAdapter for MockMedia {
    async fn synthesize_image(&self, prompt: &str) -> Result<String, PostloomError> {
        if let Some(err) = self.take_failure().await {
            return Err(err);
        }
        Ok(format!(
            "https://assets.test/images/{}.png",
            prompt.len()
        ))
    }

    async fn synthesize_voice(&self, text: &str, voice: &str) -> Result<String, PostloomError> {
        if let Some(err) = self.take_failure().await {
            return Err(err);
        }
        Ok(format!(
            "https://assets.test/voiceovers/{voice}-{}.mp3",
            text.len()
        ))
    }
}
