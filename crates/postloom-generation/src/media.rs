// SPDX-FileCopyrightText: 2026 Postloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Media synthesis: HTTP adapter plus the plan-gated service.
//!
//! The service checks the plan feature flag before calling out, wraps the
//! call in the configured deadline, and consumes one unit of the matching
//! usage counter exactly once, after the collaborator returns a URL.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use postloom_config::model::MediaConfig;
use postloom_core::types::{AdapterType, HealthStatus, ResourceKind, User};
use postloom_core::{MediaAdapter, PluginAdapter, PostloomError};
use postloom_quota::limits;
use postloom_storage::queries::users;
use postloom_storage::Database;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Serialize)]
struct ImageWireRequest<'a> {
    prompt: &'a str,
}

#[derive(Debug, Serialize)]
struct VoiceWireRequest<'a> {
    text: &'a str,
    voice: &'a str,
}

#[derive(Debug, Deserialize)]
struct AssetWireResponse {
    url: String,
}

/// HTTP client for the media synthesis collaborator.
#[derive(Debug, Clone)]
pub struct MediaClient {
    client: reqwest::Client,
    base_url: String,
}

impl MediaClient {
    pub fn new(config: &MediaConfig) -> Result<Self, PostloomError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PostloomError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn synthesize<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<String, PostloomError> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| PostloomError::Provider {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, path, "media response received");
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PostloomError::Provider {
                message: format!("media API returned {status}: {body}"),
                source: None,
            });
        }
        let asset: AssetWireResponse =
            response.json().await.map_err(|e| PostloomError::Provider {
                message: format!("failed to parse media response: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(asset.url)
    }
}

#[async_trait]
impl PluginAdapter for MediaClient {
    fn name(&self) -> &str {
        "media-http"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Media
    }

    async fn health_check(&self) -> Result<HealthStatus, PostloomError> {
        let url = format!("{}/health", self.base_url);
        match self.client.get(&url).send().await {
            Ok(resp) if resp.status().is_success() => Ok(HealthStatus::Healthy),
            Ok(resp) => Ok(HealthStatus::Degraded(format!(
                "health endpoint returned {}",
                resp.status()
            ))),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }

    async fn shutdown(&self) -> Result<(), PostloomError> {
        Ok(())
    }
}

#[async_trait]
impl MediaAdapter for MediaClient {
    async fn synthesize_image(&self, prompt: &str) -> Result<String, PostloomError> {
        self.synthesize("/v1/images", &ImageWireRequest { prompt }).await
    }

    async fn synthesize_voice(&self, text: &str, voice: &str) -> Result<String, PostloomError> {
        self.synthesize("/v1/voiceovers", &VoiceWireRequest { text, voice }).await
    }
}

/// Plan-gated media synthesis over any [`MediaAdapter`].
#[derive(Clone)]
pub struct MediaService {
    adapter: Arc<dyn MediaAdapter>,
    db: Database,
    deadline: Duration,
}

impl MediaService {
    pub fn new(adapter: Arc<dyn MediaAdapter>, db: Database, deadline: Duration) -> Self {
        Self {
            adapter,
            db,
            deadline,
        }
    }

    /// Synthesize an image for the user, consuming image quota on success.
    pub async fn generate_image(
        &self,
        user: &User,
        prompt: &str,
        now: DateTime<Utc>,
    ) -> Result<String, PostloomError> {
        let plan = limits(user.plan);
        if !plan.has_image_generation {
            return Err(PostloomError::Validation(format!(
                "image generation is not included in the {} plan",
                user.plan
            )));
        }

        let url = self.call(self.adapter.synthesize_image(prompt)).await?;
        users::increment_media_usage(
            &self.db,
            &user.id,
            ResourceKind::Images,
            plan.max_images_per_month,
            now,
        )
        .await?;
        info!(user_id = %user.id, "image synthesized");
        Ok(url)
    }

    /// Synthesize a voiceover for the user, consuming voiceover quota on
    /// success.
    pub async fn generate_voice(
        &self,
        user: &User,
        text: &str,
        voice: &str,
        now: DateTime<Utc>,
    ) -> Result<String, PostloomError> {
        let plan = limits(user.plan);
        if !plan.has_voiceover {
            return Err(PostloomError::Validation(format!(
                "voiceovers are not included in the {} plan",
                user.plan
            )));
        }

        let url = self.call(self.adapter.synthesize_voice(text, voice)).await?;
        users::increment_media_usage(
            &self.db,
            &user.id,
            ResourceKind::Voiceovers,
            plan.max_voiceovers_per_month,
            now,
        )
        .await?;
        info!(user_id = %user.id, "voiceover synthesized");
        Ok(url)
    }

    async fn call<F>(&self, fut: F) -> Result<String, PostloomError>
    where
        F: std::future::Future<Output = Result<String, PostloomError>>,
    {
        match tokio::time::timeout(self.deadline, fut).await {
            Ok(result) => result,
            Err(_) => Err(PostloomError::Timeout {
                duration: self.deadline,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use postloom_core::types::PlanTier;
    use std::sync::Mutex;

    struct FixedMedia {
        fail: bool,
        calls: Mutex<u32>,
    }

    #[async_trait]
    impl PluginAdapter for FixedMedia {
        fn name(&self) -> &str {
            "fixed"
        }
        fn version(&self) -> semver::Version {
            semver::Version::new(0, 0, 0)
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
    impl MediaAdapter for FixedMedia {
        async fn synthesize_image(&self, _prompt: &str) -> Result<String, PostloomError> {
            *self.calls.lock().unwrap() += 1;
            if self.fail {
                return Err(PostloomError::Provider {
                    message: "synth failed".into(),
                    source: None,
                });
            }
            Ok("https://assets.example.com/img/1.png".to_string())
        }

        async fn synthesize_voice(&self, _t: &str, _v: &str) -> Result<String, PostloomError> {
            *self.calls.lock().unwrap() += 1;
            Ok("https://assets.example.com/audio/1.mp3".to_string())
        }
    }

    fn jan15() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
    }

    async fn setup(plan: PlanTier, fail: bool) -> (Database, MediaService, User, Arc<FixedMedia>) {
        let db = Database::open_in_memory().await.unwrap();
        let user = users::ensure_user(&db, "p1", "p@example.com", jan15()).await.unwrap();
        users::set_plan(&db, &user.id, plan).await.unwrap();
        let user = users::get_user(&db, &user.id).await.unwrap().unwrap();
        let adapter = Arc::new(FixedMedia {
            fail,
            calls: Mutex::new(0),
        });
        let service = MediaService::new(adapter.clone(), db.clone(), Duration::from_secs(60));
        (db, service, user, adapter)
    }

    #[tokio::test]
    async fn free_plan_is_gated_before_any_call() {
        let (_db, service, user, adapter) = setup(PlanTier::Free, false).await;
        let err = service.generate_image(&user, "sunset", jan15()).await.unwrap_err();
        assert!(matches!(err, PostloomError::Validation(_)), "got {err}");
        assert_eq!(*adapter.calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn success_increments_the_counter_once() {
        let (db, service, user, _adapter) = setup(PlanTier::Pro, false).await;
        let url = service.generate_image(&user, "sunset", jan15()).await.unwrap();
        assert!(url.ends_with(".png"));

        let stored = users::get_user(&db, &user.id).await.unwrap().unwrap();
        assert_eq!(stored.images_this_month, 1);
        assert_eq!(stored.voiceovers_this_month, 0);
    }

    #[tokio::test]
    async fn provider_failure_leaves_the_counter_alone() {
        let (db, service, user, _adapter) = setup(PlanTier::Pro, true).await;
        let err = service.generate_image(&user, "sunset", jan15()).await.unwrap_err();
        assert!(matches!(err, PostloomError::Provider { .. }), "got {err}");

        let stored = users::get_user(&db, &user.id).await.unwrap().unwrap();
        assert_eq!(stored.images_this_month, 0);
    }

    #[tokio::test]
    async fn voiceover_uses_its_own_counter() {
        let (db, service, user, _adapter) = setup(PlanTier::Business, false).await;
        service.generate_voice(&user, "read this", "warm", jan15()).await.unwrap();

        let stored = users::get_user(&db, &user.id).await.unwrap().unwrap();
        assert_eq!(stored.voiceovers_this_month, 1);
        assert_eq!(stored.images_this_month, 0);
    }
}
