// SPDX-FileCopyrightText: 2026 Postloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post service: quota-gated creation, lifecycle-checked updates.

use chrono::{DateTime, Utc};
use postloom_core::types::{Post, PostState, User};
use postloom_core::PostloomError;
use postloom_quota::limits;
use postloom_storage::queries::posts;
use postloom_storage::Database;
use tracing::info;

use crate::lifecycle::transition;
use crate::resolver::{resolve_owned_brand, resolve_owned_post};
use crate::types::{NewPost, PostPatch};

/// Post CRUD over the storage handle.
#[derive(Clone)]
pub struct PostService {
    db: Database,
}

impl PostService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Create a post under an owned brand, consuming one unit of the monthly
    /// post quota.
    ///
    /// The brand is resolved first (`NotFound`/`Forbidden` before any quota
    /// effect); the quota check and the insert then share one storage
    /// transaction.
    pub async fn create_post(
        &self,
        user: &User,
        new: NewPost,
        now: DateTime<Utc>,
    ) -> Result<Post, PostloomError> {
        if new.content.trim().is_empty() {
            return Err(PostloomError::Validation(
                "post content must not be empty".to_string(),
            ));
        }
        let brand = resolve_owned_brand(&self.db, &user.id, &new.brand_id).await?;

        let state = match new.scheduled_for {
            Some(at) => PostState::Scheduled { at },
            None => PostState::Draft,
        };
        let post = Post {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user.id.clone(),
            brand_id: brand.id,
            content: new.content,
            platform: new.platform,
            state,
            image_url: new.image_url,
            audio_url: new.audio_url,
            ai_generated: new.ai_generated,
            generated_by: new.generated_by,
            created_at: now,
        };

        let max_posts = limits(user.plan).max_posts_per_month;
        posts::insert_post_with_quota(&self.db, &post, max_posts, now).await?;
        info!(post_id = %post.id, user_id = %user.id, "post created");
        Ok(post)
    }

    /// Fetch one owned post.
    pub async fn get_post(&self, user: &User, post_id: &str) -> Result<Post, PostloomError> {
        resolve_owned_post(&self.db, &user.id, post_id).await
    }

    /// List the user's posts, newest first, optionally scoped to one brand.
    ///
    /// A brand filter is resolved for ownership so a foreign brand id is
    /// `Forbidden` rather than an empty list.
    pub async fn list_posts(
        &self,
        user: &User,
        brand_id: Option<&str>,
    ) -> Result<Vec<Post>, PostloomError> {
        if let Some(brand_id) = brand_id {
            resolve_owned_brand(&self.db, &user.id, brand_id).await?;
        }
        posts::list_posts(&self.db, &user.id, brand_id).await
    }

    /// Apply a partial update to an owned post.
    ///
    /// A status change in the patch goes through the lifecycle transition
    /// function; an illegal transition fails the whole patch and nothing is
    /// written.
    pub async fn update_post(
        &self,
        user: &User,
        post_id: &str,
        patch: PostPatch,
        now: DateTime<Utc>,
    ) -> Result<Post, PostloomError> {
        let mut post = resolve_owned_post(&self.db, &user.id, post_id).await?;

        if let Some(change) = patch.state {
            post.state = transition(&post.state, change, now)?;
        }
        if let Some(content) = patch.content {
            if content.trim().is_empty() {
                return Err(PostloomError::Validation(
                    "post content must not be empty".to_string(),
                ));
            }
            post.content = content;
        }
        if let Some(platform) = patch.platform {
            post.platform = platform;
        }
        if let Some(image_url) = patch.image_url {
            post.image_url = Some(image_url);
        }
        if let Some(audio_url) = patch.audio_url {
            post.audio_url = Some(audio_url);
        }

        posts::update_post(&self.db, &post).await?;
        Ok(post)
    }

    /// Delete an owned post. The monthly counter is not refunded.
    pub async fn delete_post(&self, user: &User, post_id: &str) -> Result<(), PostloomError> {
        resolve_owned_post(&self.db, &user.id, post_id).await?;
        posts::delete_post(&self.db, post_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brands::BrandService;
    use crate::lifecycle::StateChange;
    use crate::types::NewBrand;
    use chrono::TimeZone;
    use postloom_core::types::{Brand, Platform, ResourceKind};
    use postloom_storage::queries::users;

    fn jan15() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
    }

    async fn setup() -> (Database, PostService, User, Brand) {
        let db = Database::open_in_memory().await.unwrap();
        let user = users::ensure_user(&db, "p1", "p@example.com", jan15()).await.unwrap();
        let brand = BrandService::new(db.clone())
            .create_brand(&user, NewBrand { name: "Acme".into(), ..Default::default() }, jan15())
            .await
            .unwrap();
        (db.clone(), PostService::new(db), user, brand)
    }

    fn new_post(brand: &Brand, content: &str) -> NewPost {
        NewPost {
            brand_id: brand.id.clone(),
            content: content.to_string(),
            platform: Platform::Instagram,
            scheduled_for: None,
            image_url: None,
            audio_url: None,
            ai_generated: false,
            generated_by: None,
        }
    }

    #[tokio::test]
    async fn create_draft_and_scheduled() {
        let (_db, service, user, brand) = setup().await;
        let draft = service.create_post(&user, new_post(&brand, "plain"), jan15()).await.unwrap();
        assert_eq!(draft.state, PostState::Draft);

        let at = Utc.with_ymd_and_hms(2026, 1, 20, 9, 0, 0).unwrap();
        let scheduled = service
            .create_post(
                &user,
                NewPost {
                    scheduled_for: Some(at),
                    ..new_post(&brand, "later")
                },
                jan15(),
            )
            .await
            .unwrap();
        assert_eq!(scheduled.state, PostState::Scheduled { at });
    }

    #[tokio::test]
    async fn quota_counts_against_the_plan() {
        let (db, service, user, brand) = setup().await;
        // Free plan: 10 posts a month.
        for i in 0..10 {
            service
                .create_post(&user, new_post(&brand, &format!("post {i}")), jan15())
                .await
                .unwrap();
        }
        let err = service
            .create_post(&user, new_post(&brand, "one too many"), jan15())
            .await
            .unwrap_err();
        assert!(
            matches!(
                err,
                PostloomError::QuotaExceeded { resource: ResourceKind::Posts, limit: 10 }
            ),
            "got {err}"
        );
        let stored = users::get_user(&db, &user.id).await.unwrap().unwrap();
        assert_eq!(stored.posts_this_month, 10);
    }

    #[tokio::test]
    async fn foreign_brand_blocks_creation_before_quota() {
        let (db, service, user, _brand) = setup().await;
        let other = users::ensure_user(&db, "p2", "q@example.com", jan15()).await.unwrap();
        let their_brand = BrandService::new(db.clone())
            .create_brand(&other, NewBrand { name: "Theirs".into(), ..Default::default() }, jan15())
            .await
            .unwrap();

        let err = service
            .create_post(&user, new_post(&their_brand, "nope"), jan15())
            .await
            .unwrap_err();
        assert!(matches!(err, PostloomError::Forbidden { entity: "brand", .. }), "got {err}");
        // No quota was consumed by the failed attempt.
        let stored = users::get_user(&db, &user.id).await.unwrap().unwrap();
        assert_eq!(stored.posts_this_month, 0);
    }

    #[tokio::test]
    async fn cross_user_update_is_forbidden() {
        let (db, service, user, brand) = setup().await;
        let post = service.create_post(&user, new_post(&brand, "mine"), jan15()).await.unwrap();
        let other = users::ensure_user(&db, "p2", "q@example.com", jan15()).await.unwrap();

        let err = service
            .update_post(
                &other,
                &post.id,
                PostPatch { content: Some("hijack".into()), ..Default::default() },
                jan15(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, PostloomError::Forbidden { entity: "post", .. }), "got {err}");
    }

    #[tokio::test]
    async fn publish_then_edit_attempts_fail_cleanly() {
        let (_db, service, user, brand) = setup().await;
        let post = service.create_post(&user, new_post(&brand, "ship it"), jan15()).await.unwrap();

        let published_at = Utc.with_ymd_and_hms(2026, 1, 16, 8, 0, 0).unwrap();
        let published = service
            .update_post(
                &user,
                &post.id,
                PostPatch { state: Some(StateChange::Publish), ..Default::default() },
                published_at,
            )
            .await
            .unwrap();
        assert_eq!(published.state.published_at(), Some(published_at));

        // Any later status change is rejected and nothing is written.
        let err = service
            .update_post(
                &user,
                &post.id,
                PostPatch {
                    state: Some(StateChange::ToDraft),
                    content: Some("rewrite".into()),
                    ..Default::default()
                },
                jan15(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, PostloomError::Validation(_)), "got {err}");
        let unchanged = service.get_post(&user, &post.id).await.unwrap();
        assert_eq!(unchanged.content, "ship it");
        assert_eq!(unchanged.state.published_at(), Some(published_at));
    }

    #[tokio::test]
    async fn content_only_patch_keeps_state() {
        let (_db, service, user, brand) = setup().await;
        let at = Utc.with_ymd_and_hms(2026, 1, 20, 9, 0, 0).unwrap();
        let post = service
            .create_post(
                &user,
                NewPost { scheduled_for: Some(at), ..new_post(&brand, "before") },
                jan15(),
            )
            .await
            .unwrap();

        let patched = service
            .update_post(
                &user,
                &post.id,
                PostPatch { content: Some("after".into()), ..Default::default() },
                jan15(),
            )
            .await
            .unwrap();
        assert_eq!(patched.content, "after");
        assert_eq!(patched.state, PostState::Scheduled { at });
    }

    #[tokio::test]
    async fn list_with_foreign_brand_filter_is_forbidden() {
        let (db, service, user, _brand) = setup().await;
        let other = users::ensure_user(&db, "p2", "q@example.com", jan15()).await.unwrap();
        let their_brand = BrandService::new(db.clone())
            .create_brand(&other, NewBrand { name: "Theirs".into(), ..Default::default() }, jan15())
            .await
            .unwrap();

        let err = service.list_posts(&user, Some(&their_brand.id)).await.unwrap_err();
        assert!(matches!(err, PostloomError::Forbidden { .. }), "got {err}");
    }
}
