// SPDX-FileCopyrightText: 2026 Postloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ownership resolution for id-taking operations.
//!
//! Every operation that takes an entity id goes through here first; this is
//! the only authorization checkpoint. Absent rows are `NotFound`; rows owned
//! by someone else are `Forbidden`. The two are distinct error variants and
//! map to distinct HTTP statuses.

use postloom_core::types::{Brand, Post};
use postloom_core::PostloomError;
use postloom_storage::queries::{brands, posts};
use postloom_storage::Database;

/// Fetch a brand and verify it is owned by `user_id`.
pub async fn resolve_owned_brand(
    db: &Database,
    user_id: &str,
    brand_id: &str,
) -> Result<Brand, PostloomError> {
    let brand = brands::get_brand(db, brand_id)
        .await?
        .ok_or_else(|| PostloomError::NotFound {
            entity: "brand",
            id: brand_id.to_string(),
        })?;
    if brand.user_id != user_id {
        return Err(PostloomError::Forbidden {
            entity: "brand",
            id: brand_id.to_string(),
        });
    }
    Ok(brand)
}

/// Fetch a post and verify it is owned by `user_id`.
pub async fn resolve_owned_post(
    db: &Database,
    user_id: &str,
    post_id: &str,
) -> Result<Post, PostloomError> {
    let post = posts::get_post(db, post_id)
        .await?
        .ok_or_else(|| PostloomError::NotFound {
            entity: "post",
            id: post_id.to_string(),
        })?;
    if post.user_id != user_id {
        return Err(PostloomError::Forbidden {
            entity: "post",
            id: post_id.to_string(),
        });
    }
    Ok(post)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use postloom_core::types::{Platform, PostState};
    use postloom_storage::queries::users;

    async fn setup() -> (Database, String, String, String) {
        let db = Database::open_in_memory().await.unwrap();
        let now = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
        let owner = users::ensure_user(&db, "p1", "a@example.com", now).await.unwrap();
        let intruder = users::ensure_user(&db, "p2", "b@example.com", now).await.unwrap();

        let brand = Brand {
            id: "b1".to_string(),
            user_id: owner.id.clone(),
            name: "Acme".to_string(),
            description: None,
            color: "indigo".to_string(),
            initials: "A".to_string(),
            voice: "professional".to_string(),
            topics: Vec::new(),
            voice_profile: None,
            created_at: now,
        };
        brands::insert_brand_with_quota(&db, &brand, 5).await.unwrap();
        let post = Post {
            id: "po1".to_string(),
            user_id: owner.id.clone(),
            brand_id: brand.id.clone(),
            content: "hello".to_string(),
            platform: Platform::Twitter,
            state: PostState::Draft,
            image_url: None,
            audio_url: None,
            ai_generated: false,
            generated_by: None,
            created_at: now,
        };
        posts::insert_post_with_quota(&db, &post, 10, now).await.unwrap();
        (db, owner.id, intruder.id, brand.id)
    }

    #[tokio::test]
    async fn owner_resolves_both_entities() {
        let (db, owner, _intruder, brand_id) = setup().await;
        assert_eq!(resolve_owned_brand(&db, &owner, &brand_id).await.unwrap().name, "Acme");
        assert_eq!(resolve_owned_post(&db, &owner, "po1").await.unwrap().content, "hello");
    }

    #[tokio::test]
    async fn missing_id_is_not_found() {
        let (db, owner, _intruder, _brand_id) = setup().await;
        let err = resolve_owned_brand(&db, &owner, "ghost").await.unwrap_err();
        assert!(matches!(err, PostloomError::NotFound { entity: "brand", .. }), "got {err}");
    }

    #[tokio::test]
    async fn foreign_owner_is_forbidden_not_not_found() {
        let (db, _owner, intruder, brand_id) = setup().await;
        let err = resolve_owned_brand(&db, &intruder, &brand_id).await.unwrap_err();
        assert!(matches!(err, PostloomError::Forbidden { entity: "brand", .. }), "got {err}");

        let err = resolve_owned_post(&db, &intruder, "po1").await.unwrap_err();
        assert!(matches!(err, PostloomError::Forbidden { entity: "post", .. }), "got {err}");
    }
}
