// SPDX-FileCopyrightText: 2026 Postloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Brand service: creation with defaults, patching, cascade delete.

use chrono::{DateTime, Utc};
use postloom_core::types::{Brand, User};
use postloom_core::PostloomError;
use postloom_quota::limits;
use postloom_storage::queries::brands;
use postloom_storage::Database;
use rand::seq::SliceRandom;
use tracing::info;

use crate::resolver::resolve_owned_brand;
use crate::types::{BrandPatch, NewBrand};

const DEFAULT_VOICE: &str = "professional";

const COLOR_PALETTE: &[&str] = &[
    "indigo", "emerald", "amber", "rose", "sky", "violet", "teal", "orange",
];

/// Derive brand initials from the name: first letter of each whitespace
/// token, uppercased, at most two.
pub fn derive_initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|token| token.chars().next())
        .take(2)
        .flat_map(char::to_uppercase)
        .collect()
}

/// Brand CRUD over the storage handle.
#[derive(Clone)]
pub struct BrandService {
    db: Database,
}

impl BrandService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Create a brand, consuming one slot of the owner's brand quota.
    ///
    /// Missing presentation fields are defaulted: initials from the name,
    /// a color from the palette, the house default voice, empty topics.
    pub async fn create_brand(
        &self,
        user: &User,
        new: NewBrand,
        now: DateTime<Utc>,
    ) -> Result<Brand, PostloomError> {
        let name = new.name.trim().to_string();
        if name.is_empty() {
            return Err(PostloomError::Validation(
                "brand name must not be empty".to_string(),
            ));
        }

        let initials = match new.initials {
            Some(explicit) if !explicit.trim().is_empty() => explicit.trim().to_string(),
            _ => derive_initials(&name),
        };
        let color = new.color.unwrap_or_else(|| {
            COLOR_PALETTE
                .choose(&mut rand::thread_rng())
                .copied()
                .unwrap_or("indigo")
                .to_string()
        });

        let brand = Brand {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user.id.clone(),
            name,
            description: new.description,
            color,
            initials,
            voice: new.voice.unwrap_or_else(|| DEFAULT_VOICE.to_string()),
            topics: new.topics.unwrap_or_default(),
            voice_profile: new.voice_profile,
            created_at: now,
        };

        let max_brands = limits(user.plan).max_brands;
        brands::insert_brand_with_quota(&self.db, &brand, max_brands).await?;
        info!(brand_id = %brand.id, user_id = %user.id, "brand created");
        Ok(brand)
    }

    /// Fetch one owned brand.
    pub async fn get_brand(&self, user: &User, brand_id: &str) -> Result<Brand, PostloomError> {
        resolve_owned_brand(&self.db, &user.id, brand_id).await
    }

    /// List the user's brands, oldest first.
    pub async fn list_brands(&self, user: &User) -> Result<Vec<Brand>, PostloomError> {
        brands::list_brands(&self.db, &user.id).await
    }

    /// Apply a partial update to an owned brand.
    ///
    /// Patching the name re-derives the initials unless the patch sets them
    /// explicitly.
    pub async fn update_brand(
        &self,
        user: &User,
        brand_id: &str,
        patch: BrandPatch,
    ) -> Result<Brand, PostloomError> {
        let mut brand = resolve_owned_brand(&self.db, &user.id, brand_id).await?;

        if let Some(name) = patch.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(PostloomError::Validation(
                    "brand name must not be empty".to_string(),
                ));
            }
            if patch.initials.is_none() {
                brand.initials = derive_initials(&name);
            }
            brand.name = name;
        }
        if let Some(description) = patch.description {
            brand.description = Some(description);
        }
        if let Some(color) = patch.color {
            brand.color = color;
        }
        if let Some(initials) = patch.initials {
            brand.initials = initials;
        }
        if let Some(voice) = patch.voice {
            brand.voice = voice;
        }
        if let Some(topics) = patch.topics {
            brand.topics = topics;
        }
        if let Some(voice_profile) = patch.voice_profile {
            brand.voice_profile = Some(voice_profile);
        }

        brands::update_brand(&self.db, &brand).await?;
        Ok(brand)
    }

    /// Delete an owned brand and every post under it, atomically.
    pub async fn delete_brand(&self, user: &User, brand_id: &str) -> Result<(), PostloomError> {
        resolve_owned_brand(&self.db, &user.id, brand_id).await?;
        brands::delete_brand_cascade(&self.db, brand_id).await?;
        info!(brand_id, user_id = %user.id, "brand deleted with its posts");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use postloom_core::types::{PlanTier, Platform, Post, PostState};
    use postloom_storage::queries::{posts, users};

    fn jan15() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
    }

    async fn setup() -> (Database, BrandService, User) {
        let db = Database::open_in_memory().await.unwrap();
        let user = users::ensure_user(&db, "p1", "p@example.com", jan15()).await.unwrap();
        (db.clone(), BrandService::new(db), user)
    }

    #[test]
    fn initials_take_first_letters_of_two_tokens() {
        assert_eq!(derive_initials("Acme Coffee"), "AC");
        assert_eq!(derive_initials("acme"), "A");
        assert_eq!(derive_initials("three word name"), "TW");
        assert_eq!(derive_initials("  spaced   out  "), "SO");
        assert_eq!(derive_initials(""), "");
    }

    #[tokio::test]
    async fn create_applies_defaults() {
        let (_db, service, user) = setup().await;
        let brand = service
            .create_brand(
                &user,
                NewBrand {
                    name: "Acme Coffee".to_string(),
                    ..NewBrand::default()
                },
                jan15(),
            )
            .await
            .unwrap();
        assert_eq!(brand.initials, "AC");
        assert_eq!(brand.voice, DEFAULT_VOICE);
        assert!(COLOR_PALETTE.contains(&brand.color.as_str()));
        assert!(brand.topics.is_empty());
    }

    #[tokio::test]
    async fn blank_name_is_validation() {
        let (_db, service, user) = setup().await;
        let err = service
            .create_brand(
                &user,
                NewBrand {
                    name: "   ".to_string(),
                    ..NewBrand::default()
                },
                jan15(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, PostloomError::Validation(_)), "got {err}");
    }

    #[tokio::test]
    async fn free_plan_caps_at_two_brands_until_delete() {
        let (_db, service, user) = setup().await;
        assert_eq!(user.plan, PlanTier::Free);
        let first = service
            .create_brand(&user, NewBrand { name: "One".into(), ..Default::default() }, jan15())
            .await
            .unwrap();
        service
            .create_brand(&user, NewBrand { name: "Two".into(), ..Default::default() }, jan15())
            .await
            .unwrap();

        let err = service
            .create_brand(&user, NewBrand { name: "Three".into(), ..Default::default() }, jan15())
            .await
            .unwrap_err();
        assert!(matches!(err, PostloomError::QuotaExceeded { limit: 2, .. }), "got {err}");

        service.delete_brand(&user, &first.id).await.unwrap();
        service
            .create_brand(&user, NewBrand { name: "Three".into(), ..Default::default() }, jan15())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn patching_name_rederives_initials() {
        let (_db, service, user) = setup().await;
        let brand = service
            .create_brand(&user, NewBrand { name: "Acme".into(), ..Default::default() }, jan15())
            .await
            .unwrap();
        assert_eq!(brand.initials, "A");

        let patched = service
            .update_brand(
                &user,
                &brand.id,
                BrandPatch {
                    name: Some("North Star".to_string()),
                    ..BrandPatch::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(patched.name, "North Star");
        assert_eq!(patched.initials, "NS");

        // Explicit initials win over derivation.
        let patched = service
            .update_brand(
                &user,
                &brand.id,
                BrandPatch {
                    name: Some("Polaris".to_string()),
                    initials: Some("PX".to_string()),
                    ..BrandPatch::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(patched.initials, "PX");
    }

    #[tokio::test]
    async fn delete_cascades_to_posts() {
        let (db, service, user) = setup().await;
        let brand = service
            .create_brand(&user, NewBrand { name: "Acme".into(), ..Default::default() }, jan15())
            .await
            .unwrap();
        let post = Post {
            id: "po1".to_string(),
            user_id: user.id.clone(),
            brand_id: brand.id.clone(),
            content: "hello".to_string(),
            platform: Platform::Instagram,
            state: PostState::Draft,
            image_url: None,
            audio_url: None,
            ai_generated: false,
            generated_by: None,
            created_at: jan15(),
        };
        posts::insert_post_with_quota(&db, &post, 10, jan15()).await.unwrap();

        service.delete_brand(&user, &brand.id).await.unwrap();
        assert!(posts::get_post(&db, "po1").await.unwrap().is_none());
        assert!(posts::list_posts(&db, &user.id, Some(&brand.id)).await.unwrap().is_empty());
    }
}
