// SPDX-FileCopyrightText: 2026 Postloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Brand row operations.
//!
//! Brand creation enforces the plan's brand-count limit inside the insert
//! transaction; deletion cascades over owned posts in the same transaction,
//! so a brand row can never outlive its posts in a dangling state.

use postloom_core::types::{Brand, ResourceKind};
use postloom_core::PostloomError;
use rusqlite::params;

use crate::database::{map_call_err, Database, QueryError};
use crate::models;

const BRAND_COLUMNS: &str =
    "id, user_id, name, description, color, initials, voice, topics, voice_profile, created_at";

fn brand_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Brand> {
    Ok(Brand {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        color: row.get(4)?,
        initials: row.get(5)?,
        voice: row.get(6)?,
        topics: models::decode_topics(7, row.get(7)?)?,
        voice_profile: row.get(8)?,
        created_at: models::decode_ts(9, row.get(9)?)?,
    })
}

/// Insert a brand, enforcing the owner's brand-count limit in the same
/// transaction as the insert.
///
/// The live count is read after taking the transaction, so two concurrent
/// creates with one slot of headroom serialize on the writer thread and
/// exactly one succeeds.
pub async fn insert_brand_with_quota(
    db: &Database,
    brand: &Brand,
    max_brands: u32,
) -> Result<(), PostloomError> {
    let brand = brand.clone();
    db.connection()
        .call(move |conn| -> Result<(), QueryError> {
            let tx = conn.transaction()?;
            let count: u32 = tx.query_row(
                "SELECT COUNT(*) FROM brands WHERE user_id = ?1",
                params![brand.user_id],
                |row| row.get(0),
            )?;
            if count >= max_brands {
                return Err(PostloomError::QuotaExceeded {
                    resource: ResourceKind::Brands,
                    limit: max_brands,
                }
                .into());
            }
            tx.execute(
                "INSERT INTO brands (id, user_id, name, description, color, initials, voice, \
                 topics, voice_profile, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    brand.id,
                    brand.user_id,
                    brand.name,
                    brand.description,
                    brand.color,
                    brand.initials,
                    brand.voice,
                    models::encode_topics(&brand.topics),
                    brand.voice_profile,
                    models::encode_ts(brand.created_at),
                ],
            )?;
            tx.commit()?;
            Ok(())
        })
        .await
        .map_err(map_call_err)
}

/// Get a brand by id.
pub async fn get_brand(db: &Database, id: &str) -> Result<Option<Brand>, PostloomError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<Brand>, QueryError> {
            let mut stmt =
                conn.prepare(&format!("SELECT {BRAND_COLUMNS} FROM brands WHERE id = ?1"))?;
            match stmt.query_row(params![id], brand_from_row) {
                Ok(brand) => Ok(Some(brand)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_call_err)
}

/// List all brands owned by a user, oldest first.
pub async fn list_brands(db: &Database, user_id: &str) -> Result<Vec<Brand>, PostloomError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| -> Result<Vec<Brand>, QueryError> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {BRAND_COLUMNS} FROM brands WHERE user_id = ?1 ORDER BY created_at ASC"
            ))?;
            let rows = stmt.query_map(params![user_id], brand_from_row)?;
            let mut brands = Vec::new();
            for row in rows {
                brands.push(row?);
            }
            Ok(brands)
        })
        .await
        .map_err(map_call_err)
}

/// Overwrite a brand's mutable columns from an already-patched domain value.
pub async fn update_brand(db: &Database, brand: &Brand) -> Result<(), PostloomError> {
    let brand = brand.clone();
    db.connection()
        .call(move |conn| -> Result<(), QueryError> {
            let changed = conn.execute(
                "UPDATE brands SET name = ?1, description = ?2, color = ?3, initials = ?4, \
                 voice = ?5, topics = ?6, voice_profile = ?7 WHERE id = ?8",
                params![
                    brand.name,
                    brand.description,
                    brand.color,
                    brand.initials,
                    brand.voice,
                    models::encode_topics(&brand.topics),
                    brand.voice_profile,
                    brand.id,
                ],
            )?;
            if changed == 0 {
                return Err(PostloomError::NotFound {
                    entity: "brand",
                    id: brand.id,
                }
                .into());
            }
            Ok(())
        })
        .await
        .map_err(map_call_err)
}

/// Delete a brand together with every post that belongs to it.
///
/// Posts are deleted first and the brand row last, inside one transaction;
/// a failure anywhere rolls the whole delete back, so no orphaned posts and
/// no half-deleted brand are ever visible.
pub async fn delete_brand_cascade(db: &Database, brand_id: &str) -> Result<(), PostloomError> {
    let brand_id = brand_id.to_string();
    db.connection()
        .call(move |conn| -> Result<(), QueryError> {
            let tx = conn.transaction()?;
            tx.execute("DELETE FROM posts WHERE brand_id = ?1", params![brand_id])?;
            let changed = tx.execute("DELETE FROM brands WHERE id = ?1", params![brand_id])?;
            if changed == 0 {
                return Err(PostloomError::NotFound {
                    entity: "brand",
                    id: brand_id,
                }
                .into());
            }
            tx.commit()?;
            Ok(())
        })
        .await
        .map_err(map_call_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use crate::queries::users;
    use chrono::{TimeZone, Utc};
    use postloom_core::types::User;

    async fn setup_with_user() -> (Database, User) {
        let db = Database::open_in_memory().await.unwrap();
        let now = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
        let user = users::ensure_user(&db, "p1", "p@example.com", now).await.unwrap();
        (db, user)
    }

    fn make_brand(user_id: &str, name: &str) -> Brand {
        Brand {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            name: name.to_string(),
            description: None,
            color: "indigo".to_string(),
            initials: "AC".to_string(),
            voice: "professional".to_string(),
            topics: vec!["launches".to_string()],
            voice_profile: None,
            created_at: Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn insert_and_get_round_trips() {
        let (db, user) = setup_with_user().await;
        let brand = make_brand(&user.id, "Acme Coffee");
        insert_brand_with_quota(&db, &brand, 2).await.unwrap();

        let loaded = get_brand(&db, &brand.id).await.unwrap().unwrap();
        assert_eq!(loaded, brand);
    }

    #[tokio::test]
    async fn quota_blocks_insert_at_limit() {
        let (db, user) = setup_with_user().await;
        insert_brand_with_quota(&db, &make_brand(&user.id, "One"), 2)
            .await
            .unwrap();
        insert_brand_with_quota(&db, &make_brand(&user.id, "Two"), 2)
            .await
            .unwrap();

        let err = insert_brand_with_quota(&db, &make_brand(&user.id, "Three"), 2)
            .await
            .unwrap_err();
        assert!(
            matches!(
                err,
                PostloomError::QuotaExceeded {
                    resource: ResourceKind::Brands,
                    limit: 2
                }
            ),
            "got {err}"
        );
        assert_eq!(list_brands(&db, &user.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn quota_frees_up_after_delete() {
        let (db, user) = setup_with_user().await;
        let first = make_brand(&user.id, "One");
        insert_brand_with_quota(&db, &first, 2).await.unwrap();
        insert_brand_with_quota(&db, &make_brand(&user.id, "Two"), 2)
            .await
            .unwrap();
        assert!(
            insert_brand_with_quota(&db, &make_brand(&user.id, "Three"), 2)
                .await
                .is_err()
        );

        delete_brand_cascade(&db, &first.id).await.unwrap();
        insert_brand_with_quota(&db, &make_brand(&user.id, "Three"), 2)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn update_brand_overwrites_mutable_fields() {
        let (db, user) = setup_with_user().await;
        let mut brand = make_brand(&user.id, "Acme");
        insert_brand_with_quota(&db, &brand, 5).await.unwrap();

        brand.name = "Acme Roasters".to_string();
        brand.topics = vec!["espresso".to_string(), "origin stories".to_string()];
        brand.voice_profile = Some("warm, first-person".to_string());
        update_brand(&db, &brand).await.unwrap();

        let loaded = get_brand(&db, &brand.id).await.unwrap().unwrap();
        assert_eq!(loaded.name, "Acme Roasters");
        assert_eq!(loaded.topics.len(), 2);
        assert_eq!(loaded.voice_profile.as_deref(), Some("warm, first-person"));
    }

    #[tokio::test]
    async fn delete_missing_brand_is_not_found() {
        let (db, _user) = setup_with_user().await;
        let err = delete_brand_cascade(&db, "missing").await.unwrap_err();
        assert!(matches!(err, PostloomError::NotFound { .. }), "got {err}");
    }

    #[tokio::test]
    async fn brand_counts_are_per_user() {
        let (db, user) = setup_with_user().await;
        let now = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
        let other = users::ensure_user(&db, "p2", "q@example.com", now).await.unwrap();

        insert_brand_with_quota(&db, &make_brand(&user.id, "Mine"), 1)
            .await
            .unwrap();
        // The other user's count starts at zero regardless of mine.
        insert_brand_with_quota(&db, &make_brand(&other.id, "Theirs"), 1)
            .await
            .unwrap();
    }
}
