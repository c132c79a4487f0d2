// SPDX-FileCopyrightText: 2026 Postloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post row operations.
//!
//! Post creation is the quota-critical path: the owner's monthly counter is
//! read, checked, and incremented in the same transaction that inserts the
//! row. On the single writer thread that makes the sequence atomic with
//! respect to every other create.

use chrono::{DateTime, Utc};
use postloom_core::types::{Post, ResourceKind};
use postloom_core::PostloomError;
use rusqlite::params;

use crate::database::{map_call_err, Database, QueryError};
use crate::models;
use crate::queries::users::{user_from_row, USER_COLUMNS};

const POST_COLUMNS: &str = "id, user_id, brand_id, content, platform, status, scheduled_for, \
     published_at, image_url, audio_url, ai_generated, generated_by, created_at";

fn post_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Post> {
    let status = models::decode_enum(5, row.get(5)?)?;
    let scheduled_for = models::decode_opt_ts(6, row.get(6)?)?;
    let published_at = models::decode_opt_ts(7, row.get(7)?)?;
    Ok(Post {
        id: row.get(0)?,
        user_id: row.get(1)?,
        brand_id: row.get(2)?,
        content: row.get(3)?,
        platform: models::decode_enum(4, row.get(4)?)?,
        state: models::decode_state(5, status, scheduled_for, published_at)?,
        image_url: row.get(8)?,
        audio_url: row.get(9)?,
        ai_generated: row.get(10)?,
        generated_by: row.get(11)?,
        created_at: models::decode_ts(12, row.get(12)?)?,
    })
}

fn insert_post_row(tx: &rusqlite::Transaction<'_>, post: &Post) -> rusqlite::Result<()> {
    tx.execute(
        "INSERT INTO posts (id, user_id, brand_id, content, platform, status, scheduled_for, \
         published_at, image_url, audio_url, ai_generated, generated_by, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            post.id,
            post.user_id,
            post.brand_id,
            post.content,
            post.platform.to_string(),
            post.state.status().to_string(),
            post.state.scheduled_for().map(models::encode_ts),
            post.state.published_at().map(models::encode_ts),
            post.image_url,
            post.audio_url,
            post.ai_generated,
            post.generated_by,
            models::encode_ts(post.created_at),
        ],
    )?;
    Ok(())
}

/// Insert a post and consume one unit of the owner's monthly post quota, all
/// in one transaction.
///
/// The user row is re-read inside the transaction, the month rollover is
/// applied against `now`, and the counter is compared to `max_posts` before
/// the insert. With N slots of headroom and more than N concurrent creates,
/// exactly N commit and the rest see `QuotaExceeded`.
pub async fn insert_post_with_quota(
    db: &Database,
    post: &Post,
    max_posts: u32,
    now: DateTime<Utc>,
) -> Result<(), PostloomError> {
    let post = post.clone();
    db.connection()
        .call(move |conn| -> Result<(), QueryError> {
            let tx = conn.transaction()?;
            let user = {
                let mut stmt = tx.prepare(&format!(
                    "SELECT {USER_COLUMNS} FROM users WHERE id = ?1"
                ))?;
                match stmt.query_row(params![post.user_id], user_from_row) {
                    Ok(user) => user,
                    Err(rusqlite::Error::QueryReturnedNoRows) => {
                        return Err(PostloomError::NotFound {
                            entity: "user",
                            id: post.user_id.clone(),
                        }
                        .into());
                    }
                    Err(e) => return Err(e.into()),
                }
            };

            let rolled = user.usage_period_elapsed(now);
            let current = if rolled { 0 } else { user.posts_this_month };
            if current >= max_posts {
                return Err(PostloomError::QuotaExceeded {
                    resource: ResourceKind::Posts,
                    limit: max_posts,
                }
                .into());
            }

            insert_post_row(&tx, &post)?;
            if rolled {
                tx.execute(
                    "UPDATE users SET posts_this_month = 1, images_this_month = 0, \
                     voiceovers_this_month = 0, usage_reset_at = ?1 WHERE id = ?2",
                    params![models::encode_ts(now), user.id],
                )?;
            } else {
                tx.execute(
                    "UPDATE users SET posts_this_month = posts_this_month + 1 WHERE id = ?1",
                    params![user.id],
                )?;
            }
            tx.commit()?;
            Ok(())
        })
        .await
        .map_err(map_call_err)
}

/// Get a post by id.
pub async fn get_post(db: &Database, id: &str) -> Result<Option<Post>, PostloomError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<Post>, QueryError> {
            let mut stmt =
                conn.prepare(&format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?1"))?;
            match stmt.query_row(params![id], post_from_row) {
                Ok(post) => Ok(Some(post)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_call_err)
}

/// List a user's posts, newest first, optionally restricted to one brand.
pub async fn list_posts(
    db: &Database,
    user_id: &str,
    brand_id: Option<&str>,
) -> Result<Vec<Post>, PostloomError> {
    let user_id = user_id.to_string();
    let brand_id = brand_id.map(str::to_string);
    db.connection()
        .call(move |conn| -> Result<Vec<Post>, QueryError> {
            let mut posts = Vec::new();
            match brand_id {
                Some(brand_id) => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {POST_COLUMNS} FROM posts \
                         WHERE user_id = ?1 AND brand_id = ?2 ORDER BY created_at DESC"
                    ))?;
                    let rows = stmt.query_map(params![user_id, brand_id], post_from_row)?;
                    for row in rows {
                        posts.push(row?);
                    }
                }
                None => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {POST_COLUMNS} FROM posts \
                         WHERE user_id = ?1 ORDER BY created_at DESC"
                    ))?;
                    let rows = stmt.query_map(params![user_id], post_from_row)?;
                    for row in rows {
                        posts.push(row?);
                    }
                }
            }
            Ok(posts)
        })
        .await
        .map_err(map_call_err)
}

/// Overwrite a post's mutable columns from an already-patched domain value.
///
/// Lifecycle legality is decided by the caller; this writes the state
/// columns as given. The schema CHECKs still reject internally inconsistent
/// rows.
pub async fn update_post(db: &Database, post: &Post) -> Result<(), PostloomError> {
    let post = post.clone();
    db.connection()
        .call(move |conn| -> Result<(), QueryError> {
            let changed = conn.execute(
                "UPDATE posts SET content = ?1, platform = ?2, status = ?3, scheduled_for = ?4, \
                 published_at = ?5, image_url = ?6, audio_url = ?7 WHERE id = ?8",
                params![
                    post.content,
                    post.platform.to_string(),
                    post.state.status().to_string(),
                    post.state.scheduled_for().map(models::encode_ts),
                    post.state.published_at().map(models::encode_ts),
                    post.image_url,
                    post.audio_url,
                    post.id,
                ],
            )?;
            if changed == 0 {
                return Err(PostloomError::NotFound {
                    entity: "post",
                    id: post.id,
                }
                .into());
            }
            Ok(())
        })
        .await
        .map_err(map_call_err)
}

/// Delete a post. Deletion does not refund the monthly counter.
pub async fn delete_post(db: &Database, id: &str) -> Result<(), PostloomError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| -> Result<(), QueryError> {
            let changed = conn.execute("DELETE FROM posts WHERE id = ?1", params![id])?;
            if changed == 0 {
                return Err(PostloomError::NotFound { entity: "post", id }.into());
            }
            Ok(())
        })
        .await
        .map_err(map_call_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use crate::queries::{brands, users};
    use chrono::TimeZone;
    use postloom_core::types::{Brand, Platform, PostState, User};

    fn jan15() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
    }

    async fn setup() -> (Database, User, Brand) {
        let db = Database::open_in_memory().await.unwrap();
        let user = users::ensure_user(&db, "p1", "p@example.com", jan15()).await.unwrap();
        let brand = Brand {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user.id.clone(),
            name: "Acme".to_string(),
            description: None,
            color: "indigo".to_string(),
            initials: "A".to_string(),
            voice: "professional".to_string(),
            topics: Vec::new(),
            voice_profile: None,
            created_at: jan15(),
        };
        brands::insert_brand_with_quota(&db, &brand, 5).await.unwrap();
        (db, user, brand)
    }

    fn make_post(user: &User, brand: &Brand, content: &str) -> Post {
        Post {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user.id.clone(),
            brand_id: brand.id.clone(),
            content: content.to_string(),
            platform: Platform::Instagram,
            state: PostState::Draft,
            image_url: None,
            audio_url: None,
            ai_generated: false,
            generated_by: None,
            created_at: jan15(),
        }
    }

    #[tokio::test]
    async fn insert_round_trips_and_counts_usage() {
        let (db, user, brand) = setup().await;
        let post = make_post(&user, &brand, "Hello from Acme");
        insert_post_with_quota(&db, &post, 10, jan15()).await.unwrap();

        let loaded = get_post(&db, &post.id).await.unwrap().unwrap();
        assert_eq!(loaded, post);

        let owner = users::get_user(&db, &user.id).await.unwrap().unwrap();
        assert_eq!(owner.posts_this_month, 1);
    }

    #[tokio::test]
    async fn quota_blocks_insert_at_limit() {
        let (db, user, brand) = setup().await;
        insert_post_with_quota(&db, &make_post(&user, &brand, "one"), 2, jan15())
            .await
            .unwrap();
        insert_post_with_quota(&db, &make_post(&user, &brand, "two"), 2, jan15())
            .await
            .unwrap();

        let err = insert_post_with_quota(&db, &make_post(&user, &brand, "three"), 2, jan15())
            .await
            .unwrap_err();
        assert!(
            matches!(
                err,
                PostloomError::QuotaExceeded {
                    resource: ResourceKind::Posts,
                    limit: 2
                }
            ),
            "got {err}"
        );
        // The failed create left no row behind.
        assert_eq!(list_posts(&db, &user.id, None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn month_rollover_reopens_quota() {
        let (db, user, brand) = setup().await;
        insert_post_with_quota(&db, &make_post(&user, &brand, "jan"), 1, jan15())
            .await
            .unwrap();
        assert!(
            insert_post_with_quota(&db, &make_post(&user, &brand, "still jan"), 1, jan15())
                .await
                .is_err()
        );

        let feb = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
        insert_post_with_quota(&db, &make_post(&user, &brand, "feb"), 1, feb)
            .await
            .unwrap();
        let owner = users::get_user(&db, &user.id).await.unwrap().unwrap();
        assert_eq!(owner.posts_this_month, 1);
        assert_eq!(owner.usage_reset_at, feb);
    }

    #[tokio::test]
    async fn concurrent_creates_admit_exactly_the_headroom() {
        let (db, user, brand) = setup().await;
        let max = 3u32;
        let mut handles = Vec::new();
        for i in 0..5 {
            let db = db.clone();
            let post = make_post(&user, &brand, &format!("candidate {i}"));
            handles.push(tokio::spawn(async move {
                insert_post_with_quota(&db, &post, max, jan15()).await
            }));
        }
        let mut ok = 0;
        let mut exceeded = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(()) => ok += 1,
                Err(PostloomError::QuotaExceeded { .. }) => exceeded += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        assert_eq!(ok, 3);
        assert_eq!(exceeded, 2);
        assert_eq!(list_posts(&db, &user.id, None).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn update_state_columns_round_trip() {
        let (db, user, brand) = setup().await;
        let mut post = make_post(&user, &brand, "draft body");
        insert_post_with_quota(&db, &post, 10, jan15()).await.unwrap();

        let when = Utc.with_ymd_and_hms(2026, 1, 20, 9, 0, 0).unwrap();
        post.state = PostState::Scheduled { at: when };
        post.content = "edited body".to_string();
        update_post(&db, &post).await.unwrap();

        let loaded = get_post(&db, &post.id).await.unwrap().unwrap();
        assert_eq!(loaded.state, PostState::Scheduled { at: when });
        assert_eq!(loaded.content, "edited body");
        assert_eq!(loaded.state.published_at(), None);
    }

    #[tokio::test]
    async fn list_filters_by_brand() {
        let (db, user, brand) = setup().await;
        let other = Brand {
            id: uuid::Uuid::new_v4().to_string(),
            name: "Other".to_string(),
            ..brand.clone()
        };
        brands::insert_brand_with_quota(&db, &other, 5).await.unwrap();

        insert_post_with_quota(&db, &make_post(&user, &brand, "a"), 10, jan15())
            .await
            .unwrap();
        insert_post_with_quota(&db, &make_post(&user, &other, "b"), 10, jan15())
            .await
            .unwrap();

        assert_eq!(list_posts(&db, &user.id, None).await.unwrap().len(), 2);
        let filtered = list_posts(&db, &user.id, Some(&brand.id)).await.unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].content, "a");
    }

    #[tokio::test]
    async fn delete_does_not_refund_quota() {
        let (db, user, brand) = setup().await;
        let post = make_post(&user, &brand, "ephemeral");
        insert_post_with_quota(&db, &post, 10, jan15()).await.unwrap();
        delete_post(&db, &post.id).await.unwrap();

        let owner = users::get_user(&db, &user.id).await.unwrap().unwrap();
        assert_eq!(owner.posts_this_month, 1);
        assert!(get_post(&db, &post.id).await.unwrap().is_none());
    }
}
