// SPDX-FileCopyrightText: 2026 Postloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User row operations: lazy creation, plan changes, usage counter
//! maintenance.
//!
//! The usage counters on the user row are the quota ledger. Any operation
//! that both checks and changes a counter does so inside one transaction on
//! the single writer thread; callers never check first and write later.

use chrono::{DateTime, Utc};
use postloom_core::types::{PlanTier, ResourceKind, User};
use postloom_core::PostloomError;
use rusqlite::params;

use crate::database::{map_call_err, Database, QueryError};
use crate::models;

pub(crate) const USER_COLUMNS: &str =
    "id, principal_id, email, plan, posts_this_month, images_this_month, \
     voiceovers_this_month, usage_reset_at, billing_customer_id, created_at";

pub(crate) fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        principal_id: row.get(1)?,
        email: row.get(2)?,
        plan: models::decode_enum(3, row.get(3)?)?,
        posts_this_month: row.get(4)?,
        images_this_month: row.get(5)?,
        voiceovers_this_month: row.get(6)?,
        usage_reset_at: models::decode_ts(7, row.get(7)?)?,
        billing_customer_id: row.get(8)?,
        created_at: models::decode_ts(9, row.get(9)?)?,
    })
}

/// Fetch the user owning the given principal key, creating the record
/// lazily on first access.
///
/// Lookup and insert happen in one transaction so two concurrent first
/// requests from the same principal cannot create two rows.
pub async fn ensure_user(
    db: &Database,
    principal_id: &str,
    email: &str,
    now: DateTime<Utc>,
) -> Result<User, PostloomError> {
    let principal_id = principal_id.to_string();
    let email = email.to_string();
    db.connection()
        .call(move |conn| -> Result<User, QueryError> {
            let tx = conn.transaction()?;
            let existing = {
                let mut stmt = tx.prepare(&format!(
                    "SELECT {USER_COLUMNS} FROM users WHERE principal_id = ?1"
                ))?;
                match stmt.query_row(params![principal_id], user_from_row) {
                    Ok(user) => Some(user),
                    Err(rusqlite::Error::QueryReturnedNoRows) => None,
                    Err(e) => return Err(e.into()),
                }
            };

            let user = match existing {
                Some(user) => user,
                None => {
                    let user = User {
                        id: uuid::Uuid::new_v4().to_string(),
                        principal_id: principal_id.clone(),
                        email: email.clone(),
                        plan: PlanTier::default(),
                        posts_this_month: 0,
                        images_this_month: 0,
                        voiceovers_this_month: 0,
                        usage_reset_at: now,
                        billing_customer_id: None,
                        created_at: now,
                    };
                    tx.execute(
                        "INSERT INTO users (id, principal_id, email, plan, posts_this_month, \
                         images_this_month, voiceovers_this_month, usage_reset_at, \
                         billing_customer_id, created_at) \
                         VALUES (?1, ?2, ?3, ?4, 0, 0, 0, ?5, NULL, ?6)",
                        params![
                            user.id,
                            user.principal_id,
                            user.email,
                            user.plan.to_string(),
                            models::encode_ts(user.usage_reset_at),
                            models::encode_ts(user.created_at),
                        ],
                    )?;
                    user
                }
            };
            tx.commit()?;
            Ok(user)
        })
        .await
        .map_err(map_call_err)
}

/// Get a user by application id.
pub async fn get_user(db: &Database, id: &str) -> Result<Option<User>, PostloomError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<User>, QueryError> {
            let mut stmt =
                conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"))?;
            match stmt.query_row(params![id], user_from_row) {
                Ok(user) => Ok(Some(user)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_call_err)
}

/// Set the user's plan tier, reflecting the billing collaborator's
/// authoritative update.
pub async fn set_plan(db: &Database, id: &str, plan: PlanTier) -> Result<(), PostloomError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| -> Result<(), QueryError> {
            let changed = conn.execute(
                "UPDATE users SET plan = ?1 WHERE id = ?2",
                params![plan.to_string(), id],
            )?;
            if changed == 0 {
                return Err(PostloomError::NotFound {
                    entity: "user",
                    id,
                }
                .into());
            }
            Ok(())
        })
        .await
        .map_err(map_call_err)
}

/// Record the billing-provider customer reference for a user.
pub async fn set_billing_customer(
    db: &Database,
    id: &str,
    customer_id: &str,
) -> Result<(), PostloomError> {
    let id = id.to_string();
    let customer_id = customer_id.to_string();
    db.connection()
        .call(move |conn| -> Result<(), QueryError> {
            conn.execute(
                "UPDATE users SET billing_customer_id = ?1 WHERE id = ?2",
                params![customer_id, id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_call_err)
}

/// List all user ids, for the periodic usage-reset sweep.
pub async fn list_user_ids(db: &Database) -> Result<Vec<String>, PostloomError> {
    db.connection()
        .call(|conn| -> Result<Vec<String>, QueryError> {
            let mut stmt = conn.prepare("SELECT id FROM users ORDER BY created_at ASC")?;
            let rows = stmt.query_map([], |row| row.get(0))?;
            let mut ids = Vec::new();
            for row in rows {
                ids.push(row?);
            }
            Ok(ids)
        })
        .await
        .map_err(map_call_err)
}

/// Zero the monthly counters and advance the period anchor iff the calendar
/// month of `now` differs from the stored anchor. Idempotent.
///
/// Returns `true` when a reset happened.
pub async fn reset_usage_if_elapsed(
    db: &Database,
    id: &str,
    now: DateTime<Utc>,
) -> Result<bool, PostloomError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| -> Result<bool, QueryError> {
            let tx = conn.transaction()?;
            let user = {
                let mut stmt = tx.prepare(&format!(
                    "SELECT {USER_COLUMNS} FROM users WHERE id = ?1"
                ))?;
                match stmt.query_row(params![id], user_from_row) {
                    Ok(user) => user,
                    Err(rusqlite::Error::QueryReturnedNoRows) => {
                        return Err(PostloomError::NotFound { entity: "user", id }.into());
                    }
                    Err(e) => return Err(e.into()),
                }
            };

            let elapsed = user.usage_period_elapsed(now);
            if elapsed {
                tx.execute(
                    "UPDATE users SET posts_this_month = 0, images_this_month = 0, \
                     voiceovers_this_month = 0, usage_reset_at = ?1 WHERE id = ?2",
                    params![models::encode_ts(now), user.id],
                )?;
            }
            tx.commit()?;
            Ok(elapsed)
        })
        .await
        .map_err(map_call_err)
}

/// Check-and-increment a media usage counter in one transaction.
///
/// Applies the month rollover, compares the live counter against `limit`,
/// and increments only when headroom exists. Called once per successful
/// synthesis, after the asset URL is returned.
pub async fn increment_media_usage(
    db: &Database,
    id: &str,
    resource: ResourceKind,
    limit: u32,
    now: DateTime<Utc>,
) -> Result<(), PostloomError> {
    let column = match resource {
        ResourceKind::Images => "images_this_month",
        ResourceKind::Voiceovers => "voiceovers_this_month",
        other => {
            return Err(PostloomError::Internal(format!(
                "increment_media_usage called for non-media resource {other}"
            )));
        }
    };
    let id = id.to_string();
    db.connection()
        .call(move |conn| -> Result<(), QueryError> {
            let tx = conn.transaction()?;
            let user = {
                let mut stmt = tx.prepare(&format!(
                    "SELECT {USER_COLUMNS} FROM users WHERE id = ?1"
                ))?;
                match stmt.query_row(params![id], user_from_row) {
                    Ok(user) => user,
                    Err(rusqlite::Error::QueryReturnedNoRows) => {
                        return Err(PostloomError::NotFound { entity: "user", id }.into());
                    }
                    Err(e) => return Err(e.into()),
                }
            };

            let rolled = user.usage_period_elapsed(now);
            let current = if rolled {
                0
            } else {
                match resource {
                    ResourceKind::Images => user.images_this_month,
                    _ => user.voiceovers_this_month,
                }
            };
            if current >= limit {
                return Err(PostloomError::QuotaExceeded { resource, limit }.into());
            }

            if rolled {
                tx.execute(
                    &format!(
                        "UPDATE users SET posts_this_month = 0, images_this_month = 0, \
                         voiceovers_this_month = 0, {column} = 1, usage_reset_at = ?1 \
                         WHERE id = ?2"
                    ),
                    params![models::encode_ts(now), user.id],
                )?;
            } else {
                tx.execute(
                    &format!("UPDATE users SET {column} = {column} + 1 WHERE id = ?1"),
                    params![user.id],
                )?;
            }
            tx.commit()?;
            Ok(())
        })
        .await
        .map_err(map_call_err)
}
