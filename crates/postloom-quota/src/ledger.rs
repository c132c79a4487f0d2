// SPDX-FileCopyrightText: 2026 Postloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Monthly usage ledger over the user rows.
//!
//! The counters live on the user row and are mutated by the storage
//! transactions that consume quota. This ledger provides the read side
//! (rollover-adjusted snapshots, advisory pre-checks) and the periodic
//! reset sweep. Advisory means exactly that: passing `check` never
//! guarantees the later write succeeds, because the binding comparison
//! happens inside the write transaction.

use chrono::{DateTime, Datelike, Utc};
use postloom_core::types::{PlanTier, ResourceKind, User};
use postloom_core::PostloomError;
use postloom_storage::queries::users;
use postloom_storage::Database;
use serde::Serialize;
use tracing::{debug, warn};

use crate::plan::{limits, PlanLimits};

/// True when `now` falls in a different UTC calendar month than `anchor`.
///
/// A multi-month gap still elapses exactly once; the caller advances the
/// anchor to `now`, not month-by-month.
pub fn period_elapsed(anchor: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now.year() != anchor.year() || now.month() != anchor.month()
}

/// Point-in-time view of a user's quota position.
#[derive(Debug, Clone, Serialize)]
pub struct UsageSnapshot {
    pub plan: PlanTier,
    pub limits: PlanLimits,
    pub posts_this_month: u32,
    pub images_this_month: u32,
    pub voiceovers_this_month: u32,
    pub usage_reset_at: DateTime<Utc>,
}

impl UsageSnapshot {
    /// Remaining headroom for a monthly resource, saturating at zero.
    pub fn remaining(&self, resource: ResourceKind) -> u32 {
        let used = match resource {
            ResourceKind::Posts => self.posts_this_month,
            ResourceKind::Images => self.images_this_month,
            ResourceKind::Voiceovers => self.voiceovers_this_month,
            ResourceKind::Brands => return self.limits.max_brands,
        };
        self.limits.limit_for(resource).saturating_sub(used)
    }
}

/// Read side of the usage ledger plus the periodic reset sweep.
#[derive(Clone)]
pub struct UsageLedger {
    db: Database,
}

impl UsageLedger {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// The user's current quota position with the month rollover applied.
    ///
    /// Read-only: an elapsed period shows as zeroed counters here without
    /// touching the row. The stored anchor advances on the next write or
    /// sweep.
    pub async fn usage(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<UsageSnapshot, PostloomError> {
        let user = users::get_user(&self.db, user_id)
            .await?
            .ok_or_else(|| PostloomError::NotFound {
                entity: "user",
                id: user_id.to_string(),
            })?;

        let rolled = period_elapsed(user.usage_reset_at, now);
        Ok(UsageSnapshot {
            plan: user.plan,
            limits: limits(user.plan),
            posts_this_month: if rolled { 0 } else { user.posts_this_month },
            images_this_month: if rolled { 0 } else { user.images_this_month },
            voiceovers_this_month: if rolled { 0 } else { user.voiceovers_this_month },
            usage_reset_at: user.usage_reset_at,
        })
    }

    /// Advisory pre-check: would one more unit of `resource` fit right now?
    ///
    /// The binding check runs inside the storage transaction that consumes
    /// the unit; this exists for UI surfaces that want to disable a button
    /// before the request is made.
    pub async fn check(
        &self,
        user: &User,
        resource: ResourceKind,
        now: DateTime<Utc>,
    ) -> Result<bool, PostloomError> {
        let plan = limits(user.plan);
        let used = match resource {
            ResourceKind::Brands => {
                let brands = postloom_storage::queries::brands::list_brands(&self.db, &user.id)
                    .await?;
                brands.len() as u32
            }
            monthly => {
                if period_elapsed(user.usage_reset_at, now) {
                    0
                } else {
                    match monthly {
                        ResourceKind::Posts => user.posts_this_month,
                        ResourceKind::Images => user.images_this_month,
                        _ => user.voiceovers_this_month,
                    }
                }
            }
        };
        Ok(used < plan.limit_for(resource))
    }

    /// Zero the stored counters and advance the anchor iff the period
    /// elapsed. Returns `true` when a reset happened.
    pub async fn reset_if_elapsed(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, PostloomError> {
        users::reset_usage_if_elapsed(&self.db, user_id, now).await
    }

    /// Apply [`reset_if_elapsed`](Self::reset_if_elapsed) to every user.
    ///
    /// Driven by a periodic task in the binary. A failure on one user is
    /// logged and the sweep continues; the next sweep retries it.
    pub async fn sweep(&self, now: DateTime<Utc>) -> Result<usize, PostloomError> {
        let ids = users::list_user_ids(&self.db).await?;
        let mut reset = 0usize;
        for id in ids {
            match self.reset_if_elapsed(&id, now).await {
                Ok(true) => reset += 1,
                Ok(false) => {}
                Err(e) => warn!(user_id = %id, error = %e, "usage reset failed; will retry next sweep"),
            }
        }
        debug!(reset, "usage sweep complete");
        Ok(reset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn jan15() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
    }

    #[test]
    fn period_elapses_on_month_and_year_boundaries() {
        let anchor = jan15();
        assert!(!period_elapsed(anchor, Utc.with_ymd_and_hms(2026, 1, 31, 23, 59, 59).unwrap()));
        assert!(period_elapsed(anchor, Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap()));
        // Same month number, different year.
        assert!(period_elapsed(anchor, Utc.with_ymd_and_hms(2027, 1, 15, 10, 0, 0).unwrap()));
    }

    proptest! {
        #[test]
        fn period_elapsed_matches_calendar_compare(
            anchor_secs in 0i64..4_102_444_800, // 1970..2100
            now_secs in 0i64..4_102_444_800,
        ) {
            let anchor = Utc.timestamp_opt(anchor_secs, 0).unwrap();
            let now = Utc.timestamp_opt(now_secs, 0).unwrap();
            let expected = (anchor.year(), anchor.month()) != (now.year(), now.month());
            prop_assert_eq!(period_elapsed(anchor, now), expected);
            // Reflexive: a timestamp never elapses against itself.
            prop_assert!(!period_elapsed(now, now));
        }
    }

    #[tokio::test]
    async fn snapshot_applies_rollover_without_writing() {
        let db = Database::open_in_memory().await.unwrap();
        let user = users::ensure_user(&db, "p1", "p@example.com", jan15()).await.unwrap();
        users::increment_media_usage(&db, &user.id, ResourceKind::Images, 5, jan15())
            .await
            .unwrap();

        let ledger = UsageLedger::new(db.clone());
        let jan = ledger.usage(&user.id, jan15()).await.unwrap();
        assert_eq!(jan.images_this_month, 1);
        assert_eq!(jan.remaining(ResourceKind::Images), 4);

        let feb = Utc.with_ymd_and_hms(2026, 2, 3, 0, 0, 0).unwrap();
        let view = ledger.usage(&user.id, feb).await.unwrap();
        assert_eq!(view.images_this_month, 0);
        // The stored row is untouched by the read.
        let stored = users::get_user(&db, &user.id).await.unwrap().unwrap();
        assert_eq!(stored.images_this_month, 1);
    }

    #[tokio::test]
    async fn advisory_check_tracks_counters() {
        let db = Database::open_in_memory().await.unwrap();
        let user = users::ensure_user(&db, "p1", "p@example.com", jan15()).await.unwrap();
        let ledger = UsageLedger::new(db.clone());

        // Free plan: 3 voiceovers a month.
        for _ in 0..3 {
            users::increment_media_usage(&db, &user.id, ResourceKind::Voiceovers, 3, jan15())
                .await
                .unwrap();
        }
        let user = users::get_user(&db, &user.id).await.unwrap().unwrap();
        assert!(!ledger.check(&user, ResourceKind::Voiceovers, jan15()).await.unwrap());

        let feb = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
        assert!(ledger.check(&user, ResourceKind::Voiceovers, feb).await.unwrap());
    }

    #[tokio::test]
    async fn sweep_resets_only_elapsed_users() {
        let db = Database::open_in_memory().await.unwrap();
        let stale = users::ensure_user(&db, "p1", "a@example.com", jan15()).await.unwrap();
        let feb = Utc.with_ymd_and_hms(2026, 2, 10, 0, 0, 0).unwrap();
        let fresh = users::ensure_user(&db, "p2", "b@example.com", feb).await.unwrap();

        let ledger = UsageLedger::new(db.clone());
        assert_eq!(ledger.sweep(feb).await.unwrap(), 1);

        let stale = users::get_user(&db, &stale.id).await.unwrap().unwrap();
        assert_eq!(stale.usage_reset_at, feb);
        let fresh_row = users::get_user(&db, &fresh.id).await.unwrap().unwrap();
        assert_eq!(fresh_row.usage_reset_at, feb);
        // Second sweep at the same instant is a no-op.
        assert_eq!(ledger.sweep(feb).await.unwrap(), 0);
    }
}
