// SPDX-FileCopyrightText: 2026 Postloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common domain types used across adapter traits and the Postloom crates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Subscription plan tier. Closed set; unknown tiers are not representable.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    #[default]
    Free,
    Pro,
    Business,
}

/// Target social platform for a post. Closed set.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Instagram,
    Twitter,
    LinkedIn,
    TikTok,
    Facebook,
}

/// Quota-accounted resource kinds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Posts,
    Images,
    Voiceovers,
    Brands,
}

/// Storage/wire label for a post's lifecycle status.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Scheduled,
    Published,
}

/// Lifecycle state of a post.
///
/// The schedule timestamp only exists in `Scheduled` and the publish timestamp
/// only in `Published`, so `status = scheduled` without a schedule time cannot
/// be represented. `Published` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PostState {
    Draft,
    Scheduled {
        #[serde(rename = "scheduled_for")]
        at: DateTime<Utc>,
    },
    Published {
        #[serde(rename = "published_at")]
        at: DateTime<Utc>,
    },
}

impl PostState {
    /// The flat status label, as stored in the `status` column.
    pub fn status(&self) -> PostStatus {
        match self {
            Self::Draft => PostStatus::Draft,
            Self::Scheduled { .. } => PostStatus::Scheduled,
            Self::Published { .. } => PostStatus::Published,
        }
    }

    /// Schedule time, if this post is scheduled.
    pub fn scheduled_for(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Scheduled { at } => Some(*at),
            _ => None,
        }
    }

    /// Publish time, if this post has been published.
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Published { at } => Some(*at),
            _ => None,
        }
    }

    /// Reassemble a state from its three stored columns.
    ///
    /// Returns `None` when the columns violate the lifecycle invariant
    /// (a scheduled row without a schedule time, a published row without a
    /// publish time). Callers at the storage boundary map `None` to a
    /// storage error rather than guessing.
    pub fn from_parts(
        status: PostStatus,
        scheduled_for: Option<DateTime<Utc>>,
        published_at: Option<DateTime<Utc>>,
    ) -> Option<Self> {
        match status {
            PostStatus::Draft => Some(Self::Draft),
            PostStatus::Scheduled => scheduled_for.map(|at| Self::Scheduled { at }),
            PostStatus::Published => published_at.map(|at| Self::Published { at }),
        }
    }
}

/// A caller identity resolved by the identity adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Stable identity key from the identity collaborator.
    pub id: String,
    pub email: String,
}

/// One application user. Created lazily on first authenticated access.
///
/// Monthly counters are unsigned and therefore structurally non-negative.
/// They are reset when the UTC month/year of "now" differs from
/// `usage_reset_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    /// Identity key linking back to the external principal.
    pub principal_id: String,
    pub email: String,
    pub plan: PlanTier,
    pub posts_this_month: u32,
    pub images_this_month: u32,
    pub voiceovers_this_month: u32,
    /// Period anchor for month-rollover detection.
    pub usage_reset_at: DateTime<Utc>,
    /// Billing-provider customer reference, once known.
    pub billing_customer_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// True when `now` falls in a different UTC calendar month (or year)
    /// than the usage period anchor, meaning the monthly counters are stale.
    ///
    /// A user inactive for several months still answers `true` exactly once;
    /// resetting against `now` re-anchors the period without replaying the
    /// intermediate months.
    pub fn usage_period_elapsed(&self, now: DateTime<Utc>) -> bool {
        use chrono::Datelike;
        now.year() != self.usage_reset_at.year() || now.month() != self.usage_reset_at.month()
    }
}

/// A user-owned content identity. The organizing unit posts belong to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brand {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    /// UI color token, e.g. "indigo".
    pub color: String,
    /// 1-2 character initials, derived from the name when not supplied.
    pub initials: String,
    /// Voice preset used when generating content for this brand.
    pub voice: String,
    pub topics: Vec<String>,
    /// Derived voice-profile analysis of sample posts, when computed.
    pub voice_profile: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A durable post, owned by one user and associated with one brand of the
/// same user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub user_id: String,
    pub brand_id: String,
    pub content: String,
    pub platform: Platform,
    #[serde(flatten)]
    pub state: PostState,
    pub image_url: Option<String>,
    pub audio_url: Option<String>,
    pub ai_generated: bool,
    /// Identifier of the generating model, when AI-generated.
    pub generated_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Batch sizes accepted by the repurposing generator. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum BatchSize {
    Five,
    Ten,
    Fifteen,
}

impl BatchSize {
    pub fn count(&self) -> usize {
        match self {
            Self::Five => 5,
            Self::Ten => 10,
            Self::Fifteen => 15,
        }
    }
}

impl TryFrom<u32> for BatchSize {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            5 => Ok(Self::Five),
            10 => Ok(Self::Ten),
            15 => Ok(Self::Fifteen),
            other => Err(format!("batch size must be 5, 10, or 15, got {other}")),
        }
    }
}

impl From<BatchSize> for u32 {
    fn from(value: BatchSize) -> Self {
        value.count() as u32
    }
}

/// Parameters for a single content generation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub platform: Platform,
    /// Brand voice preset carried into the prompt.
    pub voice: String,
    /// Model override; the adapter default is used when `None`.
    pub model: Option<String>,
}

/// Parameters for a repurposing batch generation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRequest {
    pub transcript: String,
    pub platform: Platform,
    pub style: String,
    pub count: BatchSize,
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Degraded(String),
    Unhealthy(String),
}

/// Identifies the type of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Generation,
    Media,
    Billing,
    Identity,
    Storage,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn plan_tier_defaults_to_free() {
        assert_eq!(PlanTier::default(), PlanTier::Free);
    }

    #[test]
    fn platform_display_and_parse_round_trip() {
        for platform in Platform::iter() {
            let s = platform.to_string();
            assert_eq!(Platform::from_str(&s).unwrap(), platform);
        }
    }

    #[test]
    fn post_state_scheduled_requires_timestamp() {
        assert_eq!(
            PostState::from_parts(PostStatus::Scheduled, None, None),
            None
        );
        let at = Utc.with_ymd_and_hms(2026, 9, 1, 12, 0, 0).unwrap();
        assert_eq!(
            PostState::from_parts(PostStatus::Scheduled, Some(at), None),
            Some(PostState::Scheduled { at })
        );
    }

    #[test]
    fn post_state_published_requires_timestamp() {
        assert_eq!(
            PostState::from_parts(PostStatus::Published, None, None),
            None
        );
        let at = Utc.with_ymd_and_hms(2026, 8, 1, 8, 0, 0).unwrap();
        let state = PostState::from_parts(PostStatus::Published, None, Some(at)).unwrap();
        assert_eq!(state.published_at(), Some(at));
        assert_eq!(state.status(), PostStatus::Published);
    }

    #[test]
    fn post_state_serializes_with_tagged_status() {
        let at = Utc.with_ymd_and_hms(2026, 9, 1, 12, 0, 0).unwrap();
        let json = serde_json::to_value(PostState::Scheduled { at }).unwrap();
        assert_eq!(json["status"], "scheduled");
        assert!(json["scheduled_for"].is_string());

        let json = serde_json::to_value(PostState::Draft).unwrap();
        assert_eq!(json["status"], "draft");
    }

    #[test]
    fn batch_size_accepts_only_closed_set() {
        assert_eq!(BatchSize::try_from(5).unwrap().count(), 5);
        assert_eq!(BatchSize::try_from(10).unwrap().count(), 10);
        assert_eq!(BatchSize::try_from(15).unwrap().count(), 15);
        assert!(BatchSize::try_from(0).is_err());
        assert!(BatchSize::try_from(7).is_err());
        assert!(BatchSize::try_from(20).is_err());
    }

    #[test]
    fn batch_size_deserializes_from_number() {
        let size: BatchSize = serde_json::from_str("10").unwrap();
        assert_eq!(size, BatchSize::Ten);
        assert!(serde_json::from_str::<BatchSize>("11").is_err());
    }

    fn user_with_anchor(anchor: DateTime<Utc>) -> User {
        User {
            id: "u-1".into(),
            principal_id: "p-1".into(),
            email: "u@example.com".into(),
            plan: PlanTier::Free,
            posts_this_month: 5,
            images_this_month: 0,
            voiceovers_this_month: 0,
            usage_reset_at: anchor,
            billing_customer_id: None,
            created_at: anchor,
        }
    }

    #[test]
    fn usage_period_elapsed_on_month_change() {
        let anchor = Utc.with_ymd_and_hms(2026, 1, 15, 0, 0, 0).unwrap();
        let user = user_with_anchor(anchor);
        let same_month = Utc.with_ymd_and_hms(2026, 1, 31, 23, 59, 59).unwrap();
        let next_month = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
        assert!(!user.usage_period_elapsed(same_month));
        assert!(user.usage_period_elapsed(next_month));
    }

    #[test]
    fn usage_period_elapsed_on_year_change_same_month() {
        let anchor = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        let user = user_with_anchor(anchor);
        let next_year = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        assert!(user.usage_period_elapsed(next_year));
    }

    #[test]
    fn usage_period_elapsed_after_multi_month_gap() {
        // January anchor read in March: stale exactly once, no intermediate
        // replay is possible because the check is a plain comparison.
        let anchor = Utc.with_ymd_and_hms(2026, 1, 10, 0, 0, 0).unwrap();
        let user = user_with_anchor(anchor);
        let march = Utc.with_ymd_and_hms(2026, 3, 5, 0, 0, 0).unwrap();
        assert!(user.usage_period_elapsed(march));
    }

    #[test]
    fn resource_kind_lowercase_labels() {
        assert_eq!(ResourceKind::Voiceovers.to_string(), "voiceovers");
        assert_eq!(ResourceKind::from_str("posts").unwrap(), ResourceKind::Posts);
    }
}
