// SPDX-FileCopyrightText: 2026 Postloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The plan catalog: per-tier limits and feature flags.
//!
//! The table is pure data. Quota enforcement happens where the counters
//! live (the storage transactions); feature gating happens in the service
//! layer against the flags here.

use postloom_core::types::{PlanTier, ResourceKind};
use serde::Serialize;

/// Limits and feature flags for one plan tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlanLimits {
    /// Live brand count ceiling (not monthly; frees up on delete).
    pub max_brands: u32,
    pub max_posts_per_month: u32,
    pub max_images_per_month: u32,
    pub max_voiceovers_per_month: u32,
    pub has_image_generation: bool,
    pub has_voiceover: bool,
    pub has_video_repurpose: bool,
}

impl PlanLimits {
    /// The ceiling for a resource kind under this plan.
    pub fn limit_for(&self, resource: ResourceKind) -> u32 {
        match resource {
            ResourceKind::Brands => self.max_brands,
            ResourceKind::Posts => self.max_posts_per_month,
            ResourceKind::Images => self.max_images_per_month,
            ResourceKind::Voiceovers => self.max_voiceovers_per_month,
        }
    }
}

/// Look up the limits for a plan tier. Total over the closed enum.
pub fn limits(plan: PlanTier) -> PlanLimits {
    match plan {
        PlanTier::Free => PlanLimits {
            max_brands: 2,
            max_posts_per_month: 10,
            max_images_per_month: 5,
            max_voiceovers_per_month: 3,
            has_image_generation: false,
            has_voiceover: false,
            has_video_repurpose: false,
        },
        PlanTier::Pro => PlanLimits {
            max_brands: 5,
            max_posts_per_month: 100,
            max_images_per_month: 50,
            max_voiceovers_per_month: 25,
            has_image_generation: true,
            has_voiceover: true,
            has_video_repurpose: true,
        },
        PlanTier::Business => PlanLimits {
            max_brands: 15,
            max_posts_per_month: 500,
            max_images_per_month: 250,
            max_voiceovers_per_month: 100,
            has_image_generation: true,
            has_voiceover: true,
            has_video_repurpose: true,
        },
    }
}
