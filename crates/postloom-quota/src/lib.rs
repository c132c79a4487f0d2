// SPDX-FileCopyrightText: 2026 Postloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plan catalog and monthly usage ledger for the Postloom content service.
//!
//! This crate provides:
//! - **Plan catalog**: the per-tier limits and feature-flag table
//! - **Usage ledger**: rollover-adjusted usage snapshots, advisory quota
//!   pre-checks, and the periodic monthly reset sweep

pub mod ledger;
pub mod plan;

pub use ledger::{period_elapsed, UsageLedger, UsageSnapshot};
pub use plan::{limits, PlanLimits};
