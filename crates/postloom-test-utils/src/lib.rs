// SPDX-FileCopyrightText: 2026 Postloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Postloom integration tests.
//!
//! Provides mock collaborator adapters and a test harness for fast,
//! deterministic, CI-runnable tests without external services.
//!
//! # Components
//!
//! - [`MockGenerator`] - scripted generation collaborator
//! - [`MockIdentity`] - credential -> principal map
//! - [`MockMedia`] - deterministic media synthesis with failure injection
//! - [`MockBilling`] - canned billing session URLs
//! - [`TestHarness`] - full service stack over in-memory SQLite

pub mod harness;
pub mod mock_billing;
pub mod mock_generator;
pub mod mock_identity;
pub mod mock_media;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_billing::MockBilling;
pub use mock_generator::MockGenerator;
pub use mock_identity::MockIdentity;
pub use mock_media::MockMedia;
