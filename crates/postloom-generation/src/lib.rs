// SPDX-FileCopyrightText: 2026 Postloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator clients and the generation orchestrator.
//!
//! This crate provides:
//! - **Generation client**: HTTP client for the content-generation
//!   collaborator, with transient-error retry
//! - **Orchestrator**: deadline enforcement and local validation in front
//!   of any [`postloom_core::GenerationAdapter`]
//! - **Media**: synthesis client and the plan-gated media service
//! - **Billing**: checkout and portal session client

pub mod billing;
pub mod client;
pub mod media;
pub mod orchestrator;
pub mod types;

pub use billing::BillingClient;
pub use client::GenerationClient;
pub use media::{MediaClient, MediaService};
pub use orchestrator::{Orchestrator, MIN_TRANSCRIPT_CHARS};
