// SPDX-FileCopyrightText: 2026 Postloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Postloom content service.
//!
//! This crate provides the foundational trait definitions, error taxonomy,
//! and domain types used throughout the Postloom workspace. All collaborator
//! adapters implement traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::PostloomError;
pub use types::{
    AdapterType, BatchRequest, BatchSize, Brand, GenerationRequest, HealthStatus, PlanTier,
    Platform, Post, PostState, PostStatus, Principal, ResourceKind, User,
};

// Re-export all adapter traits at crate root.
pub use traits::{
    BillingAdapter, GenerationAdapter, IdentityAdapter, MediaAdapter, PluginAdapter,
    StorageAdapter,
};
