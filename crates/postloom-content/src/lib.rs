// SPDX-FileCopyrightText: 2026 Postloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Brand and post services for the Postloom content service.
//!
//! This crate owns the mutation surface over the stored entities:
//! - **Ownership resolver**: the single authorization checkpoint for
//!   id-taking operations
//! - **Brand service**: creation with derived defaults, patching, cascade
//!   delete
//! - **Post service**: quota-gated creation and lifecycle-checked updates
//! - **Lifecycle**: the post status transition function

pub mod brands;
pub mod lifecycle;
pub mod posts;
pub mod resolver;
pub mod types;

pub use brands::{derive_initials, BrandService};
pub use lifecycle::{transition, StateChange};
pub use posts::PostService;
pub use resolver::{resolve_owned_brand, resolve_owned_post};
pub use types::{BrandPatch, NewBrand, NewPost, PostPatch};
