// SPDX-FileCopyrightText: 2026 Postloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for Postloom's external collaborators.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod billing;
pub mod generation;
pub mod identity;
pub mod media;
pub mod storage;

pub use adapter::PluginAdapter;
pub use billing::BillingAdapter;
pub use generation::GenerationAdapter;
pub use identity::IdentityAdapter;
pub use media::MediaAdapter;
pub use storage::StorageAdapter;
