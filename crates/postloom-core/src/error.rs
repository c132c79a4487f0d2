// SPDX-FileCopyrightText: 2026 Postloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Postloom content service.

use thiserror::Error;

use crate::types::ResourceKind;

/// The primary error type used across all Postloom adapter traits and core operations.
///
/// The first five variants are terminal for the current request and are never
/// retried automatically. `Provider` and `Timeout` come from external
/// collaborators and may be retried by the caller.
#[derive(Debug, Error)]
pub enum PostloomError {
    /// No resolvable principal for the request.
    #[error("not authenticated")]
    Unauthenticated,

    /// The referenced id has no record.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The record exists but belongs to a different user.
    #[error("{entity} {id} does not belong to the caller")]
    Forbidden { entity: &'static str, id: String },

    /// The plan limit for a resource has been reached.
    #[error("{resource} limit of {limit} reached for the current plan")]
    QuotaExceeded { resource: ResourceKind, limit: u32 },

    /// Malformed or missing required input.
    #[error("validation error: {0}")]
    Validation(String),

    /// External collaborator failure (generation, media, billing).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Deadline elapsed waiting on an external collaborator.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl PostloomError {
    /// True for errors that are terminal for the current request and must not
    /// be retried automatically.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Unauthenticated
                | Self::NotFound { .. }
                | Self::Forbidden { .. }
                | Self::QuotaExceeded { .. }
                | Self::Validation(_)
        )
    }
}
