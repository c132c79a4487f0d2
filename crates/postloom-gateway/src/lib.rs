// SPDX-FileCopyrightText: 2026 Postloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Postloom content service.
//!
//! Exposes the brand/post/usage/generation surface over REST with
//! bearer-token authentication resolved through the identity collaborator.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod server;

pub use auth::{auth_middleware, AuthState, StaticTokenIdentity};
pub use error::{ApiError, ErrorResponse};
pub use server::{router, start_server, GatewayState, ServerConfig};
