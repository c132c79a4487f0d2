// SPDX-FileCopyrightText: 2026 Postloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state. `/health` is public;
//! everything under `/v1` runs behind the auth middleware.

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, patch, post},
    Router,
};
use postloom_content::{BrandService, PostService};
use postloom_core::traits::BillingAdapter;
use postloom_core::PostloomError;
use postloom_generation::{MediaService, Orchestrator};
use postloom_quota::UsageLedger;
use tower_http::cors::CorsLayer;

use crate::auth::{auth_middleware, AuthState};
use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub brands: BrandService,
    pub posts: PostService,
    pub ledger: UsageLedger,
    pub orchestrator: Orchestrator,
    pub media: MediaService,
    /// Billing collaborator; `None` disables the billing routes.
    pub billing: Option<Arc<dyn BillingAdapter>>,
    /// Authentication state for the `/v1` middleware.
    pub auth: AuthState,
    /// Process start time for uptime reporting.
    pub start_time: std::time::Instant,
}

/// Gateway server configuration (mirrors ServiceConfig from postloom-config).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

/// Build the full application router.
///
/// Split out of [`start_server`] so tests can drive the router directly
/// without binding a socket.
pub fn router(state: GatewayState) -> Router {
    let auth_state = state.auth.clone();

    // Unauthenticated public route (health for process supervisors).
    let public_routes = Router::new()
        .route("/health", get(handlers::get_public_health))
        .with_state(state.clone());

    // Routes requiring authentication.
    let api_routes = Router::new()
        .route("/v1/usage", get(handlers::get_usage))
        .route(
            "/v1/brands",
            get(handlers::list_brands).post(handlers::create_brand),
        )
        .route(
            "/v1/brands/{id}",
            patch(handlers::update_brand).delete(handlers::delete_brand),
        )
        .route(
            "/v1/posts",
            get(handlers::list_posts).post(handlers::create_post),
        )
        .route(
            "/v1/posts/{id}",
            patch(handlers::update_post).delete(handlers::delete_post),
        )
        .route("/v1/generate", post(handlers::generate))
        .route("/v1/media/images", post(handlers::generate_image))
        .route("/v1/media/voiceovers", post(handlers::generate_voiceover))
        .route("/v1/billing/checkout", post(handlers::billing_checkout))
        .route("/v1/billing/portal", post(handlers::billing_portal))
        .route_layer(axum_middleware::from_fn_with_state(
            auth_state,
            auth_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(CorsLayer::permissive())
}

/// Start the gateway HTTP server.
///
/// Binds to the configured host:port and serves until the process exits.
pub async fn start_server(config: &ServerConfig, state: GatewayState) -> Result<(), PostloomError> {
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| PostloomError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| PostloomError::Internal(format!("gateway server error: {e}")))?;

    Ok(())
}
