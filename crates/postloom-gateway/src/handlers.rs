// SPDX-FileCopyrightText: 2026 Postloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway REST API.
//!
//! All `/v1` handlers run behind the auth middleware and receive the
//! authenticated [`User`] as a request extension. Ids always pass through
//! the ownership resolver inside the services, so a foreign id is 403 and
//! an absent one is 404.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use postloom_content::{BrandPatch, NewBrand, NewPost, PostPatch, StateChange};
use postloom_core::types::{Brand, GenerationRequest, PlanTier, Platform, Post, PostStatus, User};
use postloom_core::PostloomError;
use postloom_quota::UsageSnapshot;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ErrorResponse};
use crate::server::GatewayState;

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Health status string.
    pub status: String,
    /// Binary version.
    pub version: String,
    /// Uptime in seconds.
    pub uptime_secs: u64,
}

/// Request body for POST /v1/generate.
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    /// Brand whose voice preset drives the prompt.
    pub brand_id: String,
    pub prompt: String,
    pub platform: Platform,
    /// Model override; the collaborator default is used when absent.
    #[serde(default)]
    pub model: Option<String>,
}

/// Response body for POST /v1/generate.
#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    /// Generated post text.
    pub text: String,
}

/// Request body for PATCH /v1/posts/{id}.
///
/// A `status` change rides separately from the plain field edits and goes
/// through the lifecycle transition function; `scheduled_for` is required
/// when moving to `scheduled` and ignored otherwise.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdatePostRequest {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub platform: Option<Platform>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub audio_url: Option<String>,
    #[serde(default)]
    pub status: Option<PostStatus>,
    #[serde(default)]
    pub scheduled_for: Option<DateTime<Utc>>,
}

/// Query parameters for GET /v1/posts.
#[derive(Debug, Default, Deserialize)]
pub struct ListPostsQuery {
    /// Restrict to one owned brand.
    #[serde(default)]
    pub brand_id: Option<String>,
}

/// Request body for POST /v1/media/images.
#[derive(Debug, Deserialize)]
pub struct ImageRequest {
    pub prompt: String,
}

/// Request body for POST /v1/media/voiceovers.
#[derive(Debug, Deserialize)]
pub struct VoiceoverRequest {
    pub text: String,
    /// Voice preset; the default brand voice is used when absent.
    #[serde(default)]
    pub voice: Option<String>,
}

/// Response body for media synthesis calls.
#[derive(Debug, Serialize)]
pub struct MediaResponse {
    /// URL of the synthesized asset.
    pub url: String,
}

/// Request body for POST /v1/billing/checkout.
#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    /// Target plan for the upgrade.
    pub plan: PlanTier,
}

/// Response body for billing session calls.
#[derive(Debug, Serialize)]
pub struct BillingSessionResponse {
    /// URL the caller is redirected to.
    pub url: String,
}

/// GET /health (unauthenticated, for process supervisors).
pub async fn get_public_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// GET /v1/usage
pub async fn get_usage(
    State(state): State<GatewayState>,
    Extension(user): Extension<User>,
) -> Result<Json<UsageSnapshot>, ApiError> {
    let snapshot = state.ledger.usage(&user.id, Utc::now()).await?;
    Ok(Json(snapshot))
}

/// GET /v1/brands
pub async fn list_brands(
    State(state): State<GatewayState>,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<Brand>>, ApiError> {
    let brands = state.brands.list_brands(&user).await?;
    Ok(Json(brands))
}

/// POST /v1/brands
pub async fn create_brand(
    State(state): State<GatewayState>,
    Extension(user): Extension<User>,
    Json(body): Json<NewBrand>,
) -> Result<(StatusCode, Json<Brand>), ApiError> {
    let brand = state.brands.create_brand(&user, body, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(brand)))
}

/// PATCH /v1/brands/{id}
pub async fn update_brand(
    State(state): State<GatewayState>,
    Extension(user): Extension<User>,
    Path(brand_id): Path<String>,
    Json(body): Json<BrandPatch>,
) -> Result<Json<Brand>, ApiError> {
    let brand = state.brands.update_brand(&user, &brand_id, body).await?;
    Ok(Json(brand))
}

/// DELETE /v1/brands/{id}
///
/// Cascades to the brand's posts. Spent monthly post quota is not refunded.
pub async fn delete_brand(
    State(state): State<GatewayState>,
    Extension(user): Extension<User>,
    Path(brand_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.brands.delete_brand(&user, &brand_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /v1/posts
pub async fn list_posts(
    State(state): State<GatewayState>,
    Extension(user): Extension<User>,
    Query(query): Query<ListPostsQuery>,
) -> Result<Json<Vec<Post>>, ApiError> {
    let posts = state
        .posts
        .list_posts(&user, query.brand_id.as_deref())
        .await?;
    Ok(Json(posts))
}

/// POST /v1/posts
pub async fn create_post(
    State(state): State<GatewayState>,
    Extension(user): Extension<User>,
    Json(body): Json<NewPost>,
) -> Result<(StatusCode, Json<Post>), ApiError> {
    let post = state.posts.create_post(&user, body, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// PATCH /v1/posts/{id}
pub async fn update_post(
    State(state): State<GatewayState>,
    Extension(user): Extension<User>,
    Path(post_id): Path<String>,
    Json(body): Json<UpdatePostRequest>,
) -> Result<Json<Post>, ApiError> {
    let state_change = match body.status {
        None => None,
        Some(PostStatus::Draft) => Some(StateChange::ToDraft),
        Some(PostStatus::Scheduled) => {
            let at = body.scheduled_for.ok_or_else(|| {
                PostloomError::Validation(
                    "scheduled_for is required when moving to scheduled".to_string(),
                )
            })?;
            Some(StateChange::Schedule(at))
        }
        Some(PostStatus::Published) => Some(StateChange::Publish),
    };

    let patch = PostPatch {
        content: body.content,
        platform: body.platform,
        image_url: body.image_url,
        audio_url: body.audio_url,
        state: state_change,
    };
    let post = state
        .posts
        .update_post(&user, &post_id, patch, Utc::now())
        .await?;
    Ok(Json(post))
}

/// DELETE /v1/posts/{id}
///
/// The monthly counter is not refunded.
pub async fn delete_post(
    State(state): State<GatewayState>,
    Extension(user): Extension<User>,
    Path(post_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.posts.delete_post(&user, &post_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /v1/generate
///
/// Single-shot generation under the orchestrator deadline. The brand id
/// must belong to the caller; its voice preset is carried into the prompt.
pub async fn generate(
    State(state): State<GatewayState>,
    Extension(user): Extension<User>,
    Json(body): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let brand = state.brands.get_brand(&user, &body.brand_id).await?;
    let text = state
        .orchestrator
        .generate_one(GenerationRequest {
            prompt: body.prompt,
            platform: body.platform,
            voice: brand.voice,
            model: body.model,
        })
        .await?;
    Ok(Json(GenerateResponse { text }))
}

/// POST /v1/media/images
pub async fn generate_image(
    State(state): State<GatewayState>,
    Extension(user): Extension<User>,
    Json(body): Json<ImageRequest>,
) -> Result<Json<MediaResponse>, ApiError> {
    let url = state
        .media
        .generate_image(&user, &body.prompt, Utc::now())
        .await?;
    Ok(Json(MediaResponse { url }))
}

/// POST /v1/media/voiceovers
pub async fn generate_voiceover(
    State(state): State<GatewayState>,
    Extension(user): Extension<User>,
    Json(body): Json<VoiceoverRequest>,
) -> Result<Json<MediaResponse>, ApiError> {
    let voice = body.voice.as_deref().unwrap_or("professional");
    let url = state
        .media
        .generate_voice(&user, &body.text, voice, Utc::now())
        .await?;
    Ok(Json(MediaResponse { url }))
}

/// POST /v1/billing/checkout
pub async fn billing_checkout(
    State(state): State<GatewayState>,
    Extension(_user): Extension<User>,
    Json(body): Json<CheckoutRequest>,
) -> Response {
    let Some(billing) = state.billing.as_ref() else {
        return billing_unconfigured();
    };
    match billing.checkout_session(body.plan).await {
        Ok(url) => Json(BillingSessionResponse { url }).into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}

/// POST /v1/billing/portal
///
/// Requires a billing customer reference on the user, which only exists
/// after a completed checkout.
pub async fn billing_portal(
    State(state): State<GatewayState>,
    Extension(user): Extension<User>,
) -> Response {
    let Some(billing) = state.billing.as_ref() else {
        return billing_unconfigured();
    };
    let Some(customer_id) = user.billing_customer_id.as_deref() else {
        return ApiError(PostloomError::Validation(
            "no billing customer on file for this account".to_string(),
        ))
        .into_response();
    };
    match billing.portal_session(customer_id).await {
        Ok(url) => Json(BillingSessionResponse { url }).into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}

fn billing_unconfigured() -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ErrorResponse {
            error: "billing is not configured".to_string(),
        }),
    )
        .into_response()
}
