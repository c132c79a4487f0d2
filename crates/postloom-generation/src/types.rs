// SPDX-FileCopyrightText: 2026 Postloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the generation collaborator API.

use postloom_core::types::Platform;
use serde::{Deserialize, Serialize};

/// Request body for a single generation call.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateWireRequest {
    pub model: String,
    pub prompt: String,
    pub platform: Platform,
    pub voice: String,
}

/// Response body for a single generation call.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateWireResponse {
    pub id: String,
    pub text: String,
    pub model: String,
}

/// Request body for a transcript repurposing batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchWireRequest {
    pub model: String,
    pub transcript: String,
    pub platform: Platform,
    pub style: String,
    pub count: u32,
}

/// Response body for a batch call. `items` is ordered.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchWireResponse {
    pub id: String,
    pub items: Vec<String>,
    pub model: String,
}

/// Error response body from any collaborator.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(rename = "type")]
    pub type_: String,
    pub message: String,
}
