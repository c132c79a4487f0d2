// SPDX-FileCopyrightText: 2026 Postloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Postloom content service.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Postloom configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PostloomConfig {
    /// Service identity, logging, and HTTP bind settings.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Content-generation collaborator settings.
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Image/voiceover synthesis collaborator settings.
    #[serde(default)]
    pub media: MediaConfig,

    /// Billing collaborator settings.
    #[serde(default)]
    pub billing: BillingConfig,

    /// Usage ledger maintenance settings.
    #[serde(default)]
    pub quota: QuotaConfig,
}

/// Service identity and HTTP surface configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Display name of the service instance.
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Address to bind the HTTP gateway to.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Port to bind the HTTP gateway to.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Bearer token protecting the API. `None` rejects all requests
    /// (fail-closed).
    #[serde(default)]
    pub bearer_token: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
            bind_address: default_bind_address(),
            port: default_port(),
            bearer_token: None,
        }
    }
}

fn default_service_name() -> String {
    "postloom".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("postloom").join("postloom.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("postloom.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Content-generation collaborator configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GenerationConfig {
    /// API key for the generation collaborator. `None` requires an
    /// environment variable override.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the generation collaborator.
    #[serde(default = "default_generation_base_url")]
    pub base_url: String,

    /// Default model identifier sent with generation requests.
    #[serde(default = "default_generation_model")]
    pub default_model: String,

    /// Client-side deadline for a single generation call, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_generation_base_url(),
            default_model: default_generation_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_generation_base_url() -> String {
    "https://api.generation.example.com/v1".to_string()
}

fn default_generation_model() -> String {
    "content-large-2".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Media synthesis collaborator configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MediaConfig {
    /// Base URL of the media synthesis collaborator.
    #[serde(default = "default_media_base_url")]
    pub base_url: String,

    /// Client-side deadline for a synthesis call, in seconds.
    #[serde(default = "default_media_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            base_url: default_media_base_url(),
            timeout_secs: default_media_timeout_secs(),
        }
    }
}

fn default_media_base_url() -> String {
    "https://api.media.example.com/v1".to_string()
}

fn default_media_timeout_secs() -> u64 {
    60
}

/// Billing collaborator configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BillingConfig {
    /// API key for the billing collaborator. `None` disables billing routes.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the billing collaborator.
    #[serde(default)]
    pub base_url: Option<String>,
}

/// Usage ledger maintenance configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct QuotaConfig {
    /// Interval between usage-reset sweeps over all users, in seconds.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

fn default_sweep_interval_secs() -> u64 {
    3600
}
