// SPDX-FileCopyrightText: 2026 Postloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./postloom.toml` > `~/.config/postloom/postloom.toml`
//! > `/etc/postloom/postloom.toml` with environment variable overrides via the
//! `POSTLOOM_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::PostloomConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/postloom/postloom.toml` (system-wide)
/// 3. `~/.config/postloom/postloom.toml` (user XDG config)
/// 4. `./postloom.toml` (local directory)
/// 5. `POSTLOOM_*` environment variables
pub fn load_config() -> Result<PostloomConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PostloomConfig::default()))
        .merge(Toml::file("/etc/postloom/postloom.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("postloom/postloom.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("postloom.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<PostloomConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PostloomConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<PostloomConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PostloomConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `POSTLOOM_GENERATION_API_KEY` must map to
/// `generation.api_key`, not `generation.api.key`.
fn env_provider() -> Env {
    Env::prefixed("POSTLOOM_").map(|key| {
        // `key` keeps the env var's original case with the prefix stripped,
        // so lowercase before matching section names.
        // Example: POSTLOOM_STORAGE_DATABASE_PATH -> "storage.database_path"
        let lowered = key.as_str().to_ascii_lowercase();
        let mapped = lowered
            .replacen("service_", "service.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("generation_", "generation.", 1)
            .replacen("media_", "media.", 1)
            .replacen("billing_", "billing.", 1)
            .replacen("quota_", "quota.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn load_from_str_applies_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.service.name, "postloom");
        assert_eq!(config.generation.timeout_secs, 30);
    }

    #[test]
    fn load_from_str_overrides_defaults() {
        let toml = r#"
            [service]
            name = "staging"
            port = 9090

            [generation]
            timeout_secs = 10
        "#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.service.name, "staging");
        assert_eq!(config.service.port, 9090);
        assert_eq!(config.generation.timeout_secs, 10);
        // Unrelated sections keep their defaults.
        assert!(config.storage.wal_mode);
    }

    #[test]
    fn load_from_str_rejects_unknown_section_key() {
        let toml = "[storage]\ndatabse_path = \"x.db\"\n";
        assert!(load_config_from_str(toml).is_err());
    }

    #[test]
    #[serial]
    fn env_override_maps_section_keys() {
        // SAFETY: test is serialized; no other thread reads the environment.
        unsafe {
            std::env::set_var("POSTLOOM_GENERATION_API_KEY", "k-123");
        }
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("postloom.toml");
        std::fs::write(&path, "").unwrap();
        let config = load_config_from_path(&path).unwrap();
        unsafe {
            std::env::remove_var("POSTLOOM_GENERATION_API_KEY");
        }
        assert_eq!(config.generation.api_key.as_deref(), Some("k-123"));
    }

    #[test]
    #[serial]
    fn env_override_keeps_underscores_inside_key_names() {
        // Only the section prefix becomes a dot; the rest of the key keeps
        // its underscores: POSTLOOM_STORAGE_DATABASE_PATH -> storage.database_path.
        unsafe {
            std::env::set_var("POSTLOOM_STORAGE_DATABASE_PATH", "/tmp/override.db");
        }
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("postloom.toml");
        std::fs::write(&path, "").unwrap();
        let config = load_config_from_path(&path).unwrap();
        unsafe {
            std::env::remove_var("POSTLOOM_STORAGE_DATABASE_PATH");
        }
        assert_eq!(config.storage.database_path, "/tmp/override.db");
    }
}
