// SPDX-FileCopyrightText: 2026 Postloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as valid bind addresses, non-empty paths, and non-zero
//! deadlines.

use crate::diagnostic::ConfigError;
use crate::model::PostloomConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &PostloomConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let addr = config.service.bind_address.trim();
    if addr.is_empty() {
        errors.push(ConfigError::Validation {
            message: "service.bind_address must not be empty".to_string(),
        });
    } else {
        let is_valid_ip = addr.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = addr
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!(
                    "service.bind_address `{addr}` is not a valid IP address or hostname"
                ),
            });
        }
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.generation.timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "generation.timeout_secs must be at least 1".to_string(),
        });
    }

    if config.media.timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "media.timeout_secs must be at least 1".to_string(),
        });
    }

    if config.generation.base_url.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "generation.base_url must not be empty".to_string(),
        });
    }

    if config.quota.sweep_interval_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "quota.sweep_interval_secs must be at least 1".to_string(),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
