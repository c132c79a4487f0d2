// SPDX-FileCopyrightText: 2026 Postloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `postloom status` command implementation.
//!
//! Connects to the gateway health endpoint to display server state and
//! uptime. Falls back gracefully when the server is not running.

use std::time::Duration;

use postloom_config::model::PostloomConfig;
use postloom_core::PostloomError;
use postloom_storage::Database;
use serde::{Deserialize, Serialize};

/// Health endpoint response from the gateway.
#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
    version: String,
    uptime_secs: u64,
}

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub running: bool,
    pub status: String,
    pub version: Option<String>,
    pub uptime_secs: Option<u64>,
    pub uptime_human: Option<String>,
    pub host: String,
    pub port: u16,
    pub database_path: String,
    pub storage: Option<StorageCounts>,
}

/// Row counts from the local database file.
#[derive(Debug, Serialize)]
pub struct StorageCounts {
    pub users: u32,
    pub brands: u32,
    pub posts: u32,
}

/// Count rows in the local database, when the file exists.
///
/// Reads are safe alongside a running server (WAL mode).
async fn read_storage_counts(config: &PostloomConfig) -> Option<StorageCounts> {
    let path = &config.storage.database_path;
    if !std::path::Path::new(path).exists() {
        return None;
    }
    let db = Database::open(path, config.storage.wal_mode).await.ok()?;
    db.connection()
        .call(|conn| -> Result<StorageCounts, rusqlite::Error> {
            let count = |sql: &str| conn.query_row(sql, [], |row| row.get::<_, u32>(0));
            Ok(StorageCounts {
                users: count("SELECT COUNT(*) FROM users")?,
                brands: count("SELECT COUNT(*) FROM brands")?,
                posts: count("SELECT COUNT(*) FROM posts")?,
            })
        })
        .await
        .ok()
}

/// Format seconds into a human-readable duration string.
fn format_uptime(secs: u64) -> String {
    let days = secs / 86400;
    let hours = (secs % 86400) / 3600;
    let minutes = (secs % 3600) / 60;

    if days > 0 {
        format!("{days}d {hours}h {minutes}m")
    } else if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

/// Run the `postloom status` command.
///
/// Connects to the health endpoint on the gateway and displays server
/// state. If `--json` is passed, outputs structured JSON for scripting.
pub async fn run_status(config: &PostloomConfig, json: bool) -> Result<(), PostloomError> {
    let host = &config.service.bind_address;
    let port = config.service.port;
    let url = format!("http://{host}:{port}/health");

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(3))
        .build()
        .map_err(|e| PostloomError::Internal(format!("failed to create HTTP client: {e}")))?;

    let storage = read_storage_counts(config).await;
    let database_path = config.storage.database_path.clone();

    let response = match client.get(&url).send().await {
        Ok(response) => match response.json::<HealthResponse>().await {
            Ok(health) => StatusResponse {
                running: true,
                status: health.status,
                version: Some(health.version),
                uptime_human: Some(format_uptime(health.uptime_secs)),
                uptime_secs: Some(health.uptime_secs),
                host: host.clone(),
                port,
                database_path,
                storage,
            },
            Err(e) => {
                return Err(PostloomError::Internal(format!(
                    "unexpected health response from {url}: {e}"
                )));
            }
        },
        Err(_) => StatusResponse {
            running: false,
            status: "stopped".to_string(),
            version: None,
            uptime_secs: None,
            uptime_human: None,
            host: host.clone(),
            port,
            database_path,
            storage,
        },
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&response)
                .map_err(|e| PostloomError::Internal(format!("failed to render status: {e}")))?
        );
        return Ok(());
    }

    if response.running {
        println!("postloom: {} on {}:{}", response.status, response.host, response.port);
        if let Some(uptime) = &response.uptime_human {
            println!("  uptime: {uptime}");
        }
        if let Some(version) = &response.version {
            println!("  version: {version}");
        }
    } else {
        println!(
            "postloom: not running (no gateway on {}:{})",
            response.host, response.port
        );
    }

    println!("  database: {}", response.database_path);
    match &response.storage {
        Some(counts) => println!(
            "  rows: {} users, {} brands, {} posts",
            counts.users, counts.brands, counts.posts
        ),
        None => println!("  rows: (database not created yet)"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uptime_formats_by_magnitude() {
        assert_eq!(format_uptime(59), "0m");
        assert_eq!(format_uptime(3 * 60), "3m");
        assert_eq!(format_uptime(2 * 3600 + 5 * 60), "2h 5m");
        assert_eq!(format_uptime(3 * 86400 + 3600), "3d 1h 0m");
    }

    #[test]
    fn status_response_serializes_for_json_mode() {
        let response = StatusResponse {
            running: true,
            status: "ok".into(),
            version: Some("0.1.0".into()),
            uptime_secs: Some(90),
            uptime_human: Some("1m".into()),
            host: "127.0.0.1".into(),
            port: 8080,
            database_path: "postloom.db".into(),
            storage: Some(StorageCounts {
                users: 1,
                brands: 2,
                posts: 3,
            }),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"running\":true"));
        assert!(json.contains("\"port\":8080"));
    }
}
