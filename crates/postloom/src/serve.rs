// SPDX-FileCopyrightText: 2026 Postloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `postloom serve` command implementation.
//!
//! Starts the full service: SQLite storage with migrations, the brand and
//! post services, the usage ledger with its periodic reset sweep, the
//! generation/media/billing collaborator clients, and the HTTP gateway.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use postloom_config::model::PostloomConfig;
use postloom_content::{BrandService, PostService};
use postloom_core::error::PostloomError;
use postloom_core::traits::{BillingAdapter, IdentityAdapter, StorageAdapter};
use postloom_gateway::{AuthState, GatewayState, ServerConfig, StaticTokenIdentity};
use postloom_generation::{BillingClient, GenerationClient, MediaClient, MediaService, Orchestrator};
use postloom_quota::UsageLedger;
use postloom_storage::SqliteStorage;
use tracing::{error, info, warn};

/// Runs the `postloom serve` command.
///
/// Initializes all subsystems and serves until ctrl-c.
pub async fn run_serve(config: PostloomConfig) -> Result<(), PostloomError> {
    init_tracing(&config.service.log_level);

    info!(name = %config.service.name, "starting postloom serve");

    // Storage: open, migrate, and hand out the shared handle.
    let storage = SqliteStorage::new(config.storage.clone());
    storage.initialize().await?;
    let db = storage.database()?;

    let brands = BrandService::new(db.clone());
    let posts = PostService::new(db.clone());
    let ledger = UsageLedger::new(db.clone());

    // Generation collaborator behind the deadline-enforcing orchestrator.
    let generation_client = Arc::new(GenerationClient::new(&config.generation)?);
    let deadline = Duration::from_secs(config.generation.timeout_secs);
    let orchestrator = Orchestrator::new(generation_client, deadline);

    let media_client = Arc::new(MediaClient::new(&config.media)?);
    let media_deadline = Duration::from_secs(config.media.timeout_secs);
    let media = MediaService::new(media_client, db.clone(), media_deadline);

    let billing: Option<Arc<dyn BillingAdapter>> = if config.billing.api_key.is_some() {
        Some(Arc::new(BillingClient::new(&config.billing)?))
    } else {
        warn!("billing is not configured; billing routes will return 503");
        None
    };

    let identity: Option<Arc<dyn IdentityAdapter>> = match config.service.bearer_token.clone() {
        Some(token) => Some(Arc::new(StaticTokenIdentity::new(token))),
        None => {
            warn!("no bearer token configured; all API requests will be rejected");
            None
        }
    };

    // Periodic usage-reset sweep.
    let sweep_interval = Duration::from_secs(config.quota.sweep_interval_secs);
    let sweep_ledger = ledger.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(sweep_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            match sweep_ledger.sweep(Utc::now()).await {
                Ok(reset) if reset > 0 => info!(reset, "monthly usage sweep completed"),
                Ok(_) => {}
                Err(e) => error!(error = %e, "monthly usage sweep failed"),
            }
        }
    });

    let state = GatewayState {
        brands,
        posts,
        ledger,
        orchestrator,
        media,
        billing,
        auth: AuthState {
            identity,
            db: db.clone(),
        },
        start_time: std::time::Instant::now(),
    };

    let server_config = ServerConfig {
        host: config.service.bind_address.clone(),
        port: config.service.port,
    };

    tokio::select! {
        result = postloom_gateway::start_server(&server_config, state) => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
        }
    }

    storage.close().await?;
    info!("postloom stopped");
    Ok(())
}

/// Initialize the tracing subscriber from the configured log level.
///
/// `RUST_LOG` takes precedence over the config value when set.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("postloom={log_level},tower_http=info")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
