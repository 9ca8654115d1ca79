// Bot binary entry point
//
// One invocation runs a single scan cycle over the configured channels and
// exits; an external scheduler (cron, systemd timer) drives the cadence.
// Exit status is non-zero on any fatal error category.

use chrono::Utc;
use common::config::Settings;
use common::db::{self, DbPool};
use common::notify::DiscordNotifier;
use common::pacing::FixedDelayPacer;
use common::scanner::{ScanConfig, ScanEngine};
use common::search::YouTubeSearchClient;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize tracing/logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bot=info,common=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("Starting tubewatch");

    // Load configuration
    let settings = Settings::load().map_err(|e| {
        error!(error = %e, "Failed to load configuration");
        e
    })?;
    settings.validate().map_err(|e| {
        error!(error = %e, "Invalid configuration");
        anyhow::anyhow!(e)
    })?;

    info!(
        database_path = %settings.database.path,
        channel_count = settings.channels.len(),
        "Configuration loaded"
    );

    // Open the ledger store and make sure the schema exists
    let db_pool = DbPool::new(&settings.database).await.map_err(|e| {
        error!(error = %e, "Failed to open ledger store");
        e
    })?;
    db::create_schema(&db_pool).await.map_err(|e| {
        error!(error = %e, "Failed to bootstrap ledger schema");
        e
    })?;

    // Wire up the collaborators
    let search = Arc::new(YouTubeSearchClient::new(
        &settings.youtube.base_url,
        &settings.youtube.api_key,
        settings.youtube.timeout_seconds,
    )?);
    let notifier = Arc::new(DiscordNotifier::new(
        &settings.discord.webhook_url,
        settings.discord.timeout_seconds,
    )?);
    let pacer = Arc::new(FixedDelayPacer::new(Duration::from_secs(
        settings.scan.pace_seconds,
    )));

    let scan_config = ScanConfig {
        recheck_interval_hours: settings.scan.recheck_interval_hours,
        lookback_hours: settings.scan.lookback_hours,
        max_results: settings.scan.max_results,
        announcement_retention_days: settings.scan.announcement_retention_days,
    };
    let engine = ScanEngine::new(scan_config, db_pool.clone(), search, notifier, pacer);

    // Run one full cycle
    let report = engine.run_cycle(&settings.channels, Utc::now()).await;

    db_pool.close().await;

    match report {
        Ok(report) => {
            info!(
                channels_scanned = report.channels_scanned,
                channels_skipped = report.channels_skipped,
                channels_failed = report.channels_failed,
                videos_announced = report.videos_announced,
                "Run finished"
            );
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Run failed");
            Err(Box::new(e) as Box<dyn std::error::Error + Send + Sync>)
        }
    }
}
