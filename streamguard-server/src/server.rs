//! streamguard-server/src/server.rs
//!
//! Wires the store, the Discord gateway and the platform monitors together
//! and runs until Ctrl-C.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::watch;
use tracing::{error, info, warn};

use streamguard_common::traits::platform_traits::{Notifier, StatusClient};
use streamguard_common::traits::repository_traits::SettingsRepository;
use streamguard_core::Database;
use streamguard_core::health::{start_health_server, HealthState};
use streamguard_core::platforms::discord::{DiscordNotifier, DiscordPlatform};
use streamguard_core::platforms::twitch::status::twitch_status_client;
use streamguard_core::platforms::youtube::YouTubeStatusClient;
use streamguard_core::repositories::SqliteSettingsRepository;
use streamguard_core::services::discord::CommandService;
use streamguard_core::tasks::heartbeat::spawn_heartbeat_task;
use streamguard_core::tasks::presence::spawn_presence_task;
use streamguard_core::tasks::{NotifiedState, StreamMonitor};

use crate::Args;

pub async fn run_server(args: Args) -> anyhow::Result<()> {
    let db = Database::new(&args.database_path)
        .await
        .with_context(|| format!("opening database {}", args.database_path))?;
    db.migrate().await.context("running migrations")?;
    let settings: Arc<dyn SettingsRepository + Send + Sync> =
        Arc::new(SqliteSettingsRepository::new(db.pool().clone()));

    let commands = Arc::new(CommandService::new(settings.clone(), &args.prefix));
    let mut discord = DiscordPlatform::new(args.discord_token.clone());
    discord
        .connect(commands)
        .await
        .context("connecting to the Discord gateway")?;

    let notifier: Arc<dyn Notifier> = Arc::new(DiscordNotifier::new(discord.http()));
    let notified = Arc::new(NotifiedState::new());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let poll_interval = Duration::from_secs(args.poll_interval_secs.max(1));

    let mut monitors = Vec::new();
    match (&args.twitch_client_id, &args.twitch_client_secret) {
        (Some(id), Some(secret)) => {
            let client: Arc<dyn StatusClient> = Arc::new(twitch_status_client(id, secret));
            let monitor = StreamMonitor::new(client, settings.clone(), notifier.clone(), notified.clone())
                .with_interval(poll_interval);
            monitors.push(monitor.spawn(shutdown_rx.clone()));
        }
        _ => warn!("CLIENT_ID / CLIENT_SECRET not set, Twitch monitor disabled"),
    }

    let youtube: Arc<dyn StatusClient> = Arc::new(YouTubeStatusClient::new());
    let monitor = StreamMonitor::new(youtube, settings.clone(), notifier.clone(), notified.clone())
        .with_interval(poll_interval);
    monitors.push(monitor.spawn(shutdown_rx.clone()));

    let health = start_health_server(args.port, HealthState::new(notified.clone()));
    let heartbeat = spawn_heartbeat_task(shutdown_rx.clone());
    let presence = spawn_presence_task(discord.senders(), notified.clone(), shutdown_rx.clone());

    info!("StreamGuard is up. Press Ctrl-C to stop.");
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {}", e);
    }
    info!("Shutting down...");

    let _ = shutdown_tx.send(true);
    for handle in monitors {
        let _ = handle.await;
    }
    let _ = heartbeat.await;
    let _ = presence.await;
    health.graceful_shutdown(Some(Duration::from_secs(5)));

    if let Err(e) = discord.disconnect().await {
        error!("Discord disconnect failed: {}", e);
    }
    db.pool().close().await;
    Ok(())
}
