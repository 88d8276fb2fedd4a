// File: streamguard-core/src/tasks/stream_monitor.rs
//
// The poll-and-notify loop. One monitor per platform; each tick walks every
// guild, fetches the status of each tracked entity and sends one
// notification per NOT_NOTIFIED -> NOTIFIED transition.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use streamguard_common::models::observation::Observation;
use streamguard_common::models::platform::Platform;
use streamguard_common::traits::platform_traits::{Notifier, StatusClient};
use streamguard_common::traits::repository_traits::SettingsRepository;

use crate::Error;
use crate::services::notification::format_notification;
use crate::tasks::notified_state::{NotifiedState, Transition};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Counters for one tick.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub notified: usize,
    pub cleared: usize,
    pub unchanged: usize,
    pub fetch_failures: usize,
    pub delivery_failures: usize,
    pub guilds_skipped: usize,
}

pub struct StreamMonitor {
    client: Arc<dyn StatusClient>,
    settings: Arc<dyn SettingsRepository + Send + Sync>,
    notifier: Arc<dyn Notifier>,
    state: Arc<NotifiedState>,
    poll_interval: Duration,
}

impl StreamMonitor {
    pub fn new(
        client: Arc<dyn StatusClient>,
        settings: Arc<dyn SettingsRepository + Send + Sync>,
        notifier: Arc<dyn Notifier>,
        state: Arc<NotifiedState>,
    ) -> Self {
        Self {
            client,
            settings,
            notifier,
            state,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn platform(&self) -> Platform {
        self.client.platform()
    }

    pub fn state(&self) -> &Arc<NotifiedState> {
        &self.state
    }

    /// One pass over every guild. Only a failure to list guilds is returned;
    /// everything else is counted and logged.
    pub async fn run_tick(&self) -> Result<TickReport, Error> {
        let platform = self.platform();
        let mut report = TickReport::default();
        self.client.begin_tick();

        for guild_id in self.settings.list_guild_ids().await? {
            let tracked = match self.settings.list_tracked(&guild_id, platform).await {
                Ok(t) => t,
                Err(e) => {
                    error!("[{}] Could not load tracked list for guild {}: {}", platform, guild_id, e);
                    continue;
                }
            };
            self.state.retain_tracked(platform, &guild_id, &tracked);
            if tracked.is_empty() {
                continue;
            }

            let target = match self.settings.get_notification_target(&guild_id, platform).await {
                Ok(Some(target)) => target,
                Ok(None) => {
                    let e = Error::ConfigLookup(format!("no {} channel configured for guild {}", platform, guild_id));
                    warn!("[{}] Skipping guild: {}", platform, e);
                    report.guilds_skipped += 1;
                    continue;
                }
                Err(e) => {
                    error!("[{}] Could not load settings for guild {}: {}", platform, guild_id, e);
                    report.guilds_skipped += 1;
                    continue;
                }
            };

            for entity in &tracked {
                let observation = match self.client.get_status(entity).await {
                    Ok(obs) => obs,
                    Err(e) => {
                        warn!("[{}] Status fetch failed for '{}': {}", platform, entity, e);
                        report.fetch_failures += 1;
                        continue;
                    }
                };

                match self.state.apply(platform, &guild_id, entity, observation.is_live()) {
                    Transition::Notify => {
                        report.notified += 1;
                        let Observation::Live(live) = &observation else { continue };
                        let message = format_notification(platform, entity, live);
                        info!("[{}] '{}' went live, notifying guild {}", platform, entity, guild_id);
                        if let Err(e) = self
                            .notifier
                            .send(&target.channel_id, &message, target.role_id.as_deref())
                            .await
                        {
                            error!("[{}] Notification for '{}' in guild {} failed: {}", platform, entity, guild_id, e);
                            report.delivery_failures += 1;
                        }
                    }
                    Transition::Clear => {
                        debug!("[{}] '{}' is no longer live in guild {}", platform, entity, guild_id);
                        report.cleared += 1;
                    }
                    Transition::Unchanged => report.unchanged += 1,
                }
            }
        }

        Ok(report)
    }

    /// Prepares the client, then ticks until `shutdown` flips to `true`.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> Result<(), Error> {
        let platform = self.platform();
        self.client.prepare().await.map_err(|e| match e {
            Error::Credential(msg) => Error::Credential(msg),
            other => Error::Credential(other.to_string()),
        })?;
        info!("[{}] Monitor started, polling every {:?}", platform, self.poll_interval);

        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        info!("[{}] Shutdown sender dropped, monitor stopping", platform);
                        return Ok(());
                    }
                }
            }
            if *shutdown.borrow() {
                info!("[{}] Monitor stopping", platform);
                return Ok(());
            }

            match self.run_tick().await {
                Ok(report) => debug!("[{}] Tick finished: {:?}", platform, report),
                Err(e) => error!("[{}] Tick aborted: {}", platform, e),
            }
        }
    }

    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let platform = self.platform();
            if let Err(e) = self.run(shutdown).await {
                error!("[{}] Monitor did not start: {}", platform, e);
            }
        })
    }
}
