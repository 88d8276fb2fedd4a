// File: streamguard-core/src/tasks/presence.rs

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};
use twilight_gateway::MessageSender;
use twilight_model::gateway::payload::outgoing::UpdatePresence;
use twilight_model::gateway::presence::{ActivityType, MinimalActivity, Status};

use streamguard_common::models::platform::Platform;

use crate::Error;
use crate::tasks::notified_state::NotifiedState;

pub const PRESENCE_INTERVAL: Duration = Duration::from_secs(300);

/// "Watching {name} on Twitch" while someone tracked is live, "Watching you"
/// otherwise.
pub fn presence_activity_name(live: Option<&str>) -> String {
    match live {
        Some(name) => format!("{} on Twitch", name),
        None => "you".to_string(),
    }
}

fn presence_payload(name: String) -> Result<UpdatePresence, Error> {
    let activity = MinimalActivity {
        kind: ActivityType::Watching,
        name,
        url: None,
    };
    UpdatePresence::new(vec![activity.into()], false, None, Status::Online)
        .map_err(|e| Error::Platform(format!("Invalid presence payload: {e}")))
}

pub fn spawn_presence_task(
    senders: Vec<MessageSender>,
    state: Arc<NotifiedState>,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(PRESENCE_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Presence task stopping");
                        return;
                    }
                    continue;
                }
            }

            let live = state.any_live(Platform::Twitch);
            let name = presence_activity_name(live.as_deref());
            let payload = match presence_payload(name.clone()) {
                Ok(p) => p,
                Err(e) => {
                    warn!("{}", e);
                    continue;
                }
            };
            for sender in &senders {
                if let Err(e) = sender.command(&payload) {
                    warn!("Failed to update presence: {}", e);
                }
            }
            debug!("Presence set to 'Watching {}'", name);
        }
    })
}
