use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::Client as ReqwestClient;
use tracing::{debug, info};

use streamguard_common::models::observation::{LiveStatus, Observation, ReleaseItem};
use streamguard_common::models::platform::Platform;
use streamguard_common::traits::platform_traits::StatusClient;

use crate::Error;
use crate::platforms::youtube::releases::{parse_releases, releases_url};

/// Releases listed in one notification.
pub const MAX_RELEASES_PER_NOTIFICATION: usize = 5;

#[derive(Debug, Default)]
struct ChannelReleases {
    /// Release urls on the page last time. `None` until the first page is seen.
    seen: Option<HashSet<String>>,
    /// Result handed out for the current tick.
    this_tick: Option<Observation>,
}

/// Remembers which releases each channel has already shown, so that only
/// releases published since the previous poll make a channel "active".
///
/// The first page seen for a channel only seeds the memory. Within one tick
/// every caller gets the same observation, so guilds tracking the same
/// channel all hear about a new release.
#[derive(Debug, Default)]
pub struct ReleaseTracker {
    channels: Mutex<HashMap<String, ChannelReleases>>,
}

impl ReleaseTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets the per-tick results; the seen releases are kept.
    pub fn begin_tick(&self) {
        for channel in self.channels.lock().values_mut() {
            channel.this_tick = None;
        }
    }

    /// Observation already computed for `channel_name` during this tick.
    pub fn cached(&self, channel_name: &str) -> Option<Observation> {
        self.channels
            .lock()
            .get(channel_name)
            .and_then(|c| c.this_tick.clone())
    }

    /// Compares the current release page with the previous one. Returns
    /// `Live` with the unseen releases (newest first), `Offline` otherwise.
    pub fn observe(&self, channel_name: &str, releases: Vec<ReleaseItem>) -> Observation {
        let mut channels = self.channels.lock();
        let channel = channels.entry(channel_name.to_string()).or_default();
        if let Some(obs) = &channel.this_tick {
            return obs.clone();
        }

        let on_page: HashSet<String> = releases.iter().map(|r| r.url.clone()).collect();
        let observation = match channel.seen.take() {
            None => {
                info!(
                    "YouTube channel '{}': remembering {} existing release(s)",
                    channel_name,
                    on_page.len()
                );
                Observation::Offline
            }
            Some(seen) => {
                let fresh = releases
                    .into_iter()
                    .filter(|r| !seen.contains(&r.url))
                    .collect();
                observation_from_releases(channel_name, fresh)
            }
        };

        channel.seen = Some(on_page);
        channel.this_tick = Some(observation.clone());
        observation
    }
}

/// Release-page source for the YouTube monitor. A channel counts as "active"
/// for the tick in which new releases show up on its page.
pub struct YouTubeStatusClient {
    http: ReqwestClient,
    tracker: ReleaseTracker,
}

impl YouTubeStatusClient {
    pub fn new() -> Self {
        Self {
            http: ReqwestClient::new(),
            tracker: ReleaseTracker::new(),
        }
    }
}

impl Default for YouTubeStatusClient {
    fn default() -> Self {
        Self::new()
    }
}

pub fn observation_from_releases(channel_name: &str, mut releases: Vec<ReleaseItem>) -> Observation {
    if releases.is_empty() {
        return Observation::Offline;
    }
    releases.truncate(MAX_RELEASES_PER_NOTIFICATION);
    Observation::Live(LiveStatus {
        display_name: channel_name.to_string(),
        title: releases.first().map(|r| r.title.clone()),
        category: Some("Releases".to_string()),
        url: format!("https://www.youtube.com/@{}", channel_name),
        items: releases,
    })
}

#[async_trait]
impl StatusClient for YouTubeStatusClient {
    fn platform(&self) -> Platform {
        Platform::YouTube
    }

    fn begin_tick(&self) {
        self.tracker.begin_tick();
    }

    async fn get_status(&self, entity_name: &str) -> Result<Observation, Error> {
        if let Some(obs) = self.tracker.cached(entity_name) {
            return Ok(obs);
        }

        let url = releases_url(entity_name);
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::StatusFetch(format!("YouTube releases network error: {}", e)))?;

        if !resp.status().is_success() {
            return Err(Error::StatusFetch(format!(
                "Failed to fetch YouTube releases for channel {}: HTTP {}",
                entity_name,
                resp.status()
            )));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| Error::StatusFetch(format!("YouTube releases body error: {}", e)))?;
        let releases = parse_releases(&body);
        debug!("YouTube channel '{}' lists {} release(s)", entity_name, releases.len());
        Ok(self.tracker.observe(entity_name, releases))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(n: usize) -> ReleaseItem {
        ReleaseItem {
            title: format!("Track {n}"),
            url: format!("https://www.youtube.com/watch?v=id{n}"),
        }
    }

    fn urls(obs: &Observation) -> Vec<String> {
        match obs {
            Observation::Live(live) => live.items.iter().map(|i| i.url.clone()).collect(),
            Observation::Offline => vec![],
        }
    }

    #[test]
    fn releases_are_capped() {
        let obs = observation_from_releases("artist", (0..8).map(item).collect());
        let Observation::Live(live) = obs else { panic!("expected live") };
        assert_eq!(live.items.len(), MAX_RELEASES_PER_NOTIFICATION);
        assert_eq!(live.title.as_deref(), Some("Track 0"));
        assert_eq!(live.url, "https://www.youtube.com/@artist");
    }

    #[test]
    fn no_releases_is_offline() {
        assert_eq!(observation_from_releases("artist", vec![]), Observation::Offline);
    }

    #[test]
    fn first_page_only_seeds_the_tracker() {
        let tracker = ReleaseTracker::new();
        assert_eq!(tracker.observe("artist", vec![item(1), item(2)]), Observation::Offline);

        tracker.begin_tick();
        assert_eq!(tracker.observe("artist", vec![item(1), item(2)]), Observation::Offline);
    }

    #[test]
    fn only_unseen_releases_are_reported() {
        let tracker = ReleaseTracker::new();
        tracker.observe("artist", vec![item(1)]);

        tracker.begin_tick();
        let obs = tracker.observe("artist", vec![item(3), item(2), item(1)]);
        assert_eq!(urls(&obs), vec![item(3).url, item(2).url]);

        tracker.begin_tick();
        assert_eq!(tracker.observe("artist", vec![item(3), item(2), item(1)]), Observation::Offline);
    }

    #[test]
    fn same_tick_returns_same_observation() {
        let tracker = ReleaseTracker::new();
        tracker.observe("artist", vec![]);

        tracker.begin_tick();
        let first = tracker.observe("artist", vec![item(1)]);
        assert!(first.is_live());
        assert_eq!(tracker.cached("artist"), Some(first.clone()));
        assert_eq!(tracker.observe("artist", vec![item(1)]), first);

        tracker.begin_tick();
        assert_eq!(tracker.cached("artist"), None);
        assert_eq!(tracker.observe("artist", vec![item(1)]), Observation::Offline);
    }

    #[test]
    fn channels_are_tracked_separately() {
        let tracker = ReleaseTracker::new();
        tracker.observe("a", vec![item(1)]);
        tracker.begin_tick();
        tracker.observe("a", vec![item(2), item(1)]);
        assert_eq!(tracker.observe("b", vec![item(2), item(1)]), Observation::Offline);
    }
}
