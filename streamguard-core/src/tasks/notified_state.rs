// File: streamguard-core/src/tasks/notified_state.rs
//
// Which (guild, entity) pairs have already been announced for their current
// live episode. In-memory only: a restart forgets everything.

use std::collections::{HashMap, HashSet};

use parking_lot::Mutex;

use streamguard_common::models::platform::Platform;

/// What a single observation does to one (guild, entity) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// NOT_NOTIFIED -> NOTIFIED. Send exactly one notification.
    Notify,
    /// NOTIFIED -> NOT_NOTIFIED. Nothing is sent.
    Clear,
    Unchanged,
}

/// Per-platform map of guild id to the entities already notified there.
///
/// Shared between the monitors (writers) and two readers: the health
/// endpoint and the presence task, which picks a live streamer via `any_live`.
#[derive(Debug, Default)]
pub struct NotifiedState {
    inner: Mutex<HashMap<(Platform, String), HashSet<String>>>,
}

impl NotifiedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one observation and returns the resulting transition.
    pub fn apply(&self, platform: Platform, guild_id: &str, entity: &str, live: bool) -> Transition {
        let mut inner = self.inner.lock();
        let key = (platform, guild_id.to_string());

        if live {
            if inner.entry(key).or_default().insert(entity.to_string()) {
                Transition::Notify
            } else {
                Transition::Unchanged
            }
        } else {
            let Some(set) = inner.get_mut(&key) else {
                return Transition::Unchanged;
            };
            if !set.remove(entity) {
                return Transition::Unchanged;
            }
            if set.is_empty() {
                inner.remove(&key);
            }
            Transition::Clear
        }
    }

    pub fn is_notified(&self, platform: Platform, guild_id: &str, entity: &str) -> bool {
        self.inner
            .lock()
            .get(&(platform, guild_id.to_string()))
            .is_some_and(|set| set.contains(entity))
    }

    /// Entities currently notified in `guild_id`, sorted.
    pub fn live_entities(&self, platform: Platform, guild_id: &str) -> Vec<String> {
        let mut out: Vec<String> = self
            .inner
            .lock()
            .get(&(platform, guild_id.to_string()))
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();
        out.sort();
        out
    }

    /// Alphabetically first notified entity for `platform` in any guild.
    pub fn any_live(&self, platform: Platform) -> Option<String> {
        self.inner
            .lock()
            .iter()
            .filter(|((p, _), _)| *p == platform)
            .flat_map(|(_, set)| set.iter())
            .min()
            .cloned()
    }

    /// Number of notified (guild, entity) pairs for `platform`.
    pub fn count(&self, platform: Platform) -> usize {
        self.inner
            .lock()
            .iter()
            .filter(|((p, _), _)| *p == platform)
            .map(|(_, set)| set.len())
            .sum()
    }

    /// Drops entries for entities no longer tracked in `guild_id`, so that
    /// re-adding one later starts from NOT_NOTIFIED.
    pub fn retain_tracked(&self, platform: Platform, guild_id: &str, tracked: &[String]) {
        let mut inner = self.inner.lock();
        let key = (platform, guild_id.to_string());
        if let Some(set) = inner.get_mut(&key) {
            set.retain(|e| tracked.iter().any(|t| t == e));
            if set.is_empty() {
                inner.remove(&key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn live_then_offline_cycle() {
        let state = NotifiedState::new();
        assert_eq!(state.apply(Platform::Twitch, "g1", "alice", true), Transition::Notify);
        assert_eq!(state.apply(Platform::Twitch, "g1", "alice", true), Transition::Unchanged);
        assert!(state.is_notified(Platform::Twitch, "g1", "alice"));
        assert_eq!(state.apply(Platform::Twitch, "g1", "alice", false), Transition::Clear);
        assert_eq!(state.apply(Platform::Twitch, "g1", "alice", false), Transition::Unchanged);
        assert_eq!(state.apply(Platform::Twitch, "g1", "alice", true), Transition::Notify);
    }

    #[test]
    fn guilds_and_platforms_are_isolated() {
        let state = NotifiedState::new();
        state.apply(Platform::Twitch, "g1", "bob", true);
        assert!(!state.is_notified(Platform::Twitch, "g2", "bob"));
        assert!(!state.is_notified(Platform::YouTube, "g1", "bob"));
        assert_eq!(state.apply(Platform::Twitch, "g2", "bob", true), Transition::Notify);
        assert_eq!(state.count(Platform::Twitch), 2);
        assert_eq!(state.count(Platform::YouTube), 0);
    }

    #[test]
    fn any_live_only_looks_at_one_platform() {
        let state = NotifiedState::new();
        assert_eq!(state.any_live(Platform::Twitch), None);
        state.apply(Platform::YouTube, "g1", "artist", true);
        assert_eq!(state.any_live(Platform::Twitch), None);
        state.apply(Platform::Twitch, "g2", "zed", true);
        state.apply(Platform::Twitch, "g1", "bob", true);
        assert_eq!(state.any_live(Platform::Twitch).as_deref(), Some("bob"));
    }

    #[test]
    fn untracked_entities_are_forgotten() {
        let state = NotifiedState::new();
        state.apply(Platform::Twitch, "g1", "alice", true);
        state.apply(Platform::Twitch, "g1", "carol", true);
        state.retain_tracked(Platform::Twitch, "g1", &["carol".to_string()]);
        assert_eq!(state.live_entities(Platform::Twitch, "g1"), vec!["carol".to_string()]);
        assert_eq!(state.apply(Platform::Twitch, "g1", "alice", true), Transition::Notify);
    }
}
