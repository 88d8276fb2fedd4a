// File: streamguard-common/src/models/observation.rs
//
// What a status client saw for one entity during one tick. Never persisted.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    /// Entity is live (Twitch) or has releases to announce (YouTube).
    Live(LiveStatus),
    Offline,
}

impl Observation {
    pub fn is_live(&self) -> bool {
        matches!(self, Observation::Live(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LiveStatus {
    pub display_name: String,
    pub title: Option<String>,
    pub category: Option<String>,
    /// Canonical link to the live content or channel.
    pub url: String,
    /// Newest items first; only filled for release-style platforms.
    pub items: Vec<ReleaseItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseItem {
    pub title: String,
    pub url: String,
}
