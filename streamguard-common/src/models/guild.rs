use serde::{Deserialize, Serialize};

use crate::models::platform::Platform;

/// One row of `guild_settings`. Every id is an opaque Discord snowflake string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildConfig {
    pub guild_id: String,
    pub twitch_channel_id: Option<String>,
    pub twitch_role_id: Option<String>,
    pub youtube_channel_id: Option<String>,
    pub youtube_role_id: Option<String>,
}

impl GuildConfig {
    pub fn channel_for(&self, platform: Platform) -> Option<&str> {
        match platform {
            Platform::Twitch => self.twitch_channel_id.as_deref(),
            Platform::YouTube => self.youtube_channel_id.as_deref(),
        }
    }

    pub fn role_for(&self, platform: Platform) -> Option<&str> {
        match platform {
            Platform::Twitch => self.twitch_role_id.as_deref(),
            Platform::YouTube => self.youtube_role_id.as_deref(),
        }
    }

    /// Where notifications for `platform` go, or `None` when they are disabled.
    pub fn target_for(&self, platform: Platform) -> Option<NotificationTarget> {
        let channel_id = self.channel_for(platform)?.trim();
        if channel_id.is_empty() {
            return None;
        }
        Some(NotificationTarget {
            channel_id: channel_id.to_string(),
            role_id: self
                .role_for(platform)
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(str::to_string),
        })
    }
}

/// Destination of a notification: a channel plus an optional role to mention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationTarget {
    pub channel_id: String,
    pub role_id: Option<String>,
}
