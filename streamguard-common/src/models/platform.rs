// File: streamguard-common/src/models/platform.rs

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};

/// A platform the bot polls for live / release events.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Twitch,
    YouTube,
}

impl Platform {
    pub const ALL: [Platform; 2] = [Platform::Twitch, Platform::YouTube];

    /// The text form stored in the `tracked_entities.platform` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Twitch => "twitch",
            Platform::YouTube => "youtube",
        }
    }

    /// Human-facing name, used in notification text and logs.
    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Twitch => "Twitch",
            Platform::YouTube => "YouTube",
        }
    }

    /// Normalizes a user-supplied streamer / channel name.
    ///
    /// Twitch logins and YouTube handles are case-insensitive, and users often
    /// paste handles with a leading `@`.
    pub fn normalize_entity(&self, raw: &str) -> String {
        raw.trim().trim_start_matches('@').to_lowercase()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "twitch" => Ok(Platform::Twitch),
            "youtube" => Ok(Platform::YouTube),
            _ => Err(format!("Unknown platform: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_text_form() {
        assert_eq!("Twitch".parse::<Platform>().unwrap(), Platform::Twitch);
        assert_eq!("youtube".parse::<Platform>().unwrap(), Platform::YouTube);
        assert!("vrchat".parse::<Platform>().is_err());
    }

    #[test]
    fn normalizes_handles() {
        assert_eq!(Platform::YouTube.normalize_entity("  @SomeArtist "), "someartist");
        assert_eq!(Platform::Twitch.normalize_entity("Alice"), "alice");
    }
}
