// File: streamguard-core/src/platforms/discord/mod.rs

pub mod notifier;
pub mod runtime;

use twilight_model::id::Id;

use crate::Error;

pub use notifier::DiscordNotifier;
pub use runtime::DiscordPlatform;

/// Discord rejects messages longer than this.
pub const DISCORD_MAX_MSG_LENGTH: usize = 2000;

/// Parses an opaque id string into a typed snowflake. Zero and non-numeric
/// values are rejected.
pub fn parse_snowflake<T>(raw: &str) -> Result<Id<T>, Error> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .and_then(Id::<T>::new_checked)
        .ok_or_else(|| Error::Parse(format!("Invalid Discord ID: {raw}")))
}
