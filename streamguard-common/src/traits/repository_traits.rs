use async_trait::async_trait;

use crate::error::Error;
use crate::models::guild::{GuildConfig, NotificationTarget};
use crate::models::platform::Platform;

/// Per-guild configuration and tracked-entity storage.
///
/// The monitors only ever call the read methods; mutations come from the chat
/// command layer.
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Every guild id that has either settings or at least one tracked entity.
    async fn list_guild_ids(&self) -> Result<Vec<String>, Error>;

    async fn list_tracked(&self, guild_id: &str, platform: Platform) -> Result<Vec<String>, Error>;

    /// Returns `false` if the entity was already tracked.
    async fn add_tracked(&self, guild_id: &str, platform: Platform, entity_name: &str) -> Result<bool, Error>;

    /// Returns `false` if the entity was not tracked.
    async fn remove_tracked(&self, guild_id: &str, platform: Platform, entity_name: &str) -> Result<bool, Error>;

    async fn get_guild_config(&self, guild_id: &str) -> Result<Option<GuildConfig>, Error>;

    async fn get_notification_target(
        &self,
        guild_id: &str,
        platform: Platform,
    ) -> Result<Option<NotificationTarget>, Error> {
        Ok(self
            .get_guild_config(guild_id)
            .await?
            .and_then(|cfg| cfg.target_for(platform)))
    }

    async fn set_notification_channel(
        &self,
        guild_id: &str,
        platform: Platform,
        channel_id: Option<&str>,
    ) -> Result<(), Error>;

    async fn set_mention_role(
        &self,
        guild_id: &str,
        platform: Platform,
        role_id: Option<&str>,
    ) -> Result<(), Error>;
}
