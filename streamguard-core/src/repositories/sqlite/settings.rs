// streamguard-core/src/repositories/sqlite/settings.rs
//
// SQLite-backed settings store: per-guild notification destinations in
// `guild_settings` and watched streamers/channels in `tracked_entities`.

use async_trait::async_trait;
use sqlx::{Pool, Row, Sqlite};

use streamguard_common::error::Error;
use streamguard_common::models::guild::GuildConfig;
use streamguard_common::models::platform::Platform;
use streamguard_common::traits::repository_traits::SettingsRepository;

#[derive(Clone)]
pub struct SqliteSettingsRepository {
    pool: Pool<Sqlite>,
}

impl SqliteSettingsRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    fn channel_column(platform: Platform) -> &'static str {
        match platform {
            Platform::Twitch => "twitch_channel_id",
            Platform::YouTube => "youtube_channel_id",
        }
    }

    fn role_column(platform: Platform) -> &'static str {
        match platform {
            Platform::Twitch => "twitch_role_id",
            Platform::YouTube => "youtube_role_id",
        }
    }

    async fn upsert_column(&self, guild_id: &str, column: &'static str, value: Option<&str>) -> Result<(), Error> {
        let q = format!(
            r#"
            INSERT INTO guild_settings (guild_id, {col})
            VALUES (?, ?)
            ON CONFLICT (guild_id)
            DO UPDATE SET {col} = excluded.{col},
                          updated_at = strftime('%Y-%m-%dT%H:%M:%SZ', 'now')
            "#,
            col = column
        );
        sqlx::query(&q)
            .bind(guild_id)
            .bind(value)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl SettingsRepository for SqliteSettingsRepository {
    async fn list_guild_ids(&self) -> Result<Vec<String>, Error> {
        let q = r#"
            SELECT guild_id FROM guild_settings
            UNION
            SELECT guild_id FROM tracked_entities
            ORDER BY guild_id
        "#;
        let rows = sqlx::query(q).fetch_all(&self.pool).await?;

        let mut out = Vec::with_capacity(rows.len());
        for r in rows {
            out.push(r.try_get("guild_id")?);
        }
        Ok(out)
    }

    async fn list_tracked(&self, guild_id: &str, platform: Platform) -> Result<Vec<String>, Error> {
        let q = r#"
            SELECT entity_name
            FROM tracked_entities
            WHERE guild_id = ?
              AND platform = ?
            ORDER BY entity_name
        "#;
        let rows = sqlx::query(q)
            .bind(guild_id)
            .bind(platform.as_str())
            .fetch_all(&self.pool)
            .await?;

        let mut out = Vec::with_capacity(rows.len());
        for r in rows {
            out.push(r.try_get("entity_name")?);
        }
        Ok(out)
    }

    async fn add_tracked(&self, guild_id: &str, platform: Platform, entity_name: &str) -> Result<bool, Error> {
        let name = platform.normalize_entity(entity_name);
        if name.is_empty() {
            return Err(Error::Parse("entity name must not be empty".into()));
        }
        let q = r#"
            INSERT INTO tracked_entities (guild_id, platform, entity_name)
            VALUES (?, ?, ?)
            ON CONFLICT (guild_id, platform, entity_name) DO NOTHING
        "#;
        let res = sqlx::query(q)
            .bind(guild_id)
            .bind(platform.as_str())
            .bind(&name)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn remove_tracked(&self, guild_id: &str, platform: Platform, entity_name: &str) -> Result<bool, Error> {
        let name = platform.normalize_entity(entity_name);
        let q = r#"
            DELETE FROM tracked_entities
            WHERE guild_id = ?
              AND platform = ?
              AND entity_name = ?
        "#;
        let res = sqlx::query(q)
            .bind(guild_id)
            .bind(platform.as_str())
            .bind(&name)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn get_guild_config(&self, guild_id: &str) -> Result<Option<GuildConfig>, Error> {
        let q = r#"
            SELECT guild_id, twitch_channel_id, twitch_role_id, youtube_channel_id, youtube_role_id
            FROM guild_settings
            WHERE guild_id = ?
        "#;
        let row_opt = sqlx::query(q)
            .bind(guild_id)
            .fetch_optional(&self.pool)
            .await?;

        if let Some(r) = row_opt {
            Ok(Some(GuildConfig {
                guild_id:           r.try_get("guild_id")?,
                twitch_channel_id:  r.try_get("twitch_channel_id")?,
                twitch_role_id:     r.try_get("twitch_role_id")?,
                youtube_channel_id: r.try_get("youtube_channel_id")?,
                youtube_role_id:    r.try_get("youtube_role_id")?,
            }))
        } else {
            Ok(None)
        }
    }

    async fn set_notification_channel(
        &self,
        guild_id: &str,
        platform: Platform,
        channel_id: Option<&str>,
    ) -> Result<(), Error> {
        self.upsert_column(guild_id, Self::channel_column(platform), channel_id).await
    }

    async fn set_mention_role(
        &self,
        guild_id: &str,
        platform: Platform,
        role_id: Option<&str>,
    ) -> Result<(), Error> {
        self.upsert_column(guild_id, Self::role_column(platform), role_id).await
    }
}
