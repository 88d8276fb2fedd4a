use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};
use twilight_http::Client as HttpClient;
use twilight_model::id::marker::ChannelMarker;

use streamguard_common::traits::platform_traits::Notifier;

use crate::Error;
use crate::platforms::discord::{parse_snowflake, DISCORD_MAX_MSG_LENGTH};

/// Posts notifications into guild channels through the bot's REST client.
pub struct DiscordNotifier {
    http: Arc<HttpClient>,
}

impl DiscordNotifier {
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }
}

/// Prefixes the role mention (if any) and clamps to Discord's length limit.
pub fn compose_content(message: &str, mention: Option<&str>) -> String {
    let mut content = match mention.map(str::trim).filter(|m| !m.is_empty()) {
        Some(role_id) => format!("<@&{}> {}", role_id, message),
        None => message.to_string(),
    };

    if content.chars().count() > DISCORD_MAX_MSG_LENGTH {
        content = content.chars().take(DISCORD_MAX_MSG_LENGTH - 1).collect();
        content.push('…');
    }
    content
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn send(&self, destination: &str, message: &str, mention: Option<&str>) -> Result<(), Error> {
        let channel_id = parse_snowflake::<ChannelMarker>(destination)
            .map_err(|e| Error::Delivery(e.to_string()))?;
        let content = compose_content(message, mention);

        debug!("Sending notification to channel {}: {}", channel_id, content.chars().take(50).collect::<String>());
        self.http
            .create_message(channel_id)
            .content(&content)
            .await
            .map_err(|e| Error::Delivery(format!("Error sending Discord message to {channel_id}: {e}")))?;

        info!("Notification sent to channel {}", channel_id);
        Ok(())
    }
}
