// File: streamguard-core/src/services/discord/commands.rs
//
// Prefix chat commands (`!help`, `!streamers add alice`, ...). Parsing and
// execution are free of Discord I/O; the gateway runtime turns a
// `CommandReply` into REST calls.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use streamguard_common::models::guild::GuildConfig;
use streamguard_common::models::platform::Platform;
use streamguard_common::traits::repository_traits::SettingsRepository;

use crate::Error;
use twilight_model::id::marker::GenericMarker;

use crate::platforms::discord::parse_snowflake;
use crate::services::discord::lookup::GuildLookup;

pub const DEFAULT_PREFIX: &str = "!";

pub const HELP_COLOR: u32 = 0x738bd7;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    Help(Option<String>),
    Ping,
    SetChannel { platform: Platform, channel_id: Option<String> },
    SetRole { platform: Platform, role_id: Option<String> },
    List,
    Purge(Option<String>),
    Entities { platform: Platform, action: Option<String>, name: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandReply {
    Text(String),
    Embed {
        title: String,
        description: String,
        fields: Vec<(String, String)>,
    },
    /// Delete the last `amount` messages of the channel, then confirm.
    Purge { amount: u16 },
}

/// (name, one-line usage, detailed help)
const COMMAND_HELP: &[(&str, &str, &str)] = &[
    ("ping", "Check the bot's latency. Usage: `!ping`",
     "Simply type `!ping` to see the response time."),
    ("set_role", "Set the role ID to ping when a streamer is live. Usage: `!set_role <role_id>`",
     "Use it like this: `!set_role <role_id>`. Replace `<role_id>` with the actual ID of the role you want to set. To get the role ID head to Advanced settings and turn on Developer Mode. Then right click the role you want use and click Copy Role ID."),
    ("set_channel", "Set the channel ID to post in when a streamer is live. Usage: `!set_channel <channel_id>`",
     "Use it like this: `!set_channel <channel_id>`. Replace `<channel_id>` with the actual ID of the channel you want to set. To get the channel ID head to Advanced settings and turn on Developer Mode. Then right click the channel you want use and click Copy Channel ID."),
    ("list", "List the current role and channel IDs. Usage: `!list`",
     "Just type `!list` to see the current information of role ID and channel ID."),
    ("purge", "Delete a specified number of messages. Usage: `!purge <amount>`",
     "Use it like this: `!purge <amount>`. Replace `<amount>` with the number of messages you want to delete."),
    ("streamers", "Customizable notifier for Twitch streams. Usage: `!streamers <add>, <remove>, or <list>`",
     "Use it like this: `!streamers <add>, <remove>, or <list>`. Replace `<add>` with the Twitch streamer's name you want to add, `<remove>` with the Twitch streamer's name you want to remove, or `<list>` to see the current list of streamers."),
    ("youtube", "Notifier for YouTube releases. Usage: `!youtube <add>, <remove>, or <list>`",
     "Use it like this: `!youtube add <channel>`, `!youtube remove <channel>` or `!youtube list`. `<channel>` is the YouTube handle, with or without the leading `@`."),
    ("set_youtube_channel", "Set the channel ID to post YouTube releases in. Usage: `!set_youtube_channel <channel_id>`",
     "Use it like this: `!set_youtube_channel <channel_id>`. Works like `!set_channel`, but for YouTube release notifications."),
    ("set_youtube_role", "Set the role ID to ping for YouTube releases. Usage: `!set_youtube_role <role_id>`",
     "Use it like this: `!set_youtube_role <role_id>`. Works like `!set_role`, but for YouTube release notifications."),
];

/// Parses a chat message into a command, or `None` if it is not one of ours.
pub fn parse_command(prefix: &str, content: &str) -> Option<BotCommand> {
    let rest = content.trim().strip_prefix(prefix)?;
    let mut parts = rest.split_whitespace();
    let name = parts.next()?.to_lowercase();
    let arg1 = parts.next().map(str::to_string);
    let arg2 = parts.next().map(str::to_string);

    let cmd = match name.as_str() {
        "help" => BotCommand::Help(arg1),
        "ping" => BotCommand::Ping,
        "set_channel" => BotCommand::SetChannel { platform: Platform::Twitch, channel_id: arg1 },
        "set_role" => BotCommand::SetRole { platform: Platform::Twitch, role_id: arg1 },
        "set_youtube_channel" => BotCommand::SetChannel { platform: Platform::YouTube, channel_id: arg1 },
        "set_youtube_role" => BotCommand::SetRole { platform: Platform::YouTube, role_id: arg1 },
        "list" => BotCommand::List,
        "purge" => BotCommand::Purge(arg1),
        "streamers" => BotCommand::Entities { platform: Platform::Twitch, action: arg1, name: arg2 },
        "youtube" => BotCommand::Entities { platform: Platform::YouTube, action: arg1, name: arg2 },
        _ => return None,
    };
    Some(cmd)
}

fn entity_noun(platform: Platform) -> (&'static str, &'static str) {
    match platform {
        Platform::Twitch => ("streamer", "Streamers"),
        Platform::YouTube => ("YouTube channel", "YouTube Channels"),
    }
}

pub struct CommandService {
    settings: Arc<dyn SettingsRepository + Send + Sync>,
    prefix: String,
}

impl CommandService {
    pub fn new(settings: Arc<dyn SettingsRepository + Send + Sync>, prefix: &str) -> Self {
        Self {
            settings,
            prefix: prefix.to_string(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn parse(&self, content: &str) -> Option<BotCommand> {
        parse_command(&self.prefix, content)
    }

    /// Runs `cmd` for `guild_id` and returns what to answer.
    pub async fn execute(
        &self,
        guild_id: &str,
        cmd: BotCommand,
        lookup: &dyn GuildLookup,
        latency: Option<Duration>,
    ) -> Result<CommandReply, Error> {
        debug!("Executing {:?} for guild {}", cmd, guild_id);
        match cmd {
            BotCommand::Help(None) => Ok(self.help_overview()),
            BotCommand::Help(Some(name)) => Ok(self.help_detail(&name)),
            BotCommand::Ping => Ok(CommandReply::Text(match latency {
                Some(l) => format!("Pong! Latency: {}ms", l.as_millis()),
                None => "Pong!".to_string(),
            })),
            BotCommand::SetChannel { platform, channel_id } => {
                self.set_channel(guild_id, platform, channel_id, lookup).await
            }
            BotCommand::SetRole { platform, role_id } => {
                self.set_role(guild_id, platform, role_id, lookup).await
            }
            BotCommand::List => self.list(guild_id, lookup).await,
            BotCommand::Purge(amount) => Ok(Self::purge(amount)),
            BotCommand::Entities { platform, action, name } => {
                self.entities(guild_id, platform, action, name).await
            }
        }
    }

    fn help_overview(&self) -> CommandReply {
        CommandReply::Embed {
            title: "StreamGuard's Discord Bot Commands".to_string(),
            description: format!("Use the `{}` prefix to execute these commands.", self.prefix),
            fields: COMMAND_HELP
                .iter()
                .map(|(name, usage, _)| (name.to_string(), usage.to_string()))
                .collect(),
        }
    }

    fn help_detail(&self, name: &str) -> CommandReply {
        let name = name.trim_start_matches(self.prefix.as_str()).to_lowercase();
        match COMMAND_HELP.iter().find(|(n, _, _)| *n == name) {
            Some((n, _, detail)) => CommandReply::Embed {
                title: format!("Help for `{}`", n),
                description: detail.to_string(),
                fields: Vec::new(),
            },
            None => CommandReply::Text(format!("❌ Command `{}` not found.", name)),
        }
    }

    async fn set_channel(
        &self,
        guild_id: &str,
        platform: Platform,
        channel_id: Option<String>,
        lookup: &dyn GuildLookup,
    ) -> Result<CommandReply, Error> {
        let Some(channel_id) = channel_id.filter(|c| parse_snowflake::<GenericMarker>(c).is_ok()) else {
            return Ok(CommandReply::Text("❌ You must provide a valid channel ID.".into()));
        };

        self.settings
            .set_notification_channel(guild_id, platform, Some(&channel_id))
            .await?;
        info!("Guild {} set {} notification channel to {}", guild_id, platform, channel_id);

        Ok(CommandReply::Text(match lookup.channel_name(&channel_id) {
            Some(name) => format!("✅ Channel updated to: `{}` (ID: `{}`)", name, channel_id),
            None => format!("❌ Channel with ID `{}` not found.", channel_id),
        }))
    }

    async fn set_role(
        &self,
        guild_id: &str,
        platform: Platform,
        role_id: Option<String>,
        lookup: &dyn GuildLookup,
    ) -> Result<CommandReply, Error> {
        let Some(role_id) = role_id.filter(|r| parse_snowflake::<GenericMarker>(r).is_ok()) else {
            return Ok(CommandReply::Text("❌ You must provide a valid role ID.".into()));
        };

        self.settings
            .set_mention_role(guild_id, platform, Some(&role_id))
            .await?;
        info!("Guild {} set {} mention role to {}", guild_id, platform, role_id);

        Ok(CommandReply::Text(match lookup.role_name(&role_id) {
            Some(name) => format!("✅ Role updated to: `{}` (ID: `{}`)", name, role_id),
            None => format!("❌ Role with ID `{}` not found.", role_id),
        }))
    }

    async fn list(&self, guild_id: &str, lookup: &dyn GuildLookup) -> Result<CommandReply, Error> {
        let cfg = self
            .settings
            .get_guild_config(guild_id)
            .await?
            .unwrap_or_else(|| GuildConfig {
                guild_id: guild_id.to_string(),
                ..Default::default()
            });

        let describe = |label: &str, id: Option<&str>, name: Option<String>| -> String {
            let name = name.unwrap_or_else(|| "None".to_string());
            format!("{}: `{}` (ID: `{}`)", label, name, id.unwrap_or("None"))
        };

        let mut lines = vec!["**Current Settings**".to_string()];
        for platform in Platform::ALL {
            let role = cfg.role_for(platform);
            let channel = cfg.channel_for(platform);
            let prefix = match platform {
                Platform::Twitch => "",
                Platform::YouTube => "YouTube ",
            };
            lines.push(describe(
                &format!("{}Role", prefix),
                role,
                role.and_then(|r| lookup.role_name(r)),
            ));
            lines.push(describe(
                &format!("{}Channel", prefix),
                channel,
                channel.and_then(|c| lookup.channel_name(c)),
            ));
        }
        Ok(CommandReply::Text(lines.join("\n")))
    }

    fn purge(amount: Option<String>) -> CommandReply {
        match amount.and_then(|a| a.parse::<i64>().ok()) {
            Some(n) if n > u16::MAX as i64 => {
                CommandReply::Text(format!("❌ I can delete at most {} messages at once.", u16::MAX))
            }
            Some(n) if n >= 1 => CommandReply::Purge { amount: n as u16 },
            _ => CommandReply::Text("❌ You must specify a positive number of messages to delete.".into()),
        }
    }

    async fn entities(
        &self,
        guild_id: &str,
        platform: Platform,
        action: Option<String>,
        name: Option<String>,
    ) -> Result<CommandReply, Error> {
        let (noun, plural) = entity_noun(platform);
        let Some(action) = action.map(|a| a.to_lowercase()) else {
            return Ok(CommandReply::Text(
                "❌ You must specify an action: `add`, `remove`, or `list`.".into(),
            ));
        };

        let reply = match (action.as_str(), name) {
            ("add", Some(name)) => {
                let normalized = platform.normalize_entity(&name);
                if normalized.is_empty() {
                    format!("❌ Invalid {} name.", noun)
                } else if self.settings.add_tracked(guild_id, platform, &normalized).await? {
                    info!("Guild {} now tracks {} '{}'", guild_id, platform, normalized);
                    format!("✅ Added `{}` to the monitoring list.", normalized)
                } else {
                    format!("ℹ️ `{}` is already in the monitoring list.", normalized)
                }
            }
            ("remove", Some(name)) => {
                let normalized = platform.normalize_entity(&name);
                if self.settings.remove_tracked(guild_id, platform, &normalized).await? {
                    info!("Guild {} stopped tracking {} '{}'", guild_id, platform, normalized);
                    format!("✅ Removed `{}` from the monitoring list.", normalized)
                } else {
                    format!("❌ `{}` is not in the monitoring list.", normalized)
                }
            }
            ("list", _) => {
                let tracked = self.settings.list_tracked(guild_id, platform).await?;
                if tracked.is_empty() {
                    "❌ The monitoring list is currently empty.".to_string()
                } else {
                    format!("**Current {} in Monitoring List:**\n{}", plural, tracked.join("\n"))
                }
            }
            _ => format!(
                "❌ Invalid action or missing {} name. Use `add`, `remove`, or `list`.",
                noun
            ),
        };
        Ok(CommandReply::Text(reply))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_commands() {
        assert_eq!(parse_command("!", "!ping"), Some(BotCommand::Ping));
        assert_eq!(parse_command("!", "  !HELP purge "), Some(BotCommand::Help(Some("purge".into()))));
        assert_eq!(
            parse_command("!", "!streamers add Alice"),
            Some(BotCommand::Entities {
                platform: Platform::Twitch,
                action: Some("add".into()),
                name: Some("Alice".into()),
            })
        );
        assert_eq!(
            parse_command("!", "!set_youtube_channel 42"),
            Some(BotCommand::SetChannel { platform: Platform::YouTube, channel_id: Some("42".into()) })
        );
        assert_eq!(parse_command("!", "!purge"), Some(BotCommand::Purge(None)));
    }

    #[test]
    fn ignores_other_messages() {
        assert_eq!(parse_command("!", "hello there"), None);
        assert_eq!(parse_command("!", "!"), None);
        assert_eq!(parse_command("!", "!dance"), None);
        assert_eq!(parse_command("?", "!ping"), None);
    }

    #[test]
    fn purge_amount_is_validated() {
        assert_eq!(CommandService::purge(Some("5".into())), CommandReply::Purge { amount: 5 });
        assert_eq!(CommandService::purge(Some("500".into())), CommandReply::Purge { amount: 500 });
        assert!(matches!(CommandService::purge(Some("70000".into())), CommandReply::Text(t) if t.contains("at most")));
        assert!(matches!(CommandService::purge(Some("0".into())), CommandReply::Text(_)));
        assert!(matches!(CommandService::purge(Some("abc".into())), CommandReply::Text(_)));
        assert!(matches!(CommandService::purge(None), CommandReply::Text(_)));
    }
}
