use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

use twilight_cache_inmemory::{InMemoryCache, ResourceType};
use twilight_gateway::{
    self as gateway,
    CloseFrame,
    Config,
    Event,
    EventTypeFlags,
    Intents,
    MessageSender,
    Shard,
    StreamExt,
};
use twilight_http::Client as HttpClient;
use twilight_http::client::ClientBuilder;
use twilight_model::gateway::payload::incoming::{MessageCreate, Ready as ReadyPayload};
use twilight_model::guild::Permissions;
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, GuildMarker, MessageMarker};
use twilight_util::builder::embed::{EmbedBuilder, EmbedFieldBuilder};

use crate::Error;
use crate::platforms::ConnectionStatus;
use crate::services::discord::commands::{BotCommand, CommandReply, CommandService, HELP_COLOR};
use crate::services::discord::lookup::CacheLookup;

/// How long the purge confirmation stays in the channel.
const PURGE_CONFIRMATION_TTL: Duration = Duration::from_secs(5);

/// Discord lists and bulk-deletes at most this many messages per request.
const PURGE_BATCH: u16 = 100;

/// Everything a shard needs to answer chat commands.
#[derive(Clone)]
struct ShardContext {
    http: Arc<HttpClient>,
    cache: Arc<InMemoryCache>,
    commands: Arc<CommandService>,
}

/// Reads gateway events for one shard:
///   - keeps the in-memory cache current
///   - hands prefix commands from guild channels to their own task
async fn shard_runner(mut shard: Shard, ctx: ShardContext) {
    let shard_id = shard.id().number();
    info!("(ShardRunner) Shard {shard_id} started. Listening for events.");

    while let Some(item) = shard.next_event(EventTypeFlags::all()).await {
        let event = match item {
            Ok(event) => event,
            Err(err) => {
                error!("Shard {shard_id} => error receiving event: {err:?}");
                continue;
            }
        };
        ctx.cache.update(&event);

        match event {
            Event::Ready(ready) => {
                let data: &ReadyPayload = ready.as_ref();
                info!(
                    "Shard {shard_id} => READY as {} (ID={}) in {} guild(s)",
                    data.user.name,
                    data.user.id,
                    data.guilds.len()
                );
            }
            Event::MessageCreate(msg) => {
                if msg.author.bot || msg.guild_id.is_none() {
                    continue;
                }
                let Some(cmd) = ctx.commands.parse(&msg.content) else {
                    continue;
                };
                let latency = shard.latency().average();
                let ctx = ctx.clone();
                tokio::spawn(async move {
                    handle_command(ctx, *msg, cmd, latency).await;
                });
            }
            other => {
                trace!("Shard {shard_id} => unhandled event: {:?}", other.kind());
            }
        }
    }

    warn!("(ShardRunner) Shard {shard_id} event loop ended.");
}

async fn handle_command(ctx: ShardContext, msg: MessageCreate, cmd: BotCommand, latency: Option<Duration>) {
    let Some(guild_id) = msg.guild_id else { return };
    let channel_id = msg.channel_id;
    debug!("Command {:?} from {} in guild {}", cmd, msg.author.name, guild_id);

    if matches!(cmd, BotCommand::Purge(_)) && !can_manage_messages(&ctx.cache, guild_id, &msg) {
        reply_text(&ctx.http, channel_id, "❌ You do not have permission to use this command.").await;
        return;
    }

    let lookup = CacheLookup::new(&ctx.cache);
    let reply = match ctx
        .commands
        .execute(&guild_id.to_string(), cmd, &lookup, latency)
        .await
    {
        Ok(reply) => reply,
        Err(e) => {
            error!("Command failed in guild {}: {}", guild_id, e);
            CommandReply::Text("❌ Something went wrong while running that command.".into())
        }
    };

    match reply {
        CommandReply::Text(text) => reply_text(&ctx.http, channel_id, &text).await,
        CommandReply::Embed { title, description, fields } => {
            let embed = fields
                .into_iter()
                .fold(
                    EmbedBuilder::new().title(title).description(description).color(HELP_COLOR),
                    |builder, (name, value)| builder.field(EmbedFieldBuilder::new(name, value)),
                )
                .build();
            if let Err(e) = ctx.http.create_message(channel_id).embeds(&[embed]).await {
                error!("Failed to send embed to {}: {}", channel_id, e);
            }
        }
        CommandReply::Purge { amount } => {
            match purge_messages(&ctx.http, channel_id, amount).await {
                Ok(deleted) => {
                    info!("Purged {} message(s) in channel {}", deleted, channel_id);
                    send_ephemeral(&ctx.http, channel_id, &format!("✅ Deleted {} message(s).", deleted)).await;
                }
                Err(e) => error!("Purge failed in channel {}: {}", channel_id, e),
            }
        }
    }
}

/// Guild owner, administrators and anyone whose roles grant MANAGE_MESSAGES.
fn can_manage_messages(cache: &InMemoryCache, guild_id: Id<GuildMarker>, msg: &MessageCreate) -> bool {
    if cache
        .guild(guild_id)
        .is_some_and(|g| g.owner_id() == msg.author.id)
    {
        return true;
    }

    let everyone = guild_id.cast();
    let role_ids = msg
        .member
        .as_ref()
        .map(|m| m.roles.clone())
        .unwrap_or_default();

    let granted = std::iter::once(everyone)
        .chain(role_ids)
        .filter_map(|id| cache.role(id).map(|r| r.resource().permissions))
        .fold(Permissions::empty(), |acc, p| acc | p);

    granted.contains(Permissions::ADMINISTRATOR) || granted.contains(Permissions::MANAGE_MESSAGES)
}

/// Sizes of the batches needed to delete `amount` messages.
fn purge_batches(amount: u16) -> Vec<u16> {
    let mut batches = Vec::new();
    let mut remaining = amount;
    while remaining > 0 {
        let batch = remaining.min(PURGE_BATCH);
        batches.push(batch);
        remaining -= batch;
    }
    batches
}

/// Deletes the newest `amount` messages (the command message included),
/// walking back through the channel one batch at a time.
async fn purge_messages(http: &HttpClient, channel_id: Id<ChannelMarker>, amount: u16) -> Result<usize, Error> {
    let mut deleted = 0;
    let mut before: Option<Id<MessageMarker>> = None;

    for batch in purge_batches(amount) {
        let listed = match before {
            Some(oldest) => http.channel_messages(channel_id).before(oldest).limit(batch).await,
            None => http.channel_messages(channel_id).limit(batch).await,
        };
        let messages = listed
            .map_err(|e| Error::Platform(format!("Error listing messages: {e}")))?
            .models()
            .await
            .map_err(|e| Error::Platform(format!("Error decoding messages: {e}")))?;

        let ids: Vec<Id<MessageMarker>> = messages.iter().map(|m| m.id).collect();
        deleted += delete_batch(http, channel_id, &ids).await?;

        if ids.len() < batch as usize {
            break;
        }
        before = ids.last().copied();
    }

    Ok(deleted)
}

async fn delete_batch(http: &HttpClient, channel_id: Id<ChannelMarker>, ids: &[Id<MessageMarker>]) -> Result<usize, Error> {
    match ids {
        [] => Ok(0),
        [single] => {
            http.delete_message(channel_id, *single)
                .await
                .map_err(|e| Error::Platform(format!("Error deleting message: {e}")))?;
            Ok(1)
        }
        many => {
            if let Err(e) = http.delete_messages(channel_id, many).await {
                // Bulk delete refuses messages older than two weeks.
                warn!("Bulk delete failed ({}), deleting one by one", e);
                let mut deleted = 0;
                for id in many {
                    if http.delete_message(channel_id, *id).await.is_ok() {
                        deleted += 1;
                    }
                }
                return Ok(deleted);
            }
            Ok(many.len())
        }
    }
}

async fn reply_text(http: &HttpClient, channel_id: Id<ChannelMarker>, text: &str) {
    if let Err(e) = http.create_message(channel_id).content(text).await {
        error!("Failed to reply in {}: {}", channel_id, e);
    }
}

/// Sends `text` and removes it again after a few seconds.
async fn send_ephemeral(http: &Arc<HttpClient>, channel_id: Id<ChannelMarker>, text: &str) {
    let sent = match http.create_message(channel_id).content(text).await {
        Ok(resp) => resp.model().await,
        Err(e) => {
            error!("Failed to reply in {}: {}", channel_id, e);
            return;
        }
    };
    let Ok(message) = sent else { return };

    let http = http.clone();
    tokio::spawn(async move {
        tokio::time::sleep(PURGE_CONFIRMATION_TTL).await;
        if let Err(e) = http.delete_message(channel_id, message.id).await {
            debug!("Could not delete confirmation {}: {}", message.id, e);
        }
    });
}

/// Gateway connection plus the REST client and cache shared with the rest of
/// the bot.
pub struct DiscordPlatform {
    token: String,
    pub connection_status: ConnectionStatus,

    pub shard_tasks: Vec<JoinHandle<()>>,
    pub shard_senders: Vec<MessageSender>,

    http: Arc<HttpClient>,
    cache: Arc<InMemoryCache>,
}

impl DiscordPlatform {
    pub fn new(token: String) -> Self {
        let http = Arc::new(
            ClientBuilder::new()
                .token(token.clone())
                .timeout(Duration::from_secs(30))
                .build(),
        );
        let cache = Arc::new(
            InMemoryCache::builder()
                .resource_types(ResourceType::GUILD | ResourceType::CHANNEL | ResourceType::ROLE)
                .build(),
        );

        Self {
            token,
            connection_status: ConnectionStatus::Disconnected,
            shard_tasks: Vec::new(),
            shard_senders: Vec::new(),
            http,
            cache,
        }
    }

    pub fn http(&self) -> Arc<HttpClient> {
        self.http.clone()
    }

    pub fn cache(&self) -> Arc<InMemoryCache> {
        self.cache.clone()
    }

    /// Handles for sending gateway commands (presence updates) to each shard.
    pub fn senders(&self) -> Vec<MessageSender> {
        self.shard_senders.clone()
    }

    pub async fn connect(&mut self, commands: Arc<CommandService>) -> Result<(), Error> {
        if matches!(self.connection_status, ConnectionStatus::Connected) {
            info!("(DiscordPlatform) Already connected => skipping");
            return Ok(());
        }
        if self.token.trim().is_empty() {
            return Err(Error::Credential("Discord token is empty".into()));
        }
        self.connection_status = ConnectionStatus::Connecting;

        let config = Config::new(
            self.token.clone(),
            Intents::GUILDS | Intents::GUILD_MESSAGES | Intents::MESSAGE_CONTENT,
        );

        let shards = gateway::create_recommended(&self.http, config, |_, b| b.build())
            .await
            .map_err(|e| {
                self.connection_status = ConnectionStatus::Error(e.to_string());
                Error::Platform(format!("create_recommended error: {e}"))
            })?;

        let ctx = ShardContext {
            http: self.http.clone(),
            cache: self.cache.clone(),
            commands,
        };

        for shard in shards {
            self.shard_senders.push(shard.sender());
            let ctx = ctx.clone();
            self.shard_tasks.push(tokio::spawn(shard_runner(shard, ctx)));
        }

        self.connection_status = ConnectionStatus::Connected;
        info!("(DiscordPlatform) Connected with {} shard(s)", self.shard_tasks.len());
        Ok(())
    }

    pub async fn disconnect(&mut self) -> Result<(), Error> {
        self.connection_status = ConnectionStatus::Disconnected;

        for sender in &self.shard_senders {
            let _ = sender.close(CloseFrame::NORMAL);
        }
        for task in &mut self.shard_tasks {
            let _ = task.await;
        }

        self.shard_senders.clear();
        self.shard_tasks.clear();
        info!("(DiscordPlatform) Disconnected");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn purge_is_split_into_batches_of_one_hundred() {
        assert_eq!(purge_batches(5), vec![5]);
        assert_eq!(purge_batches(100), vec![100]);
        assert_eq!(purge_batches(250), vec![100, 100, 50]);
        assert_eq!(purge_batches(500), vec![100; 5]);
        assert!(purge_batches(0).is_empty());
    }
}
