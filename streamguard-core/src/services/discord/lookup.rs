use std::collections::HashMap;

use twilight_cache_inmemory::InMemoryCache;
use twilight_model::id::marker::{ChannelMarker, RoleMarker};

use crate::platforms::discord::parse_snowflake;

/// Resolves ids to human-readable names for command replies.
pub trait GuildLookup: Send + Sync {
    fn role_name(&self, role_id: &str) -> Option<String>;
    fn channel_name(&self, channel_id: &str) -> Option<String>;
}

/// Lookup backed by the gateway's in-memory cache.
pub struct CacheLookup<'a> {
    cache: &'a InMemoryCache,
}

impl<'a> CacheLookup<'a> {
    pub fn new(cache: &'a InMemoryCache) -> Self {
        Self { cache }
    }
}

impl GuildLookup for CacheLookup<'_> {
    fn role_name(&self, role_id: &str) -> Option<String> {
        let id = parse_snowflake::<RoleMarker>(role_id).ok()?;
        self.cache.role(id).map(|r| r.resource().name.clone())
    }

    fn channel_name(&self, channel_id: &str) -> Option<String> {
        let id = parse_snowflake::<ChannelMarker>(channel_id).ok()?;
        self.cache.channel(id).and_then(|c| c.name.clone())
    }
}

/// Fixed name tables, handy when no gateway cache is around.
#[derive(Debug, Default, Clone)]
pub struct StaticLookup {
    pub roles: HashMap<String, String>,
    pub channels: HashMap<String, String>,
}

impl GuildLookup for StaticLookup {
    fn role_name(&self, role_id: &str) -> Option<String> {
        self.roles.get(role_id).cloned()
    }

    fn channel_name(&self, channel_id: &str) -> Option<String> {
        self.channels.get(channel_id).cloned()
    }
}
