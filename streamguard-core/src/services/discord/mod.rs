pub mod commands;
pub mod lookup;

pub use commands::{parse_command, BotCommand, CommandReply, CommandService};
pub use lookup::{CacheLookup, GuildLookup};
