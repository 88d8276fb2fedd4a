use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

mod server;

#[derive(Parser, Debug, Clone)]
#[command(name = "streamguard")]
#[command(author, version, about = "StreamGuard - Discord bot announcing Twitch streams and YouTube releases")]
pub struct Args {
    /// Discord bot token.
    #[arg(long, env = "DISCORD_BOT_TOKEN", hide_env_values = true)]
    pub discord_token: String,

    /// Twitch application client id.
    #[arg(long, env = "CLIENT_ID")]
    pub twitch_client_id: Option<String>,

    /// Twitch application client secret.
    #[arg(long, env = "CLIENT_SECRET", hide_env_values = true)]
    pub twitch_client_secret: Option<String>,

    /// Port of the health endpoint.
    #[arg(long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// SQLite database file, or ":memory:".
    #[arg(long, env = "DATABASE_PATH", default_value = "streamguard.db")]
    pub database_path: String,

    /// Seconds between two polls of each platform.
    #[arg(long, env = "POLL_INTERVAL_SECS", default_value_t = 60)]
    pub poll_interval_secs: u64,

    /// Prefix for chat commands.
    #[arg(long, default_value = "!")]
    pub prefix: String,
}

fn init_tracing() {
    let filter = EnvFilter::from_default_env()
        .add_directive("streamguard=info".parse().unwrap_or_default());
    let sub = fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(sub)
        .expect("Failed to set global subscriber");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();
    let args = Args::parse();
    info!(
        "StreamGuard starting. db={}, port={}, poll_interval={}s",
        args.database_path, args.port, args.poll_interval_secs
    );

    if let Err(e) = server::run_server(args).await {
        error!("Server error: {:?}", e);
        return Err(e);
    }
    info!("Main finished. Goodbye!");
    Ok(())
}
