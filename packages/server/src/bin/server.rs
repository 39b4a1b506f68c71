//! Watch party server.
//!
//! Creates rooms for YouTube videos and keeps everyone in a room on the same
//! playback position over WebSocket.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin sajiki-server
//! cargo run --bin sajiki-server -- --host 0.0.0.0 --port 3000 --static-dir ./frontend
//! ```

use std::{path::PathBuf, sync::Arc, time::Duration};

use clap::Parser;
use sajiki_server::{
    ServerConfig,
    infrastructure::external::{GeminiPromptGenerator, YouTubeTitleLookup},
    ui::Server,
};
use sajiki_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "sajiki-server")]
#[command(about = "Watch party server with synchronized playback", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "PORT", default_value = "8080")]
    port: u16,

    /// Seconds an empty room is kept before it is deleted
    #[arg(long, env = "SAJIKI_GRACE_PERIOD_SECS", default_value = "300")]
    grace_period_secs: u64,

    /// Outbound queue size per participant; slower clients are disconnected
    #[arg(long, env = "SAJIKI_OUTBOUND_CAPACITY", default_value = "256")]
    outbound_capacity: usize,

    /// Hub command queue size
    #[arg(long, env = "SAJIKI_HUB_CAPACITY", default_value = "1024")]
    hub_capacity: usize,

    /// Keep-alive ping interval in seconds (0 disables)
    #[arg(long, env = "SAJIKI_PING_INTERVAL_SECS", default_value = "30")]
    ping_interval_secs: u64,

    /// Create unknown rooms on join when the client passes `?v=<videoId>`
    #[arg(long, env = "SAJIKI_CREATE_ON_JOIN")]
    create_on_join: bool,

    /// Directory with the front-end (served with an index.html fallback)
    #[arg(long, env = "SAJIKI_STATIC_DIR")]
    static_dir: Option<PathBuf>,

    /// Gemini API key used to generate icebreakers
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    gemini_api_key: Option<String>,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            grace_period: Duration::from_secs(args.grace_period_secs),
            outbound_capacity: args.outbound_capacity,
            hub_capacity: args.hub_capacity,
            ping_interval: (args.ping_interval_secs > 0)
                .then(|| Duration::from_secs(args.ping_interval_secs)),
            create_on_join: args.create_on_join,
            static_dir: args.static_dir,
            gemini_api_key: args.gemini_api_key,
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let config = ServerConfig::from(Args::parse());
    if config.gemini_api_key.is_none() {
        tracing::warn!("GEMINI_API_KEY is not set; rooms will use the default icebreakers");
    }

    // External collaborators
    let title_lookup = Arc::new(YouTubeTitleLookup::new());
    let prompt_generator = Arc::new(GeminiPromptGenerator::new(config.gemini_api_key.clone()));

    let server = Server::new(config, title_lookup, prompt_generator);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
