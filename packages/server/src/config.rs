//! Runtime configuration.

use std::{path::PathBuf, time::Duration};

use crate::infrastructure::message_pusher::HubConfig;

/// Server configuration, built by the binary from CLI flags / environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// Bind port (`0` picks an ephemeral port)
    pub port: u16,
    /// How long an empty room survives before deletion
    pub grace_period: Duration,
    /// Bound of each participant's outbound queue
    pub outbound_capacity: usize,
    /// Bound of the hub command queue
    pub hub_capacity: usize,
    /// Keep-alive ping period (`None` disables pings)
    pub ping_interval: Option<Duration>,
    /// Create unknown rooms on join when the request names a video (`?v=`)
    pub create_on_join: bool,
    /// Front-end directory served with an `index.html` fallback
    pub static_dir: Option<PathBuf>,
    /// Gemini API key for icebreaker generation
    pub gemini_api_key: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            grace_period: Duration::from_secs(300),
            outbound_capacity: 256,
            hub_capacity: 1024,
            ping_interval: Some(Duration::from_secs(30)),
            create_on_join: false,
            static_dir: None,
            gemini_api_key: None,
        }
    }
}

impl ServerConfig {
    /// `host:port`
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn hub_config(&self) -> HubConfig {
        HubConfig {
            grace_period: self.grace_period,
            command_capacity: self.hub_capacity,
        }
    }
}
