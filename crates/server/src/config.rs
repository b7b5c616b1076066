use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server bind address
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum request body size in KB
    #[serde(default = "default_max_body_size_kb")]
    pub max_body_size_kb: usize,

    /// Messages longer than this (in chars) are rejected with 400
    #[serde(default = "default_max_message_chars")]
    pub max_message_chars: usize,

    /// Turns kept per conversation, counted as user message plus reply pairs;
    /// oldest exchanges are dropped first
    #[serde(default = "default_max_history")]
    pub max_history_per_conversation: usize,

    /// Live conversation ids; the least recently active one is evicted beyond this
    #[serde(default = "default_max_conversations")]
    pub max_conversations: usize,

    /// Pipeline YAML (embedder, index artifact, generator, knowledge base).
    /// Built-in defaults when unset.
    #[serde(default)]
    pub pipeline_config: Option<PathBuf>,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            timeout_secs: default_timeout_secs(),
            max_body_size_kb: default_max_body_size_kb(),
            max_message_chars: default_max_message_chars(),
            max_history_per_conversation: default_max_history(),
            max_conversations: default_max_conversations(),
            pipeline_config: None,
            enable_cors: default_true(),
            log_level: default_log_level(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from `.env`, an optional `server.{toml,yaml}` file and
    /// `MEDCHAT_SERVER__*` environment variables, in increasing precedence.
    pub fn load() -> anyhow::Result<Self> {
        let _ = dotenvy::dotenv();

        let builder = config::Config::builder()
            .add_source(config::File::with_name("server").required(false))
            .add_source(config::Environment::with_prefix("MEDCHAT_SERVER").separator("__"));

        let config: ServerConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_message_chars == 0 {
            anyhow::bail!("max_message_chars must be positive");
        }
        if self.max_history_per_conversation == 0 || self.max_history_per_conversation % 2 != 0 {
            anyhow::bail!("max_history_per_conversation must be a positive even number");
        }
        if self.max_conversations == 0 {
            anyhow::bail!("max_conversations must be positive");
        }
        if self.timeout_secs == 0 {
            anyhow::bail!("timeout_secs must be positive");
        }
        Ok(())
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.bind_addr, self.port);
        Ok(addr_str.parse()?)
    }

    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get max body size in bytes
    pub fn max_body_size(&self) -> usize {
        self.max_body_size_kb * 1024
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8082
}

// Longer than the generation timeout so a slow model surfaces as an apology, not a 408.
fn default_timeout_secs() -> u64 {
    90
}

fn default_max_body_size_kb() -> usize {
    64
}

fn default_max_message_chars() -> usize {
    2000
}

fn default_max_history() -> usize {
    100
}

fn default_max_conversations() -> usize {
    10_000
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}
