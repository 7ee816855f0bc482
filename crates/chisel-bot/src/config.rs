use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct BotConfig {
    #[serde(default = "default_server_host")]
    pub server_host: String,
    #[serde(default = "default_server_port")]
    pub server_port: u16,
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default = "default_protocol_version")]
    pub protocol_version: u32,
    /// Frame size ceiling during handshake/login.
    #[serde(default = "default_packet_threshold")]
    pub packet_threshold: usize,
    /// Frame size ceiling once in play state (chunk data gets big).
    #[serde(default = "default_play_packet_threshold")]
    pub play_packet_threshold: usize,
}

fn default_server_host() -> String {
    "localhost".into()
}

fn default_server_port() -> u16 {
    25565
}

fn default_username() -> String {
    "chisel".into()
}

fn default_protocol_version() -> u32 {
    47
}

fn default_packet_threshold() -> usize {
    chisel_protocol_core::DEFAULT_PACKET_THRESHOLD
}

fn default_play_packet_threshold() -> usize {
    2 * 1024 * 1024
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            server_host: default_server_host(),
            server_port: default_server_port(),
            username: default_username(),
            protocol_version: default_protocol_version(),
            packet_threshold: default_packet_threshold(),
            play_packet_threshold: default_play_packet_threshold(),
        }
    }
}

impl BotConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: BotConfig = toml::from_str(&contents)?;
            Ok(config)
        } else {
            tracing::info!("No config file found at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }
}
