mod config;
mod handlers;
mod hex;

use chisel_protocol_core::{packets, Connection, EventRegistry, ProtocolState};
use config::BotConfig;
use std::path::Path;
use tokio::net::TcpStream;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = BotConfig::load(Path::new("config/bot.toml"))?;
    info!(
        "Config loaded: server={}:{}, username={}, protocol={}",
        config.server_host, config.server_port, config.username, config.protocol_version
    );

    let mut registry = EventRegistry::new();
    handlers::register_defaults(&mut registry, &config)?;

    let addr = format!("{}:{}", config.server_host, config.server_port);
    let stream = TcpStream::connect(&addr).await?;
    info!("Connected to {}", addr);

    let mut conn = Connection::new(stream, config.packet_threshold);

    // Handshake with next_state=2 goes straight to login.
    conn.write_raw(&packets::handshake(
        config.protocol_version,
        &config.server_host,
        config.server_port,
        2,
    ))
    .await?;
    conn.session.advance(ProtocolState::Login);
    conn.write_raw(&packets::login_start(&config.username)).await?;

    match conn.run(&registry).await {
        Ok(()) => info!("Session closed"),
        Err(e) => error!("Connection error: {}", e),
    }
    if let Err(e) = conn.shutdown().await {
        tracing::debug!("Shutdown after error: {}", e);
    }

    Ok(())
}
