use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, Level};
use withdrawal_monitor::{
    blockchain::{FeedConnector, FeedSession, FeedSettings, WsConnector},
    config::Config,
    notify::{AlertSink, DeliveryError, NotificationChannel},
};

/// Prints alerts instead of sending them
struct LogChannel;

#[async_trait]
impl NotificationChannel for LogChannel {
    async fn send_text(&self, text: &str) -> Result<(), DeliveryError> {
        info!("📨 Would send:\n{}", text);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Setup tracing
    tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .init();

    info!("Starting feed integration test...");

    // 1. Setup
    let config = Config::from_env()?;
    let connector = WsConnector::from_config(&config);
    let sink = AlertSink::new(Arc::new(LogChannel), config.explorer_account_url.clone());

    // 2. Connect
    info!("Connecting to {}...", config.solana_ws_url);
    let transport = connector.connect().await?;
    let mut session = FeedSession::new(transport, FeedSettings::from_config(&config), sink);
    info!("✅ Connected");

    // 3. Subscribe
    session.subscribe_all(&config.watched_addresses).await?;
    for address in &config.watched_addresses {
        info!("   Watching {}", address);
    }

    // 4. Stream until the feed closes or fails (Ctrl-C to stop)
    info!("Streaming balance changes, threshold {} lamports", config.alert_threshold_lamports);
    session.run().await?;

    info!("Feed closed");
    Ok(())
}
