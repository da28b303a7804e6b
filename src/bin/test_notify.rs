use chrono::Utc;
use std::sync::Arc;
use tracing::{info, Level};
use withdrawal_monitor::{
    config::Config,
    models::WithdrawalEvent,
    notify::{format_withdrawal_alert, AlertSink, NotificationChannel, TelegramClient},
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Setup tracing
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    info!("Starting Telegram notification test...");

    let config = Config::from_env()?;
    let telegram = Arc::new(TelegramClient::new(
        &config.telegram_bot_token,
        &config.telegram_chat_id,
    )?);

    // 1. Raw send, surfacing the error
    telegram
        .send_text(&format!("🧪 Withdrawal monitor test message ({})", Utc::now().to_rfc3339()))
        .await?;
    info!("✅ Test message delivered");

    // 2. Sample alert through the sink, exactly as the monitor formats it
    let address = config.watched_addresses[0].clone();
    let event = WithdrawalEvent::new(address, config.alert_threshold_lamports);
    info!("Sample alert:\n{}", format_withdrawal_alert(&event, &config.explorer_account_url));

    let sink = AlertSink::new(telegram, config.explorer_account_url.clone());
    sink.notify_withdrawal(&event).await;
    info!("✅ Sample alert sent");

    Ok(())
}
