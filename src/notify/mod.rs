pub mod formatter;
pub mod heartbeat;
pub mod telegram;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::WithdrawalEvent;

pub use formatter::{format_heartbeat_message, format_withdrawal_alert};
pub use heartbeat::{run_heartbeat, HeartbeatSchedule};
pub use telegram::TelegramClient;

#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Channel rejected message (status {status}): {description}")]
    Rejected { status: u16, description: String },
}

/// Outbound "send text to the configured recipient" capability.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    async fn send_text(&self, text: &str) -> Result<(), DeliveryError>;
}

/// Formats alerts and hands them to the notification channel. Delivery
/// failures are logged and dropped; nothing here returns an error.
#[derive(Clone)]
pub struct AlertSink {
    channel: Arc<dyn NotificationChannel>,
    explorer_account_url: String,
}

impl AlertSink {
    pub fn new(channel: Arc<dyn NotificationChannel>, explorer_account_url: impl Into<String>) -> Self {
        Self {
            channel,
            explorer_account_url: explorer_account_url.into(),
        }
    }

    pub async fn notify(&self, message: &str) {
        match self.channel.send_text(message).await {
            Ok(()) => debug!("Notification delivered"),
            Err(e) => warn!("⚠️ Notification delivery failed: {}", e),
        }
    }

    pub async fn notify_withdrawal(&self, event: &WithdrawalEvent) {
        let message = format_withdrawal_alert(event, &self.explorer_account_url);
        self.notify(&message).await;
        info!("✉️ Alert: {} -{:.2} SOL", event.address, event.amount_sol());
    }
}
