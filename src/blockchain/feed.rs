//! One lifecycle of the account feed: connect, subscribe every watched
//! address, then consume notifications until the stream ends.
//!
//! A [`FeedSession`] is single-use. Subscription handles and baselines belong
//! to the connection they were created on, so reconnecting means building a
//! new session from scratch.

use serde_json::Value;
use solana_sdk::commitment_config::CommitmentConfig;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::blockchain::client::{ConnectionError, FeedConnector, FeedTransport};
use crate::blockchain::ledger::{BalanceLedger, Observation};
use crate::blockchain::models::{InboundMessage, RequestId, SubscribeRequest, SubscriptionId};
use crate::config::Config;
use crate::models::WatchedAddress;
use crate::notify::AlertSink;

#[derive(Error, Debug)]
pub enum SubscriptionError {
    #[error("Subscription for {address} rejected: {message} (code {code})")]
    Rejected {
        address: WatchedAddress,
        code: i64,
        message: String,
    },

    #[error("Acknowledgment for {address} carries no subscription id")]
    MissingResult { address: WatchedAddress },

    #[error("No acknowledgment for {address} within {timeout:?}")]
    Timeout {
        address: WatchedAddress,
        timeout: Duration,
    },

    #[error("Connection closed while subscribing {address}")]
    ConnectionClosed { address: WatchedAddress },

    #[error("Transport failed while subscribing {address}: {source}")]
    Transport {
        address: WatchedAddress,
        #[source]
        source: ConnectionError,
    },

    #[error("Failed to encode subscribe request: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Everything that ends a feed session abnormally.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error(transparent)]
    Subscription(#[from] SubscriptionError),
}

#[derive(Debug, Clone)]
pub struct FeedSettings {
    pub commitment: CommitmentConfig,
    pub alert_threshold_lamports: u64,
    pub subscribe_timeout: Duration,
}

impl FeedSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            commitment: config.commitment(),
            alert_threshold_lamports: config.alert_threshold_lamports,
            subscribe_timeout: config.subscribe_timeout,
        }
    }
}

pub struct FeedSession<T> {
    transport: T,
    ledger: BalanceLedger,
    pending: HashMap<RequestId, WatchedAddress>,
    next_request_id: RequestId,
    settings: FeedSettings,
    sink: AlertSink,
}

impl<T: FeedTransport> FeedSession<T> {
    pub fn new(transport: T, settings: FeedSettings, sink: AlertSink) -> Self {
        Self {
            transport,
            ledger: BalanceLedger::new(),
            pending: HashMap::new(),
            next_request_id: 1,
            settings,
            sink,
        }
    }

    /// Connect a new session through `connector`.
    pub async fn open<C>(
        connector: &C,
        settings: FeedSettings,
        sink: AlertSink,
    ) -> Result<Self, ConnectionError>
    where
        C: FeedConnector<Transport = T>,
    {
        let transport = connector.connect().await?;
        Ok(Self::new(transport, settings, sink))
    }

    pub fn ledger(&self) -> &BalanceLedger {
        &self.ledger
    }

    /// Subscribe each address in order, waiting for its acknowledgment
    /// before sending the next request.
    pub async fn subscribe_all(&mut self, addresses: &[WatchedAddress]) -> Result<(), SubscriptionError> {
        for address in addresses {
            let id = self.next_request_id;
            self.next_request_id += 1;

            let request = SubscribeRequest::account(id, address, self.settings.commitment);
            self.transport
                .send_text(request.to_text()?)
                .await
                .map_err(|source| SubscriptionError::Transport {
                    address: address.clone(),
                    source,
                })?;
            self.pending.insert(id, address.clone());

            let subscription = self.await_ack(id, address).await?;
            debug!("Subscribed {} as subscription {} (request {})", address, subscription, id);
        }

        info!("✅ Subscribed to {} wallets.", self.ledger.subscription_count());
        Ok(())
    }

    /// Read frames until the acknowledgment for request `id` arrives.
    /// Notifications for already acknowledged addresses are processed as
    /// they come in.
    async fn await_ack(
        &mut self,
        id: RequestId,
        address: &WatchedAddress,
    ) -> Result<SubscriptionId, SubscriptionError> {
        let timeout = self.settings.subscribe_timeout;
        let deadline = Instant::now() + timeout;

        loop {
            let next = tokio::time::timeout_at(deadline, self.transport.next_text())
                .await
                .map_err(|_| SubscriptionError::Timeout {
                    address: address.clone(),
                    timeout,
                })?;

            let text = match next {
                Some(Ok(text)) => text,
                Some(Err(source)) => {
                    return Err(SubscriptionError::Transport {
                        address: address.clone(),
                        source,
                    })
                }
                None => {
                    return Err(SubscriptionError::ConnectionClosed {
                        address: address.clone(),
                    })
                }
            };

            match InboundMessage::parse(&text) {
                InboundMessage::Ack { id: ack_id, result, error } => {
                    let Some(acked) = self.pending.remove(&ack_id) else {
                        warn!("Ignoring acknowledgment for unknown request {}", ack_id);
                        continue;
                    };

                    if let Some(error) = error {
                        return Err(SubscriptionError::Rejected {
                            address: acked,
                            code: error.code,
                            message: error.message,
                        });
                    }

                    let subscription = result
                        .as_ref()
                        .and_then(Value::as_u64)
                        .ok_or_else(|| SubscriptionError::MissingResult {
                            address: acked.clone(),
                        })?;
                    self.ledger.register(subscription, acked);

                    if ack_id == id {
                        return Ok(subscription);
                    }
                }
                InboundMessage::AccountNotification { subscription, lamports, slot } => {
                    self.handle_notification(subscription, lamports, slot).await;
                }
                InboundMessage::Other => debug!("Ignoring frame during subscription: {}", text),
            }
        }
    }

    /// Consume notifications until the stream closes (`Ok`) or the transport
    /// fails (`Err`).
    pub async fn run(mut self) -> Result<(), ConnectionError> {
        while let Some(next) = self.transport.next_text().await {
            let text = next?;

            match InboundMessage::parse(&text) {
                InboundMessage::AccountNotification { subscription, lamports, slot } => {
                    self.handle_notification(subscription, lamports, slot).await;
                }
                InboundMessage::Ack { id, .. } => {
                    debug!("Ignoring late acknowledgment for request {}", id);
                }
                InboundMessage::Other => debug!("Ignoring frame: {}", text),
            }
        }

        info!("Feed stream ended");
        Ok(())
    }

    async fn handle_notification(&mut self, subscription: SubscriptionId, lamports: u64, slot: Option<u64>) {
        let observation = self.ledger.observe(subscription, lamports);

        match &observation {
            Observation::UnknownSubscription => {
                debug!("Discarding notification for unknown subscription {}", subscription);
                return;
            }
            Observation::Baseline { address, lamports } => {
                debug!("Baseline for {}: {} lamports (slot {:?})", address, lamports, slot);
            }
            Observation::Changed { address, previous, current } => {
                debug!(
                    "Balance of {} changed {} -> {} lamports (slot {:?})",
                    address, previous, current, slot
                );
            }
        }

        if let Some(event) = observation.withdrawal(self.settings.alert_threshold_lamports) {
            self.sink.notify_withdrawal(&event).await;
        }
    }
}
