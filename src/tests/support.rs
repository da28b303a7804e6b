//! Scripted transports, connectors, sleepers and notification channels.

use async_trait::async_trait;
use serde_json::json;
use solana_sdk::commitment_config::CommitmentConfig;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_tungstenite::tungstenite;
use tokio_util::sync::CancellationToken;

use crate::blockchain::backoff::Sleeper;
use crate::blockchain::client::{ConnectionError, FeedConnector, FeedTransport};
use crate::blockchain::feed::FeedSettings;
use crate::notify::{AlertSink, DeliveryError, NotificationChannel};

pub const ADDRESS_A: &str = "dUJNHh9Nm9rsn7ykTViG7N7BJuaoJJD9H635B8BVifa";
pub const ADDRESS_B: &str = "9B1fR2Z38ggjqmFuhYBEsa7fXaBR1dkC7BamixjmWZb4";
pub const THRESHOLD: u64 = 20_000_000_000;
pub const SOL: u64 = 1_000_000_000;

pub fn ack(id: u64, subscription: u64) -> Frame {
    Frame::Text(json!({ "jsonrpc": "2.0", "result": subscription, "id": id }).to_string())
}

pub fn notification(subscription: u64, lamports: u64) -> Frame {
    Frame::Text(
        json!({
            "jsonrpc": "2.0",
            "method": "accountNotification",
            "params": {
                "result": {
                    "context": { "slot": 1000 },
                    "value": {
                        "data": ["", "base64"],
                        "executable": false,
                        "lamports": lamports,
                        "owner": "11111111111111111111111111111111",
                        "rentEpoch": 18446744073709551615u64,
                        "space": 0
                    }
                },
                "subscription": subscription
            }
        })
        .to_string(),
    )
}

pub fn connection_lost() -> ConnectionError {
    ConnectionError::Transport(tungstenite::Error::ConnectionClosed)
}

pub fn settings() -> FeedSettings {
    FeedSettings {
        commitment: CommitmentConfig::confirmed(),
        alert_threshold_lamports: THRESHOLD,
        subscribe_timeout: Duration::from_secs(1),
    }
}

pub enum Frame {
    Text(String),
    /// Transport error
    Fail,
    /// Never yields
    Hang,
}

pub struct ScriptedTransport {
    frames: VecDeque<Frame>,
    sent: Arc<Mutex<Vec<String>>>,
}

impl ScriptedTransport {
    pub fn new(frames: Vec<Frame>) -> (Self, Arc<Mutex<Vec<String>>>) {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let transport = Self {
            frames: frames.into(),
            sent: sent.clone(),
        };
        (transport, sent)
    }
}

#[async_trait]
impl FeedTransport for ScriptedTransport {
    async fn send_text(&mut self, text: String) -> Result<(), ConnectionError> {
        self.sent.lock().unwrap().push(text);
        Ok(())
    }

    async fn next_text(&mut self) -> Option<Result<String, ConnectionError>> {
        match self.frames.pop_front() {
            Some(Frame::Text(text)) => Some(Ok(text)),
            Some(Frame::Fail) => Some(Err(connection_lost())),
            Some(Frame::Hang) => std::future::pending().await,
            None => None,
        }
    }
}

pub enum Attempt {
    Refused,
    Session(Vec<Frame>),
}

struct ConnectorState {
    attempts: Mutex<VecDeque<Attempt>>,
    sent: Mutex<Vec<Arc<Mutex<Vec<String>>>>>,
    shutdown: CancellationToken,
}

/// Plays back one attempt per `connect`; once the script runs out it
/// cancels `shutdown` and refuses.
#[derive(Clone)]
pub struct ScriptedConnector {
    state: Arc<ConnectorState>,
}

impl ScriptedConnector {
    pub fn new(attempts: Vec<Attempt>, shutdown: CancellationToken) -> Self {
        Self {
            state: Arc::new(ConnectorState {
                attempts: Mutex::new(attempts.into()),
                sent: Mutex::new(Vec::new()),
                shutdown,
            }),
        }
    }

    /// Frames sent on each established session, in connect order.
    pub fn sent_per_session(&self) -> Vec<Vec<String>> {
        self.state
            .sent
            .lock()
            .unwrap()
            .iter()
            .map(|sent| sent.lock().unwrap().clone())
            .collect()
    }
}

#[async_trait]
impl FeedConnector for ScriptedConnector {
    type Transport = ScriptedTransport;

    async fn connect(&self) -> Result<ScriptedTransport, ConnectionError> {
        let attempt = self.state.attempts.lock().unwrap().pop_front();

        match attempt {
            Some(Attempt::Session(frames)) => {
                let (transport, sent) = ScriptedTransport::new(frames);
                self.state.sent.lock().unwrap().push(sent);
                Ok(transport)
            }
            Some(Attempt::Refused) => Err(connection_lost()),
            None => {
                self.state.shutdown.cancel();
                Err(connection_lost())
            }
        }
    }
}

/// Returns immediately and records every requested delay. Optionally
/// cancels a token once a number of sleeps has been requested.
#[derive(Clone, Default)]
pub struct RecordingSleeper {
    slept: Arc<Mutex<Vec<Duration>>>,
    cancel_after: Option<(usize, CancellationToken)>,
}

impl RecordingSleeper {
    pub fn cancelling_after(sleeps: usize, shutdown: CancellationToken) -> Self {
        Self {
            slept: Arc::default(),
            cancel_after: Some((sleeps, shutdown)),
        }
    }

    pub fn slept(&self) -> Vec<Duration> {
        self.slept.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        let count = {
            let mut slept = self.slept.lock().unwrap();
            slept.push(duration);
            slept.len()
        };

        if let Some((limit, shutdown)) = &self.cancel_after {
            if count >= *limit {
                shutdown.cancel();
            }
        }
    }
}

#[derive(Clone, Default)]
pub struct RecordingChannel {
    sent: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

impl RecordingChannel {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sink(&self) -> AlertSink {
        AlertSink::new(Arc::new(self.clone()), "https://solscan.io/account/")
    }
}

#[async_trait]
impl NotificationChannel for RecordingChannel {
    async fn send_text(&self, text: &str) -> Result<(), DeliveryError> {
        self.sent.lock().unwrap().push(text.to_string());

        if self.fail {
            return Err(DeliveryError::Rejected {
                status: 500,
                description: "channel unavailable".to_string(),
            });
        }
        Ok(())
    }
}

pub fn secs(values: &[u64]) -> Vec<Duration> {
    values.iter().copied().map(Duration::from_secs).collect()
}
