use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use crate::config::Config;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Error, Debug)]
pub enum ConnectionError {
    #[error("WebSocket handshake failed: {0}")]
    Handshake(#[source] tungstenite::Error),

    #[error("WebSocket handshake timed out after {0:?}")]
    HandshakeTimeout(Duration),

    #[error("WebSocket error: {0}")]
    Transport(#[from] tungstenite::Error),

    #[error("No frames received for {0:?}, peer presumed dead")]
    KeepAliveTimeout(Duration),
}

/// One open connection to the account feed.
#[async_trait]
pub trait FeedTransport: Send {
    async fn send_text(&mut self, text: String) -> Result<(), ConnectionError>;

    /// Next text frame. `None` once the peer has closed the stream.
    async fn next_text(&mut self) -> Option<Result<String, ConnectionError>>;
}

/// Opens fresh transports; called once per feed session.
#[async_trait]
pub trait FeedConnector: Send + Sync {
    type Transport: FeedTransport;

    async fn connect(&self) -> Result<Self::Transport, ConnectionError>;
}

pub struct WsConnector {
    url: String,
    ping_interval: Duration,
    pong_timeout: Duration,
}

impl WsConnector {
    pub fn new(url: impl Into<String>, ping_interval: Duration, pong_timeout: Duration) -> Self {
        Self {
            url: url.into(),
            ping_interval,
            pong_timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.solana_ws_url.clone(),
            config.ping_interval,
            config.pong_timeout,
        )
    }
}

#[async_trait]
impl FeedConnector for WsConnector {
    type Transport = WsTransport;

    async fn connect(&self) -> Result<WsTransport, ConnectionError> {
        debug!("Connecting to feed {}", self.url);

        let (stream, response) = tokio::time::timeout(CONNECT_TIMEOUT, connect_async(self.url.as_str()))
            .await
            .map_err(|_| ConnectionError::HandshakeTimeout(CONNECT_TIMEOUT))?
            .map_err(ConnectionError::Handshake)?;

        info!("Connected to feed {} (HTTP {})", self.url, response.status());

        Ok(WsTransport::new(stream, self.ping_interval, self.pong_timeout))
    }
}

/// WebSocket transport with a client-side keep-alive: a Ping goes out every
/// `ping_interval`, and the connection is declared dead when nothing at all
/// has arrived for `ping_interval + pong_timeout`.
pub struct WsTransport {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    ping: Interval,
    last_seen: Instant,
    dead_after: Duration,
}

impl WsTransport {
    fn new(
        stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
        ping_interval: Duration,
        pong_timeout: Duration,
    ) -> Self {
        let mut ping = interval_at(Instant::now() + ping_interval, ping_interval);
        ping.set_missed_tick_behavior(MissedTickBehavior::Delay);

        Self {
            stream,
            ping,
            last_seen: Instant::now(),
            dead_after: ping_interval + pong_timeout,
        }
    }
}

#[async_trait]
impl FeedTransport for WsTransport {
    async fn send_text(&mut self, text: String) -> Result<(), ConnectionError> {
        self.stream.send(Message::Text(text)).await?;
        Ok(())
    }

    async fn next_text(&mut self) -> Option<Result<String, ConnectionError>> {
        loop {
            let deadline = self.last_seen + self.dead_after;

            tokio::select! {
                frame = self.stream.next() => {
                    let frame = match frame {
                        Some(Ok(frame)) => frame,
                        Some(Err(e)) => return Some(Err(e.into())),
                        None => return None,
                    };
                    self.last_seen = Instant::now();

                    match frame {
                        Message::Text(text) => return Some(Ok(text)),
                        Message::Close(reason) => {
                            warn!("Feed closed the connection: {:?}", reason);
                            return None;
                        }
                        Message::Pong(_) => debug!("Received WebSocket pong"),
                        // Answered by tungstenite on the next write/flush
                        Message::Ping(_) => debug!("Received WebSocket ping"),
                        Message::Binary(_) | Message::Frame(_) => {
                            debug!("Ignoring non-text WebSocket frame")
                        }
                    }
                }
                _ = self.ping.tick() => {
                    if let Err(e) = self.stream.send(Message::Ping(Vec::new())).await {
                        return Some(Err(e.into()));
                    }
                }
                _ = tokio::time::sleep_until(deadline) => {
                    return Some(Err(ConnectionError::KeepAliveTimeout(self.dead_after)));
                }
            }
        }
    }
}
