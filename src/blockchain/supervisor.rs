//! Reconnect loop around [`FeedSession`].
//!
//! Each cycle opens a fresh session, subscribes the watch-list and consumes
//! the feed. Reaching the streaming state resets the backoff. A failed cycle
//! waits out the next backoff delay before the next attempt; a cycle that
//! ends cleanly reconnects immediately. The loop only stops when `shutdown`
//! is cancelled, which is checked between cycles, during backoff sleeps and
//! while a session is waiting on the feed.

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::blockchain::backoff::{ReconnectBackoff, Sleeper};
use crate::blockchain::client::FeedConnector;
use crate::blockchain::feed::{FeedError, FeedSession, FeedSettings};
use crate::models::WatchedAddress;
use crate::notify::AlertSink;

pub struct Supervisor<C, S> {
    connector: C,
    addresses: Vec<WatchedAddress>,
    settings: FeedSettings,
    sink: AlertSink,
    backoff: ReconnectBackoff,
    sleeper: S,
    sessions: u64,
}

impl<C, S> Supervisor<C, S>
where
    C: FeedConnector,
    S: Sleeper,
{
    pub fn new(
        connector: C,
        addresses: Vec<WatchedAddress>,
        settings: FeedSettings,
        sink: AlertSink,
        backoff: ReconnectBackoff,
        sleeper: S,
    ) -> Self {
        Self {
            connector,
            addresses,
            settings,
            sink,
            backoff,
            sleeper,
            sessions: 0,
        }
    }

    /// Number of sessions started so far.
    pub fn sessions(&self) -> u64 {
        self.sessions
    }

    pub async fn run(&mut self, shutdown: CancellationToken) {
        info!("Starting feed supervisor for {} addresses", self.addresses.len());

        while !shutdown.is_cancelled() {
            self.sessions += 1;
            let session = self.sessions;

            let mut subscribed = false;
            let outcome = tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    info!("Shutdown requested during feed session {}", session);
                    break;
                }
                outcome = self.run_session(&mut subscribed) => outcome,
            };

            // A session that got past subscription counts as a successful
            // reconnect, however it ended
            if subscribed {
                self.backoff.reset();
            }

            match outcome {
                Ok(()) => {
                    warn!("Feed session {} ended cleanly, reconnecting", session);
                }
                Err(e) => {
                    let delay = self.backoff.next_delay();
                    error!("🔁 Feed session {} failed: {}, retrying in {:?}", session, e, delay);

                    tokio::select! {
                        biased;
                        _ = shutdown.cancelled() => break,
                        _ = self.sleeper.sleep(delay) => {}
                    }
                }
            }
        }

        info!("Feed supervisor stopped after {} sessions", self.sessions);
    }

    /// Sets `subscribed` once every address is subscribed and the session
    /// starts consuming the feed.
    async fn run_session(&self, subscribed: &mut bool) -> Result<(), FeedError> {
        let mut session =
            FeedSession::open(&self.connector, self.settings.clone(), self.sink.clone()).await?;
        session.subscribe_all(&self.addresses).await?;
        *subscribed = true;
        session.run().await?;
        Ok(())
    }
}
