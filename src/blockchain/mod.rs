pub mod backoff;
pub mod client;
pub mod feed;
pub mod ledger;
pub mod models;
pub mod supervisor;

// Re-exports for convenience
pub use backoff::{ReconnectBackoff, Sleeper, TokioSleeper};
pub use client::{ConnectionError, FeedConnector, FeedTransport, WsConnector};
pub use feed::{FeedError, FeedSession, FeedSettings, SubscriptionError};
pub use ledger::BalanceLedger;
pub use supervisor::Supervisor;
