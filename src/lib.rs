pub mod api;
pub mod blockchain;
pub mod config;
pub mod models;
pub mod notify;
pub mod validation;

#[cfg(test)]
pub mod tests;

// Re-export specific items for convenience if desired
pub use api::route::create_router;
pub use blockchain::{FeedSession, Supervisor};
pub use config::Config;
pub use models::{WatchedAddress, WithdrawalEvent};
pub use notify::AlertSink;
pub use validation::{parse_watch_list, validate_solana_address};
