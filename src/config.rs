// Create configuration structure for:
// - Telegram credentials (bot token, recipient chat)
// - Watched addresses and alert threshold
// - Feed endpoint URL and keep-alive settings
// - Reconnect backoff and heartbeat schedule
// - Optional liveness server address/port

use dotenv::dotenv;
use solana_sdk::commitment_config::CommitmentConfig;
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::models::{sol_to_lamports, WatchedAddress};
use crate::validation::{parse_watch_list, ValidationError};

pub const DEFAULT_WATCHED_ADDRESSES: &str = "dUJNHh9Nm9rsn7ykTViG7N7BJuaoJJD9H635B8BVifa,\
9B1fR2Z38ggjqmFuhYBEsa7fXaBR1dkC7BamixjmWZb4";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Invalid watch-list: {0}")]
    WatchList(#[from] ValidationError),
}

#[derive(Clone)]
pub struct Config {
    pub telegram_bot_token: String,
    pub telegram_chat_id: String,
    pub watched_addresses: Vec<WatchedAddress>,
    pub solana_ws_url: String,
    pub solana_commitment_level: String,
    pub alert_threshold_lamports: u64,
    pub explorer_account_url: String,
    pub ping_interval: Duration,
    pub pong_timeout: Duration,
    pub subscribe_timeout: Duration,
    pub reconnect_initial_delay: Duration,
    pub reconnect_max_delay: Duration,
    pub heartbeat_interval: Option<Duration>,
    pub heartbeat_initial_delay: Duration,
    pub server_host: String,
    pub server_port: Option<u16>,
}

// Keep the bot token out of logs
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("telegram_bot_token", &"<redacted>")
            .field("telegram_chat_id", &self.telegram_chat_id)
            .field("watched_addresses", &self.watched_addresses)
            .field("solana_ws_url", &self.solana_ws_url)
            .field("solana_commitment_level", &self.solana_commitment_level)
            .field("alert_threshold_lamports", &self.alert_threshold_lamports)
            .field("explorer_account_url", &self.explorer_account_url)
            .field("ping_interval", &self.ping_interval)
            .field("pong_timeout", &self.pong_timeout)
            .field("subscribe_timeout", &self.subscribe_timeout)
            .field("reconnect_initial_delay", &self.reconnect_initial_delay)
            .field("reconnect_max_delay", &self.reconnect_max_delay)
            .field("heartbeat_interval", &self.heartbeat_interval)
            .field("heartbeat_initial_delay", &self.heartbeat_initial_delay)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let telegram_bot_token = required("TELEGRAM_BOT_TOKEN")?;
        let telegram_chat_id = required("TELEGRAM_USER_ID")?;

        let watched_addresses = parse_watch_list(
            &lookup("WATCHED_ADDRESSES").unwrap_or_else(|| DEFAULT_WATCHED_ADDRESSES.to_string()),
        )?;

        let solana_ws_url = lookup("SOLANA_WS_URL")
            .unwrap_or_else(|| "wss://api.mainnet-beta.solana.com/".to_string());
        let solana_commitment_level = lookup("SOLANA_COMMITMENT_LEVEL")
            .unwrap_or_else(|| "confirmed".to_string());
        let alert_threshold_lamports =
            parse_or(&lookup, "ALERT_THRESHOLD_LAMPORTS", sol_to_lamports(20))?;
        let explorer_account_url = lookup("EXPLORER_ACCOUNT_URL")
            .unwrap_or_else(|| "https://solscan.io/account/".to_string());

        let ping_interval = positive_secs(&lookup, "WS_PING_INTERVAL_SECS", 30)?;
        let pong_timeout = Duration::from_secs(parse_or(&lookup, "WS_PONG_TIMEOUT_SECS", 20)?);
        let subscribe_timeout = positive_secs(&lookup, "SUBSCRIBE_TIMEOUT_SECS", 10)?;

        let reconnect_initial_delay = positive_secs(&lookup, "RECONNECT_INITIAL_DELAY_SECS", 1)?;
        let reconnect_max_delay =
            Duration::from_secs(parse_or(&lookup, "RECONNECT_MAX_DELAY_SECS", 60)?);
        if reconnect_max_delay < reconnect_initial_delay {
            return Err(ConfigError::InvalidValue {
                key: "RECONNECT_MAX_DELAY_SECS",
                value: reconnect_max_delay.as_secs().to_string(),
            });
        }

        // 0 disables the heartbeat
        let heartbeat_secs: u64 = parse_or(&lookup, "HEARTBEAT_INTERVAL_SECS", 1800)?;
        let heartbeat_interval = (heartbeat_secs > 0).then(|| Duration::from_secs(heartbeat_secs));
        let heartbeat_initial_delay = Duration::from_secs(parse_or(
            &lookup,
            "HEARTBEAT_INITIAL_DELAY_SECS",
            heartbeat_secs,
        )?);

        let server_host = lookup("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let server_port = match lookup("SERVER_PORT").or_else(|| lookup("PORT")) {
            Some(port) => Some(port.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "SERVER_PORT",
                value: port.clone(),
            })?),
            None => None,
        };

        Ok(Self {
            telegram_bot_token,
            telegram_chat_id,
            watched_addresses,
            solana_ws_url,
            solana_commitment_level,
            alert_threshold_lamports,
            explorer_account_url,
            ping_interval,
            pong_timeout,
            subscribe_timeout,
            reconnect_initial_delay,
            reconnect_max_delay,
            heartbeat_interval,
            heartbeat_initial_delay,
            server_host,
            server_port,
        })
    }

    /// Commitment used for account subscriptions, defaulting to "confirmed"
    pub fn commitment(&self) -> CommitmentConfig {
        match self.solana_commitment_level.as_str() {
            "processed" => CommitmentConfig::processed(),
            "confirmed" => CommitmentConfig::confirmed(),
            "finalized" => CommitmentConfig::finalized(),
            _ => CommitmentConfig::confirmed(),
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        None => Ok(default),
    }
}

// Durations that drive timers must be non-zero
fn positive_secs<F>(lookup: &F, key: &'static str, default: u64) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match parse_or(lookup, key, default)? {
        0 => Err(ConfigError::InvalidValue {
            key,
            value: "0".to_string(),
        }),
        secs => Ok(Duration::from_secs(secs)),
    }
}
