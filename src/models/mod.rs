// Define WatchedAddress and WithdrawalEvent
// Lamport / SOL conversion helpers for display

use chrono::{DateTime, Utc};
use solana_sdk::native_token::LAMPORTS_PER_SOL;
use std::fmt;

/// An account address on the watch-list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WatchedAddress(String);

impl WatchedAddress {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WatchedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for WatchedAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A balance decrease on a watched address that crossed the alert threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawalEvent {
    pub address: WatchedAddress,
    pub amount_lamports: u64,
    pub observed_at: DateTime<Utc>,
}

impl WithdrawalEvent {
    pub fn new(address: WatchedAddress, amount_lamports: u64) -> Self {
        Self {
            address,
            amount_lamports,
            observed_at: Utc::now(),
        }
    }

    pub fn amount_sol(&self) -> f64 {
        lamports_to_sol(self.amount_lamports)
    }
}

pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}

pub fn sol_to_lamports(sol: u64) -> u64 {
    sol.saturating_mul(LAMPORTS_PER_SOL)
}
