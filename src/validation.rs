use bs58;
use std::collections::HashSet;
use thiserror::Error;

use crate::models::WatchedAddress;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid Solana address format: {0}")]
    InvalidSolanaAddress(String),

    #[error("Address listed more than once: {0}")]
    DuplicateAddress(String),
}

pub fn validate_solana_address(address: &str) -> Result<(), ValidationError> {
    // Check if address is empty
    if address.trim().is_empty() {
        return Err(ValidationError::MissingParameter("address".to_string()));
    }

    // Decode base58 string
    let decoded = match bs58::decode(address).into_vec() {
        Ok(bytes) => bytes,
        Err(_) => return Err(ValidationError::InvalidSolanaAddress(address.to_string())),
    };

    // Validate length (Solana addresses are 32 bytes)
    if decoded.len() != 32 {
        return Err(ValidationError::InvalidSolanaAddress(address.to_string()));
    }

    Ok(())
}

/// Parse a comma-separated watch-list, keeping the configured order.
pub fn parse_watch_list(raw: &str) -> Result<Vec<WatchedAddress>, ValidationError> {
    let mut seen = HashSet::new();
    let mut addresses = Vec::new();

    for entry in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        validate_solana_address(entry)?;

        if !seen.insert(entry.to_string()) {
            return Err(ValidationError::DuplicateAddress(entry.to_string()));
        }

        addresses.push(WatchedAddress::new(entry));
    }

    if addresses.is_empty() {
        return Err(ValidationError::MissingParameter("addresses".to_string()));
    }

    Ok(addresses)
}
