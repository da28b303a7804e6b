use std::time::Duration;

use crate::models::{WatchedAddress, WithdrawalEvent};

/// Format a withdrawal alert: summary line, UTC timestamp, explorer link.
pub fn format_withdrawal_alert(event: &WithdrawalEvent, explorer_account_url: &str) -> String {
    format!(
        "🚨 {:.2} SOL sent from {}\nTime: {}\n{}",
        event.amount_sol(),
        event.address,
        event.observed_at.to_rfc3339(),
        explorer_link(explorer_account_url, &event.address)
    )
}

pub fn format_heartbeat_message(interval: Duration) -> String {
    format!(
        "✅ Solana Monitor bot is running smoothly. Next update in {}.",
        describe_interval(interval)
    )
}

pub fn explorer_link(explorer_account_url: &str, address: &WatchedAddress) -> String {
    format!("{}/{}", explorer_account_url.trim_end_matches('/'), address)
}

fn describe_interval(interval: Duration) -> String {
    let secs = interval.as_secs();
    match (secs % 60, secs / 60) {
        (0, 1) => "1 minute".to_string(),
        (0, minutes) if minutes > 0 => format!("{} minutes", minutes),
        (_, _) if secs == 1 => "1 second".to_string(),
        _ => format!("{} seconds", secs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_withdrawal_alert_format() {
        let event = WithdrawalEvent {
            address: WatchedAddress::new("dUJNHh9Nm9rsn7ykTViG7N7BJuaoJJD9H635B8BVifa"),
            amount_lamports: 21_000_000_000,
            observed_at: Utc.with_ymd_and_hms(2025, 3, 1, 12, 30, 0).unwrap(),
        };

        assert_eq!(
            format_withdrawal_alert(&event, "https://solscan.io/account/"),
            "🚨 21.00 SOL sent from dUJNHh9Nm9rsn7ykTViG7N7BJuaoJJD9H635B8BVifa\n\
             Time: 2025-03-01T12:30:00+00:00\n\
             https://solscan.io/account/dUJNHh9Nm9rsn7ykTViG7N7BJuaoJJD9H635B8BVifa"
        );
    }

    #[test]
    fn test_amount_rounds_to_two_decimals() {
        let event = WithdrawalEvent::new(WatchedAddress::new("A"), 20_457_000_000);
        assert!(format_withdrawal_alert(&event, "x").starts_with("🚨 20.46 SOL sent from A\n"));
    }

    #[test]
    fn test_explorer_link_without_trailing_slash() {
        let address = WatchedAddress::new("A");
        assert_eq!(explorer_link("https://explorer.solana.com/address", &address), "https://explorer.solana.com/address/A");
        assert_eq!(explorer_link("https://solscan.io/account/", &address), "https://solscan.io/account/A");
    }

    #[test]
    fn test_heartbeat_message() {
        assert_eq!(
            format_heartbeat_message(Duration::from_secs(1800)),
            "✅ Solana Monitor bot is running smoothly. Next update in 30 minutes."
        );
        assert_eq!(
            format_heartbeat_message(Duration::from_secs(60)),
            "✅ Solana Monitor bot is running smoothly. Next update in 1 minute."
        );
        assert_eq!(
            format_heartbeat_message(Duration::from_secs(90)),
            "✅ Solana Monitor bot is running smoothly. Next update in 90 seconds."
        );
    }
}
