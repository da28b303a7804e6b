use std::collections::HashMap;

use crate::blockchain::models::SubscriptionId;
use crate::models::{WatchedAddress, WithdrawalEvent};

/// Outcome of feeding one balance observation into the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    /// The subscription handle is not ours; nothing was stored.
    UnknownSubscription,
    /// First balance seen for the address in this session.
    Baseline { address: WatchedAddress, lamports: u64 },
    Changed {
        address: WatchedAddress,
        previous: u64,
        current: u64,
    },
}

impl Observation {
    /// Withdrawal event for a decrease of at least `threshold` lamports.
    pub fn withdrawal(&self, threshold: u64) -> Option<WithdrawalEvent> {
        match self {
            Self::Changed { address, previous, current } if current < previous => {
                let amount = previous - current;
                (amount >= threshold).then(|| WithdrawalEvent::new(address.clone(), amount))
            }
            _ => None,
        }
    }
}

/// Per-session balance state: subscription handle to address, and address to
/// last known balance.
#[derive(Debug, Default)]
pub struct BalanceLedger {
    subscriptions: HashMap<SubscriptionId, WatchedAddress>,
    balances: HashMap<WatchedAddress, Option<u64>>,
}

impl BalanceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an acknowledged subscription and reset the address to unknown.
    pub fn register(&mut self, subscription: SubscriptionId, address: WatchedAddress) {
        self.balances.insert(address.clone(), None);
        self.subscriptions.insert(subscription, address);
    }

    pub fn resolve(&self, subscription: SubscriptionId) -> Option<&WatchedAddress> {
        self.subscriptions.get(&subscription)
    }

    pub fn balance(&self, address: &WatchedAddress) -> Option<u64> {
        self.balances.get(address).copied().flatten()
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Store the new balance and report how it relates to the previous one.
    /// The stored value is overwritten on every observation.
    pub fn observe(&mut self, subscription: SubscriptionId, lamports: u64) -> Observation {
        let Some(address) = self.subscriptions.get(&subscription) else {
            return Observation::UnknownSubscription;
        };

        let previous = self.balances.insert(address.clone(), Some(lamports)).flatten();

        match previous {
            None => Observation::Baseline {
                address: address.clone(),
                lamports,
            },
            Some(previous) => Observation::Changed {
                address: address.clone(),
                previous,
                current: lamports,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLD: u64 = 20_000_000_000;

    fn ledger_with(address: &str, subscription: SubscriptionId) -> (BalanceLedger, WatchedAddress) {
        let address = WatchedAddress::new(address);
        let mut ledger = BalanceLedger::new();
        ledger.register(subscription, address.clone());
        (ledger, address)
    }

    #[test]
    fn test_first_observation_is_baseline() {
        let (mut ledger, address) = ledger_with("A", 10);
        assert_eq!(ledger.balance(&address), None);

        let obs = ledger.observe(10, 1);
        assert_eq!(obs, Observation::Baseline { address: address.clone(), lamports: 1 });
        assert_eq!(obs.withdrawal(0), None);
        assert_eq!(ledger.balance(&address), Some(1));
    }

    #[test]
    fn test_threshold_sequence() {
        let (mut ledger, address) = ledger_with("A", 10);

        assert!(ledger.observe(10, 100_000_000_000).withdrawal(THRESHOLD).is_none());
        assert!(ledger.observe(10, 100_000_000_000).withdrawal(THRESHOLD).is_none());

        let event = ledger.observe(10, 79_000_000_000).withdrawal(THRESHOLD).unwrap();
        assert_eq!(event.address, address);
        assert_eq!(event.amount_lamports, 21_000_000_000);

        assert!(ledger.observe(10, 78_000_000_000).withdrawal(THRESHOLD).is_none());
        assert_eq!(ledger.balance(&address), Some(78_000_000_000));
    }

    #[test]
    fn test_exact_threshold_alerts_and_increase_does_not() {
        let (mut ledger, _) = ledger_with("A", 1);
        ledger.observe(1, 50);
        assert_eq!(ledger.observe(1, 30).withdrawal(20).unwrap().amount_lamports, 20);
        assert!(ledger.observe(1, 11).withdrawal(20).is_none());
        assert!(ledger.observe(1, u64::MAX).withdrawal(20).is_none());
        assert_eq!(ledger.observe(1, 0).withdrawal(20).unwrap().amount_lamports, u64::MAX);
    }

    #[test]
    fn test_unknown_subscription_leaves_state_alone() {
        let (mut ledger, address) = ledger_with("A", 10);
        ledger.observe(10, 500);

        assert_eq!(ledger.observe(99, 1), Observation::UnknownSubscription);
        assert_eq!(ledger.balance(&address), Some(500));
        assert!(ledger.resolve(99).is_none());
    }

    #[test]
    fn test_register_resets_balance() {
        let (mut ledger, address) = ledger_with("A", 10);
        ledger.observe(10, 500);

        ledger.register(11, address.clone());
        assert_eq!(ledger.balance(&address), None);
        assert!(matches!(ledger.observe(11, 1), Observation::Baseline { .. }));
        assert_eq!(ledger.subscription_count(), 2);
    }
}
