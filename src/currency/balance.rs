//! Process-wide participant balances and the change feed observers subscribe to.
use std::collections::HashMap;

use bevy::prelude::*;
use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::Serialize;

use crate::session::ParticipantId;

use super::config::CurrencyDisplay;

/// One balance mutation as seen by observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BalanceChange {
    pub participant: ParticipantId,
    pub old_balance: i64,
    pub new_balance: i64,
}

impl BalanceChange {
    pub fn delta(&self) -> i64 {
        self.new_balance.saturating_sub(self.old_balance)
    }
}

/// Receiving end of a balance subscription. Dropping it unsubscribes.
#[derive(Debug)]
pub struct BalanceFeed {
    receiver: Receiver<BalanceChange>,
}

impl BalanceFeed {
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn try_next(&self) -> Option<BalanceChange> {
        self.receiver.try_recv().ok()
    }

    pub fn drain(&self) -> Vec<BalanceChange> {
        self.receiver.try_iter().collect()
    }
}

/// Balances keyed by participant. Every mutation goes through [`BalanceStore::add_currency`].
#[derive(Resource, Debug, Default)]
pub struct BalanceStore {
    balances: HashMap<ParticipantId, i64>,
    subscribers: Vec<Sender<BalanceChange>>,
    display: CurrencyDisplay,
}

impl BalanceStore {
    pub fn new(display: CurrencyDisplay) -> Self {
        Self {
            balances: HashMap::new(),
            subscribers: Vec::new(),
            display,
        }
    }

    pub fn set_display(&mut self, display: CurrencyDisplay) {
        self.display = display;
    }

    /// Unknown participants have a balance of zero.
    pub fn balance(&self, participant: ParticipantId) -> i64 {
        self.balances.get(&participant).copied().unwrap_or(0)
    }

    /// Adds `amount` (negative for debits) and publishes the change to every
    /// subscriber before returning. Zero amounts still publish.
    pub fn add_currency(&mut self, participant: ParticipantId, amount: i64) -> BalanceChange {
        let old_balance = self.balance(participant);
        let new_balance = old_balance.saturating_add(amount);
        self.balances.insert(participant, new_balance);

        let change = BalanceChange {
            participant,
            old_balance,
            new_balance,
        };
        self.publish(change);
        change
    }

    pub fn subscribe(&mut self) -> BalanceFeed {
        let (sender, receiver) = unbounded();
        self.subscribers.push(sender);
        BalanceFeed { receiver }
    }

    #[allow(dead_code)]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn stringify(&self, amount: i64) -> String {
        let unit = if amount.unsigned_abs() == 1 {
            &self.display.singular
        } else {
            &self.display.plural
        };
        format!("{} {}", amount, unit)
    }

    pub fn balances(&self) -> impl Iterator<Item = (ParticipantId, i64)> + '_ {
        self.balances
            .iter()
            .map(|(participant, balance)| (*participant, *balance))
    }

    pub fn len(&self) -> usize {
        self.balances.len()
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    fn publish(&mut self, change: BalanceChange) {
        self.subscribers
            .retain(|subscriber| subscriber.send(change).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unseen_participant_has_zero_balance() {
        let store = BalanceStore::default();
        assert_eq!(store.balance(ParticipantId::new(77)), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn balance_is_sum_of_applied_amounts() {
        let mut store = BalanceStore::default();
        let id = ParticipantId::new(1);
        let amounts = [10, -3, 0, 250, -1000, 45];

        for amount in amounts {
            store.add_currency(id, amount);
        }

        assert_eq!(store.balance(id), amounts.iter().sum::<i64>());
        assert_eq!(store.balance(id), -698);
    }

    #[test]
    fn every_mutation_publishes_exactly_one_change() {
        let mut store = BalanceStore::default();
        let feed = store.subscribe();
        let id = ParticipantId::new(4);

        store.add_currency(id, 12);
        store.add_currency(id, -2);
        store.add_currency(id, 0);

        let changes = feed.drain();
        assert_eq!(changes.len(), 3);
        assert_eq!(
            changes[0],
            BalanceChange {
                participant: id,
                old_balance: 0,
                new_balance: 12
            }
        );
        assert_eq!(changes[1].old_balance, 12);
        assert_eq!(changes[1].delta(), -2);
        assert_eq!(changes[2].delta(), 0);
        assert!(feed.try_next().is_none());
    }

    #[test]
    fn every_subscriber_sees_the_change() {
        let mut store = BalanceStore::default();
        let first = store.subscribe();
        let second = store.subscribe();

        let returned = store.add_currency(ParticipantId::new(2), 5);

        assert_eq!(first.try_next(), Some(returned));
        assert_eq!(second.try_next(), Some(returned));
    }

    #[test]
    fn dropped_feeds_are_pruned_on_publish() {
        let mut store = BalanceStore::default();
        let kept = store.subscribe();
        drop(store.subscribe());
        assert_eq!(store.subscriber_count(), 2);

        store.add_currency(ParticipantId::new(3), 1);

        assert_eq!(store.subscriber_count(), 1);
        assert_eq!(kept.drain().len(), 1);
    }

    #[test]
    fn stringify_picks_singular_or_plural() {
        let store = BalanceStore::default();
        assert_eq!(store.stringify(1), "1 penny");
        assert_eq!(store.stringify(-1), "-1 penny");
        assert_eq!(store.stringify(25), "25 pennies");
        assert_eq!(store.stringify(0), "0 pennies");
    }

    #[test]
    fn overflow_saturates() {
        let mut store = BalanceStore::default();
        let id = ParticipantId::new(5);
        store.add_currency(id, i64::MAX);
        let change = store.add_currency(id, 10);
        assert_eq!(change.new_balance, i64::MAX);
    }
}
