//! Currency module: participant balances and the round-end payout engine.
pub mod balance;
pub mod config;
pub mod distribution;
pub mod eligibility;
pub mod events;
pub mod ledger;
pub mod plugin;
pub mod relay;
pub mod reward;
pub mod systems;

pub use balance::BalanceStore;
pub use events::{BalanceRequested, ObjectiveCompleted, RoundPayoutCompleted};
pub use plugin::CurrencyPlugin;
