//! Currency plugin wiring balances, the payout controller, and the relay.
use bevy::prelude::*;

use crate::round::{RoundEnded, RoundLifecycleSet, RoundStarted};

use super::{
    balance::BalanceStore,
    config::CurrencyConfig,
    distribution::RoundPayoutController,
    events::{BalancePopup, BalanceRequested, ObjectiveCompleted, RoundPayoutCompleted},
    ledger::{flush_payout_ledger, record_payout_reports, PayoutLedger},
    relay::{answer_balance_requests, relay_balance_changes, BalanceRelay},
    systems::{begin_round_tracking, distribute_round_rewards, register_objective_completions},
};

/// Registers the payout engine. Uses `config/currency.toml` unless a config is supplied.
#[derive(Debug, Clone, Default)]
pub struct CurrencyPlugin {
    config: Option<CurrencyConfig>,
}

impl CurrencyPlugin {
    pub fn with_config(config: CurrencyConfig) -> Self {
        Self {
            config: Some(config),
        }
    }
}

impl Plugin for CurrencyPlugin {
    fn build(&self, app: &mut App) {
        let config = self
            .config
            .clone()
            .unwrap_or_else(CurrencyConfig::load_or_default);
        info!(
            "Currency payouts configured: base {}, min players {}, evac x{}, greentext x{:.2}",
            config.rewards.base_amount,
            config.rewards.minimum_population,
            config.rewards.evacuation_multiplier,
            config.rewards.objective_multiplier
        );

        app.insert_resource(BalanceStore::new(config.display.clone()))
            .insert_resource(PayoutLedger::from_settings(&config.ledger))
            .insert_resource(config)
            .init_resource::<BalanceRelay>()
            .init_resource::<RoundPayoutController>()
            .add_message::<RoundStarted>()
            .add_message::<RoundEnded>()
            .add_message::<ObjectiveCompleted>()
            .add_message::<BalanceRequested>()
            .add_message::<BalancePopup>()
            .add_message::<RoundPayoutCompleted>()
            // The round reset runs first so completions sent alongside RoundStarted count.
            // RoundClock never ends one round and starts the next in the same tick.
            .add_systems(
                Update,
                (
                    begin_round_tracking,
                    register_objective_completions,
                    distribute_round_rewards,
                    relay_balance_changes,
                    answer_balance_requests,
                    record_payout_reports,
                    flush_payout_ledger,
                )
                    .chain()
                    .after(RoundLifecycleSet),
            );
    }
}
