//! Systems binding round lifecycle messages to the payout controller.
use bevy::prelude::*;

use crate::{
    roster::{CharacterBody, Evacuating, JobAssignment, MindLink, Vitality},
    round::{RoundEnded, RoundStarted},
    session::SessionRegistry,
};

use super::{
    balance::BalanceStore,
    config::CurrencyConfig,
    distribution::{RoundPayoutController, RoundPayoutOutcome},
    eligibility::{CharacterSnapshot, RosterResolver},
    events::{ObjectiveCompleted, RoundPayoutCompleted},
    ledger::PayoutLedger,
};

pub type RosterQuery<'w, 's> = Query<
    'w,
    's,
    (
        &'static CharacterBody,
        &'static MindLink,
        Option<&'static Vitality>,
        Option<&'static JobAssignment>,
        Has<Evacuating>,
    ),
>;

pub fn register_objective_completions(
    mut completions: MessageReader<ObjectiveCompleted>,
    mut controller: ResMut<RoundPayoutController>,
) {
    for event in completions.read() {
        controller.register_objective_completion(event.participant);
    }
}

pub fn distribute_round_rewards(
    mut ended: MessageReader<RoundEnded>,
    config: Res<CurrencyConfig>,
    sessions: Res<SessionRegistry>,
    roster: RosterQuery,
    mut controller: ResMut<RoundPayoutController>,
    mut store: ResMut<BalanceStore>,
    mut completed: MessageWriter<RoundPayoutCompleted>,
) {
    for event in ended.read() {
        if event.round != controller.round() {
            warn!(
                "Round {} ended while payouts track round {}",
                event.round,
                controller.round()
            );
        }

        let rewards = config.rewards.clone();
        let resolver = RosterResolver::new(snapshot_roster(&roster), &sessions);
        let outcome =
            controller.distribute(sessions.player_count(), &resolver, &rewards, &mut store);

        if let RoundPayoutOutcome::Distributed(report) = outcome {
            completed.write(RoundPayoutCompleted { report });
        }
    }
}

/// Resets objective tracking for the new round, reloading config first when enabled.
pub fn begin_round_tracking(
    mut started: MessageReader<RoundStarted>,
    mut controller: ResMut<RoundPayoutController>,
    mut config: ResMut<CurrencyConfig>,
    mut store: ResMut<BalanceStore>,
    mut ledger: ResMut<PayoutLedger>,
) {
    for event in started.read() {
        if config.reload_each_round {
            reload_currency_config(event.round, &mut config, &mut store, &mut ledger);
        }
        controller.begin_round(event.round);
    }
}

fn reload_currency_config(
    round: u64,
    config: &mut CurrencyConfig,
    store: &mut BalanceStore,
    ledger: &mut PayoutLedger,
) {
    let reloaded = match config.reload() {
        Ok(reloaded) => reloaded,
        Err(err) => {
            warn!("{}. Keeping current currency config.", err);
            return;
        }
    };

    if reloaded.rewards != config.rewards {
        info!("Currency rewards reloaded for round {}", round);
    }
    if reloaded.ledger != config.ledger {
        if let Err(err) = ledger.flush() {
            warn!("Failed to persist payout ledger to {:?}: {}", ledger.path(), err);
        }
        *ledger = PayoutLedger::from_settings(&reloaded.ledger);
        info!("Payout ledger now writes to {:?}", ledger.path());
    }
    store.set_display(reloaded.display.clone());
    *config = reloaded;
}

fn snapshot_roster(roster: &RosterQuery) -> Vec<CharacterSnapshot> {
    roster
        .iter()
        .map(|(body, mind, vitality, job, evacuating)| CharacterSnapshot {
            kind: body.kind,
            mind: *mind,
            dead: vitality.is_some_and(|vitality| vitality.is_dead()),
            job_bonus: job.map_or(0, |job| job.bonus),
            antagonist_eligible: job.map_or(true, |job| job.antagonist_eligible),
            evacuating,
        })
        .collect()
}
