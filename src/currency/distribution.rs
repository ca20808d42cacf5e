//! Per-round payout bookkeeping: objective tracking, the population gate, and
//! the once-per-round distribution pass.
use std::collections::HashSet;

use bevy::prelude::*;
use serde::Serialize;

use crate::session::ParticipantId;

use super::{
    balance::BalanceStore,
    eligibility::EligibilityResolver,
    reward::{compute_reward_breakdown, RewardAttributes, RewardConfig},
};

/// One applied award.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayoutEntry {
    pub participant: ParticipantId,
    pub attributes: RewardAttributes,
    pub amount: i64,
    pub new_balance: i64,
}

/// Summary of a completed distribution pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayoutReport {
    pub round: u64,
    pub population: usize,
    pub entries: Vec<PayoutEntry>,
    pub duplicates_dropped: usize,
    pub total_awarded: i64,
}

impl PayoutReport {
    pub fn amount_for(&self, participant: ParticipantId) -> Option<i64> {
        self.entries
            .iter()
            .find(|entry| entry.participant == participant)
            .map(|entry| entry.amount)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundPayoutOutcome {
    /// Population gate not met; nothing was touched.
    Skipped { population: usize, minimum: usize },
    /// The round already paid out.
    AlreadyDistributed { round: u64 },
    Distributed(PayoutReport),
}

/// Owns the objective-completion set for the current round and runs the payout pass.
#[derive(Resource, Debug, Default)]
pub struct RoundPayoutController {
    round: u64,
    completed_objectives: HashSet<ParticipantId>,
    distributed: bool,
}

impl RoundPayoutController {
    pub fn round(&self) -> u64 {
        self.round
    }

    /// Starts tracking a new round. The completion set is cleared only here.
    pub fn begin_round(&mut self, round: u64) {
        let cleared = self.completed_objectives.len();
        self.round = round;
        self.completed_objectives.clear();
        self.distributed = false;
        info!(
            "Round {} started; cleared {} objective completions",
            round, cleared
        );
    }

    /// Records a greentext for the current round. Returns `false` if it was already recorded.
    pub fn register_objective_completion(&mut self, participant: ParticipantId) -> bool {
        let inserted = self.completed_objectives.insert(participant);
        if inserted {
            info!(
                "Registered objective completion for {} in round {}",
                participant, self.round
            );
        }
        inserted
    }

    pub fn has_completed_objective(&self, participant: ParticipantId) -> bool {
        self.completed_objectives.contains(&participant)
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn completed_count(&self) -> usize {
        self.completed_objectives.len()
    }

    /// Runs the round-end pass. Duplicate identities from the resolver keep
    /// their first entry.
    pub fn distribute<R>(
        &mut self,
        population: usize,
        resolver: &R,
        config: &RewardConfig,
        store: &mut BalanceStore,
    ) -> RoundPayoutOutcome
    where
        R: EligibilityResolver + ?Sized,
    {
        info!(
            "Round {} ended. Player count: {}, min required: {}",
            self.round, population, config.minimum_population
        );
        if population < config.minimum_population {
            info!("Not enough players for payout distribution; skipping");
            return RoundPayoutOutcome::Skipped {
                population,
                minimum: config.minimum_population,
            };
        }

        if self.distributed {
            warn!(
                "Round {} already paid out; ignoring repeated round end",
                self.round
            );
            return RoundPayoutOutcome::AlreadyDistributed { round: self.round };
        }
        self.distributed = true;

        let mut seen = HashSet::new();
        let mut duplicates_dropped = 0;
        let mut entries = Vec::new();
        let mut total_awarded: i64 = 0;

        for candidate in resolver.resolve_eligible() {
            if !seen.insert(candidate.participant) {
                duplicates_dropped += 1;
                warn!(
                    "{} resolved more than once in round {}; keeping the first entry",
                    candidate.participant, self.round
                );
                continue;
            }

            if !candidate.attributes.base_eligible {
                continue;
            }

            let attributes = RewardAttributes {
                objective_completion: self.has_completed_objective(candidate.participant),
                ..candidate.attributes
            };
            let breakdown = compute_reward_breakdown(&attributes, config);
            debug!(
                "Payout for {}: {}",
                candidate.participant,
                breakdown.describe()
            );

            let change = store.add_currency(candidate.participant, breakdown.total);
            total_awarded = total_awarded.saturating_add(breakdown.total);
            entries.push(PayoutEntry {
                participant: candidate.participant,
                attributes,
                amount: breakdown.total,
                new_balance: change.new_balance,
            });
        }

        info!(
            "Round {} payout: {} participants, {} awarded",
            self.round,
            entries.len(),
            store.stringify(total_awarded)
        );

        RoundPayoutOutcome::Distributed(PayoutReport {
            round: self.round,
            population,
            entries,
            duplicates_dropped,
            total_awarded,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::eligibility::EligibleParticipant;

    fn eligible(id: u64, attributes: RewardAttributes) -> EligibleParticipant {
        EligibleParticipant::new(
            ParticipantId::new(id),
            RewardAttributes {
                base_eligible: true,
                ..attributes
            },
        )
    }

    fn antagonist_capable() -> RewardAttributes {
        RewardAttributes {
            antagonist_eligible: true,
            ..RewardAttributes::default()
        }
    }

    fn expect_report(outcome: RoundPayoutOutcome) -> PayoutReport {
        match outcome {
            RoundPayoutOutcome::Distributed(report) => report,
            other => panic!("expected a distribution, got {:?}", other),
        }
    }

    #[test]
    fn population_gate_blocks_every_mutation() {
        let mut controller = RoundPayoutController::default();
        let mut store = BalanceStore::default();
        let feed = store.subscribe();
        store.add_currency(ParticipantId::new(1), 40);
        feed.drain();

        let config = RewardConfig {
            minimum_population: 10,
            ..RewardConfig::default()
        };
        let roster: Vec<_> = (1..=5).map(|id| eligible(id, antagonist_capable())).collect();

        controller.begin_round(1);
        let outcome = controller.distribute(5, &roster, &config, &mut store);

        assert_eq!(
            outcome,
            RoundPayoutOutcome::Skipped {
                population: 5,
                minimum: 10
            }
        );
        assert_eq!(store.balance(ParticipantId::new(1)), 40);
        assert_eq!(store.balance(ParticipantId::new(2)), 0);
        assert!(feed.drain().is_empty());
    }

    #[test]
    fn population_equal_to_minimum_pays_out() {
        let mut controller = RoundPayoutController::default();
        let mut store = BalanceStore::default();
        let config = RewardConfig {
            minimum_population: 2,
            ..RewardConfig::default()
        };
        let roster = vec![eligible(1, antagonist_capable())];

        let report = expect_report(controller.distribute(2, &roster, &config, &mut store));
        assert_eq!(report.entries.len(), 1);
        assert_eq!(store.balance(ParticipantId::new(1)), 10);
    }

    #[test]
    fn duplicate_registration_counts_once() {
        let mut controller = RoundPayoutController::default();
        let mut store = BalanceStore::default();
        let id = ParticipantId::new(3);

        controller.begin_round(1);
        assert!(controller.register_objective_completion(id));
        assert!(!controller.register_objective_completion(id));
        assert_eq!(controller.completed_count(), 1);

        let roster = vec![eligible(3, antagonist_capable())];
        let report = expect_report(controller.distribute(
            1,
            &roster,
            &RewardConfig::default(),
            &mut store,
        ));

        // 10 * 1.5, same as a single registration
        assert_eq!(report.amount_for(id), Some(15));
        assert!(report.entries[0].attributes.objective_completion);
    }

    #[test]
    fn round_start_clears_previous_completions() {
        let mut controller = RoundPayoutController::default();
        let mut store = BalanceStore::default();
        let early = ParticipantId::new(1);
        let late = ParticipantId::new(2);

        controller.begin_round(1);
        controller.register_objective_completion(early);
        controller.register_objective_completion(ParticipantId::new(9));
        controller.begin_round(2);
        assert_eq!(controller.completed_count(), 0);
        controller.register_objective_completion(late);

        let roster = vec![
            eligible(1, antagonist_capable()),
            eligible(2, antagonist_capable()),
        ];
        let report = expect_report(controller.distribute(
            2,
            &roster,
            &RewardConfig::default(),
            &mut store,
        ));

        assert_eq!(report.round, 2);
        assert_eq!(report.amount_for(early), Some(10));
        assert_eq!(report.amount_for(late), Some(15));
    }

    #[test]
    fn duplicate_identities_keep_first_entry() {
        let mut controller = RoundPayoutController::default();
        let mut store = BalanceStore::default();
        let feed = store.subscribe();
        let roster = vec![
            eligible(
                4,
                RewardAttributes {
                    job_bonus: 5,
                    ..antagonist_capable()
                },
            ),
            eligible(
                4,
                RewardAttributes {
                    job_bonus: 100,
                    ..antagonist_capable()
                },
            ),
        ];

        let report = expect_report(controller.distribute(
            1,
            &roster,
            &RewardConfig::default(),
            &mut store,
        ));

        assert_eq!(report.duplicates_dropped, 1);
        assert_eq!(report.entries.len(), 1);
        assert_eq!(store.balance(ParticipantId::new(4)), 15);
        assert_eq!(feed.drain().len(), 1);
    }

    #[test]
    fn second_round_end_in_same_round_is_ignored() {
        let mut controller = RoundPayoutController::default();
        let mut store = BalanceStore::default();
        let roster = vec![eligible(1, antagonist_capable())];
        let config = RewardConfig::default();

        controller.begin_round(7);
        expect_report(controller.distribute(1, &roster, &config, &mut store));
        let repeat = controller.distribute(1, &roster, &config, &mut store);

        assert_eq!(repeat, RoundPayoutOutcome::AlreadyDistributed { round: 7 });
        assert_eq!(store.balance(ParticipantId::new(1)), 10);

        controller.begin_round(8);
        expect_report(controller.distribute(1, &roster, &config, &mut store));
        assert_eq!(store.balance(ParticipantId::new(1)), 20);
    }

    #[test]
    fn ineligible_entries_are_skipped() {
        let mut controller = RoundPayoutController::default();
        let mut store = BalanceStore::default();
        let roster = [EligibleParticipant::new(
            ParticipantId::new(6),
            RewardAttributes::default(),
        )];

        let report = expect_report(controller.distribute(
            1,
            &roster[..],
            &RewardConfig::default(),
            &mut store,
        ));

        assert!(report.entries.is_empty());
        assert_eq!(store.balance(ParticipantId::new(6)), 0);
    }

    #[test]
    fn report_totals_each_award() {
        let mut controller = RoundPayoutController::default();
        let mut store = BalanceStore::default();
        store.add_currency(ParticipantId::new(2), 100);
        let config = RewardConfig {
            non_antagonist_multiplier: 2,
            ..RewardConfig::default()
        };
        let roster = vec![
            eligible(
                1,
                RewardAttributes {
                    job_bonus: 5,
                    ..RewardAttributes::default()
                },
            ),
            eligible(
                2,
                RewardAttributes {
                    evacuation_success: true,
                    ..antagonist_capable()
                },
            ),
        ];

        let report = expect_report(controller.distribute(3, &roster, &config, &mut store));

        assert_eq!(report.amount_for(ParticipantId::new(1)), Some(30));
        assert_eq!(report.amount_for(ParticipantId::new(2)), Some(30));
        assert_eq!(report.total_awarded, 60);
        assert_eq!(report.entries[1].new_balance, 130);
        assert_eq!(report.population, 3);
    }
}
