//! Round-end reward calculation.
use serde::Serialize;

/// Facts about one participant's round that feed the payout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RewardAttributes {
    pub base_eligible: bool,
    pub job_bonus: i64,
    pub antagonist_eligible: bool,
    pub evacuation_success: bool,
    pub objective_completion: bool,
}

/// Multipliers and thresholds applied at round end.
#[derive(Debug, Clone, PartialEq)]
pub struct RewardConfig {
    pub base_amount: i64,
    pub non_antagonist_multiplier: i64,
    pub server_multiplier: i64,
    pub minimum_population: usize,
    pub evacuation_multiplier: i64,
    pub objective_multiplier: f64,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            base_amount: 10,
            non_antagonist_multiplier: 1,
            server_multiplier: 1,
            minimum_population: 0,
            evacuation_multiplier: 3,
            objective_multiplier: 1.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardStep {
    Base,
    NonAntagonist,
    Server,
    Evacuation,
    Objective,
}

impl RewardStep {
    pub fn label(self) -> &'static str {
        match self {
            Self::Base => "base + job",
            Self::NonAntagonist => "non-antagonist",
            Self::Server => "server",
            Self::Evacuation => "evacuation",
            Self::Objective => "objective",
        }
    }
}

/// Running total after each step that applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RewardBreakdown {
    pub steps: Vec<(RewardStep, i64)>,
    pub total: i64,
}

impl RewardBreakdown {
    fn start(amount: i64) -> Self {
        Self {
            steps: vec![(RewardStep::Base, amount)],
            total: amount,
        }
    }

    fn apply(&mut self, step: RewardStep, amount: i64) {
        self.total = amount;
        self.steps.push((step, amount));
    }

    pub fn describe(&self) -> String {
        self.steps
            .iter()
            .map(|(step, amount)| format!("{}={}", step.label(), amount))
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

#[cfg_attr(not(test), allow(dead_code))]
pub fn compute_reward(attributes: &RewardAttributes, config: &RewardConfig) -> i64 {
    compute_reward_breakdown(attributes, config).total
}

/// Applies the payout steps in their fixed order. The objective multiplier
/// truncates toward zero.
pub fn compute_reward_breakdown(
    attributes: &RewardAttributes,
    config: &RewardConfig,
) -> RewardBreakdown {
    let mut breakdown =
        RewardBreakdown::start(config.base_amount.saturating_add(attributes.job_bonus));

    if !attributes.antagonist_eligible {
        let amount = breakdown
            .total
            .saturating_mul(config.non_antagonist_multiplier);
        breakdown.apply(RewardStep::NonAntagonist, amount);
    }

    if config.server_multiplier != 1 {
        let amount = breakdown.total.saturating_mul(config.server_multiplier);
        breakdown.apply(RewardStep::Server, amount);
    }

    if attributes.evacuation_success {
        let amount = breakdown.total.saturating_mul(config.evacuation_multiplier);
        breakdown.apply(RewardStep::Evacuation, amount);
    }

    if attributes.objective_completion {
        let amount = (breakdown.total as f64 * config.objective_multiplier).trunc() as i64;
        breakdown.apply(RewardStep::Objective, amount);
    }

    breakdown
}
