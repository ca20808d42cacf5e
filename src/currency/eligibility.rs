//! Resolves which participants are paid at round end and with which attributes.
use crate::{
    roster::{CharacterKind, MindLink},
    session::{ParticipantId, SessionRegistry},
};

use super::reward::RewardAttributes;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EligibleParticipant {
    pub participant: ParticipantId,
    pub attributes: RewardAttributes,
}

impl EligibleParticipant {
    pub fn new(participant: ParticipantId, attributes: RewardAttributes) -> Self {
        Self {
            participant,
            attributes,
        }
    }
}

/// Source of the round-end payout roster.
///
/// Implementations only report connected, reward-eligible participants. The
/// `objective_completion` flag is owned by the payout controller and may be
/// left unset here.
pub trait EligibilityResolver {
    fn resolve_eligible(&self) -> Vec<EligibleParticipant>;
}

impl EligibilityResolver for [EligibleParticipant] {
    fn resolve_eligible(&self) -> Vec<EligibleParticipant> {
        self.to_vec()
    }
}

impl EligibilityResolver for Vec<EligibleParticipant> {
    fn resolve_eligible(&self) -> Vec<EligibleParticipant> {
        self.clone()
    }
}

/// Copy of the roster components for one character.
#[derive(Debug, Clone, Copy)]
pub struct CharacterSnapshot {
    pub kind: CharacterKind,
    pub mind: MindLink,
    pub dead: bool,
    pub job_bonus: i64,
    pub antagonist_eligible: bool,
    pub evacuating: bool,
}

/// Resolver over the ECS roster and live sessions.
pub struct RosterResolver<'a> {
    characters: Vec<CharacterSnapshot>,
    sessions: &'a SessionRegistry,
}

impl<'a> RosterResolver<'a> {
    pub fn new(characters: Vec<CharacterSnapshot>, sessions: &'a SessionRegistry) -> Self {
        Self {
            characters,
            sessions,
        }
    }

    fn resolve_character(&self, character: &CharacterSnapshot) -> Option<EligibleParticipant> {
        if !character.kind.earns_payout() {
            return None;
        }

        if character.dead && !character.kind.ignores_vitality() {
            return None;
        }

        let owner = character.mind.original_owner?;
        let user = character.mind.user?;
        if !self.sessions.is_connected(user) {
            return None;
        }

        Some(EligibleParticipant::new(
            owner,
            RewardAttributes {
                base_eligible: true,
                job_bonus: character.job_bonus,
                antagonist_eligible: character.antagonist_eligible,
                evacuation_success: character.evacuating,
                objective_completion: false,
            },
        ))
    }
}

impl EligibilityResolver for RosterResolver<'_> {
    fn resolve_eligible(&self) -> Vec<EligibleParticipant> {
        self.characters
            .iter()
            .filter_map(|character| self.resolve_character(character))
            .collect()
    }
}
