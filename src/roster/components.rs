//! Components describing a character, who owns it, and how its round went.
use bevy::prelude::*;

use crate::session::ParticipantId;

/// Kind of body a mind is housed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharacterKind {
    Humanoid,
    BorgBrain,
    BorgChassis,
    Simple,
}

impl CharacterKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Humanoid => "humanoid",
            Self::BorgBrain => "borg brain",
            Self::BorgChassis => "borg chassis",
            Self::Simple => "simple mob",
        }
    }

    /// Whether this body can earn a round payout at all.
    pub fn earns_payout(self) -> bool {
        matches!(self, Self::Humanoid | Self::BorgBrain | Self::BorgChassis)
    }

    /// Chassis are treated as dead by the health model, so they are exempt from the alive check.
    pub fn ignores_vitality(self) -> bool {
        matches!(self, Self::BorgChassis)
    }
}

#[derive(Component, Debug, Clone, Copy)]
pub struct CharacterBody {
    pub kind: CharacterKind,
}

impl CharacterBody {
    pub fn new(kind: CharacterKind) -> Self {
        Self { kind }
    }
}

/// Links a body to the accounts behind its mind.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct MindLink {
    /// Account the mind was created for. Payouts go here.
    pub original_owner: Option<ParticipantId>,
    /// Account currently controlling the mind. Must be connected to be paid.
    pub user: Option<ParticipantId>,
}

impl MindLink {
    pub fn owned_by(participant: ParticipantId) -> Self {
        Self {
            original_owner: Some(participant),
            user: Some(participant),
        }
    }
}

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Vitality {
    #[default]
    Alive,
    Dead,
}

impl Vitality {
    pub fn is_dead(self) -> bool {
        matches!(self, Self::Dead)
    }
}

/// Job held this round.
#[derive(Component, Debug, Clone)]
pub struct JobAssignment {
    pub job: String,
    pub bonus: i64,
    pub antagonist_eligible: bool,
}

impl JobAssignment {
    pub fn new(job: impl Into<String>, bonus: i64, antagonist_eligible: bool) -> Self {
        Self {
            job: job.into(),
            bonus,
            antagonist_eligible,
        }
    }
}

/// Marker for a character currently leaving on the evacuation shuttle.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Evacuating;
