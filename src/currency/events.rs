//! Messages into and out of the currency systems.
use bevy::prelude::{Entity, Event, Message};

use crate::session::ParticipantId;

use super::distribution::PayoutReport;

/// A participant completed their round objectives (greentext).
#[derive(Event, Message, Debug, Clone, Copy)]
pub struct ObjectiveCompleted {
    pub participant: ParticipantId,
}

/// A client asked for its current balance.
#[derive(Event, Message, Debug, Clone, Copy)]
pub struct BalanceRequested {
    pub participant: ParticipantId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupStyle {
    Medium,
    MediumCaution,
}

/// Cosmetic "+N"/"-N" popup over the participant's character.
#[derive(Event, Message, Debug, Clone)]
pub struct BalancePopup {
    pub participant: ParticipantId,
    pub entity: Entity,
    pub text: String,
    pub style: PopupStyle,
}

/// Fired after a round-end pass applied its awards.
#[derive(Event, Message, Debug, Clone)]
pub struct RoundPayoutCompleted {
    pub report: PayoutReport,
}
