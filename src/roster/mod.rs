//! Roster module: the character-side facts the payout resolver reads.
pub mod components;

pub use components::{CharacterBody, CharacterKind, Evacuating, JobAssignment, MindLink, Vitality};
