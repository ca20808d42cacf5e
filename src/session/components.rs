//! Participant identity shared by sessions, the roster, and the currency store.
use std::fmt;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Stable identifier for a connected account. Survives reconnects within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(u64);

impl ParticipantId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{:04}", self.0)
    }
}

/// Resource that issues monotonically increasing participant ids.
#[derive(Resource, Debug)]
pub struct ParticipantIdGenerator {
    next: u64,
}

impl Default for ParticipantIdGenerator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl ParticipantIdGenerator {
    pub fn next_id(&mut self) -> ParticipantId {
        let id = self.next;
        self.next += 1;
        ParticipantId::new(id)
    }
}
