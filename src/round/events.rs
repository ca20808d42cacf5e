//! Round lifecycle messages. A round's start is always sent before its end.
use bevy::prelude::{Event, Message};

#[derive(Event, Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundStarted {
    pub round: u64,
}

#[derive(Event, Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundEnded {
    pub round: u64,
}
