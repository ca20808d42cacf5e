//! RoundPlugin wires the round settings, clock, and lifecycle messages.
use bevy::prelude::*;

use super::{
    events::{RoundEnded, RoundStarted},
    lifecycle::{advance_round_clock, RoundClock, RoundSettings},
};

/// Systems that react to round transitions should run after this set.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoundLifecycleSet;

pub struct RoundPlugin;

impl Plugin for RoundPlugin {
    fn build(&self, app: &mut App) {
        let settings = RoundSettings::load_or_default();
        info!(
            "Round timing configured: lobby {:.0}s, round {:.1} minutes",
            settings.lobby_seconds,
            settings.round_seconds / 60.0
        );

        app.insert_resource(RoundClock::new(&settings))
            .insert_resource(settings)
            .add_message::<RoundStarted>()
            .add_message::<RoundEnded>()
            .add_systems(Update, advance_round_clock.in_set(RoundLifecycleSet));
    }
}
