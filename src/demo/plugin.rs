//! Demo plugin wiring the scripted crew.
use bevy::prelude::*;

use crate::round::RoundLifecycleSet;

use super::systems::{
    log_payout_summaries, play_out_round, reset_crew_for_round, spawn_demo_crew, DemoRoundScript,
};

pub struct DemoCrewPlugin;

impl Plugin for DemoCrewPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DemoRoundScript>()
            .add_systems(Startup, spawn_demo_crew)
            .add_systems(
                Update,
                (reset_crew_for_round, play_out_round, log_payout_summaries)
                    .chain()
                    .after(RoundLifecycleSet),
            );
    }
}
