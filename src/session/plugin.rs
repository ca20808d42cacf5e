//! Session plugin wiring the registry and the outbox flush.
use bevy::prelude::*;

use super::{
    components::ParticipantIdGenerator,
    registry::{flush_session_outboxes, SessionRegistry},
};

pub struct SessionPlugin;

impl Plugin for SessionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SessionRegistry>()
            .init_resource::<ParticipantIdGenerator>()
            .add_systems(Last, flush_session_outboxes);
    }
}
