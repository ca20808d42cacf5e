//! Session module tracks connected participants and their outbound message queues.
pub mod components;
pub mod plugin;
pub mod registry;

pub use components::{ParticipantId, ParticipantIdGenerator};
pub use plugin::SessionPlugin;
pub use registry::{NetMessage, SessionRegistry};
