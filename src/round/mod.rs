//! Round module drives the lobby/round cycle and announces its transitions.
pub mod events;
pub mod lifecycle;
pub mod plugin;

pub use events::{RoundEnded, RoundStarted};
pub use lifecycle::{RoundClock, RoundSettings};
pub use plugin::{RoundLifecycleSet, RoundPlugin};
