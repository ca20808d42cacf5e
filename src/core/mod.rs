//! Core timing shared by the round lifecycle and debug logging.
pub mod plugin;

pub use plugin::{CorePlugin, SimulationClock};
