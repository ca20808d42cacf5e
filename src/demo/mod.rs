//! Demo crew that exercises the payout engine on a headless server.
pub mod plugin;
pub mod systems;

pub use plugin::DemoCrewPlugin;
