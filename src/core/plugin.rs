//! CorePlugin owns the server tick clock that paces the lobby and round timers.
use bevy::prelude::*;
use std::time::Duration;

const DEFAULT_TIME_SCALE: f32 = 1.0;
const MIN_TIME_SCALE: f32 = 0.001;
#[cfg(feature = "core_debug")]
const DEBUG_LOG_EVERY_TICKS: u64 = 150;

/// Scaled server time. Advanced once per frame in `First`, before any round logic reads it.
#[derive(Resource, Debug)]
pub struct SimulationClock {
    time_scale: f32,
    ticks: u64,
    last_scaled_delta: Duration,
}

impl SimulationClock {
    pub fn new(time_scale: f32) -> Self {
        Self {
            time_scale: time_scale.max(MIN_TIME_SCALE),
            ticks: 0,
            last_scaled_delta: Duration::ZERO,
        }
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    #[cfg_attr(not(any(test, feature = "core_debug")), allow(dead_code))]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Server time that passed during the latest tick.
    pub fn last_scaled_delta(&self) -> Duration {
        self.last_scaled_delta
    }

    pub fn tick(&mut self, real_delta: Duration) {
        self.ticks = self.ticks.saturating_add(1);
        self.last_scaled_delta = real_delta.mul_f32(self.time_scale);
    }
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self::new(DEFAULT_TIME_SCALE)
    }
}

/// A larger time scale shortens lobbies and rounds in wall time.
#[derive(Debug, Clone, Copy)]
pub struct CorePlugin {
    time_scale: f32,
}

impl CorePlugin {
    pub const fn with_time_scale(time_scale: f32) -> Self {
        Self { time_scale }
    }
}

impl Default for CorePlugin {
    fn default() -> Self {
        Self::with_time_scale(DEFAULT_TIME_SCALE)
    }
}

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(SimulationClock::new(self.time_scale))
            .add_systems(Startup, announce_server_clock)
            .add_systems(First, advance_server_clock);

        #[cfg(feature = "core_debug")]
        app.add_systems(Last, log_server_ticks);
    }
}

fn advance_server_clock(mut clock: ResMut<SimulationClock>, time: Res<Time>) {
    clock.tick(time.delta());
}

fn announce_server_clock(clock: Res<SimulationClock>) {
    if (clock.time_scale() - DEFAULT_TIME_SCALE).abs() < f32::EPSILON {
        info!("Server clock running in real time");
    } else {
        info!("Server clock running {:.3}x faster than real time", clock.time_scale());
    }
}

#[cfg(feature = "core_debug")]
fn log_server_ticks(clock: Res<SimulationClock>) {
    if clock.ticks() % DEBUG_LOG_EVERY_TICKS == 0 {
        debug!(
            target: "core_debug",
            "tick {} | dt {:.4}s",
            clock.ticks(),
            clock.last_scaled_delta().as_secs_f32(),
        );
    }
}
