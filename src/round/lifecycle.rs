//! Round timing configuration and the lobby/round state machine.
use std::{fs, path::Path};

use bevy::prelude::*;
use serde::Deserialize;

use crate::core::SimulationClock;

use super::events::{RoundEnded, RoundStarted};

const CONFIG_PATH: &str = "config/round.toml";
const MIN_PHASE_SECONDS: f32 = 1.0;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawRoundConfig {
    lobby_seconds: f32,
    round_minutes: f32,
}

impl Default for RawRoundConfig {
    fn default() -> Self {
        Self {
            lobby_seconds: 30.0,
            round_minutes: 60.0,
        }
    }
}

/// Phase lengths in scaled seconds.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct RoundSettings {
    pub lobby_seconds: f32,
    pub round_seconds: f32,
}

impl RoundSettings {
    pub fn load_or_default() -> Self {
        let path = Path::new(CONFIG_PATH);
        match fs::read_to_string(path) {
            Ok(data) => match toml::from_str::<RawRoundConfig>(&data) {
                Ok(raw) => raw.into(),
                Err(err) => {
                    warn!(
                        "Failed to parse {} ({}). Falling back to defaults.",
                        CONFIG_PATH, err
                    );
                    RawRoundConfig::default().into()
                }
            },
            Err(err) => {
                warn!(
                    "Failed to read {} ({}). Falling back to defaults.",
                    CONFIG_PATH, err
                );
                RawRoundConfig::default().into()
            }
        }
    }
}

impl From<RawRoundConfig> for RoundSettings {
    fn from(value: RawRoundConfig) -> Self {
        Self {
            lobby_seconds: sanitize(value.lobby_seconds),
            round_seconds: sanitize(value.round_minutes * 60.0),
        }
    }
}

fn sanitize(seconds: f32) -> f32 {
    if seconds.is_finite() {
        seconds.max(MIN_PHASE_SECONDS)
    } else {
        MIN_PHASE_SECONDS
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RoundPhase {
    Lobby { remaining: f32 },
    Running { round: u64, remaining: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundTransition {
    Started(u64),
    Ended(u64),
}

/// Alternates lobby and round phases. At most one transition per tick, so a
/// round end and the next start never share a frame.
#[derive(Resource, Debug)]
pub struct RoundClock {
    phase: RoundPhase,
    rounds_started: u64,
}

impl RoundClock {
    pub fn new(settings: &RoundSettings) -> Self {
        Self {
            phase: RoundPhase::Lobby {
                remaining: settings.lobby_seconds,
            },
            rounds_started: 0,
        }
    }

    pub fn current_round(&self) -> Option<u64> {
        match self.phase {
            RoundPhase::Running { round, .. } => Some(round),
            RoundPhase::Lobby { .. } => None,
        }
    }

    /// Fraction of the running round left, or `None` in the lobby.
    pub fn round_fraction_remaining(&self, settings: &RoundSettings) -> Option<f32> {
        match self.phase {
            RoundPhase::Running { remaining, .. } => {
                Some((remaining / settings.round_seconds).clamp(0.0, 1.0))
            }
            RoundPhase::Lobby { .. } => None,
        }
    }

    pub fn tick(&mut self, delta_seconds: f32, settings: &RoundSettings) -> Option<RoundTransition> {
        if !delta_seconds.is_finite() || delta_seconds < 0.0 {
            return None;
        }

        match &mut self.phase {
            RoundPhase::Lobby { remaining } => {
                *remaining -= delta_seconds;
                if *remaining > 0.0 {
                    return None;
                }
                self.rounds_started += 1;
                let round = self.rounds_started;
                self.phase = RoundPhase::Running {
                    round,
                    remaining: settings.round_seconds,
                };
                Some(RoundTransition::Started(round))
            }
            RoundPhase::Running { round, remaining } => {
                *remaining -= delta_seconds;
                if *remaining > 0.0 {
                    return None;
                }
                let ended = *round;
                self.phase = RoundPhase::Lobby {
                    remaining: settings.lobby_seconds,
                };
                Some(RoundTransition::Ended(ended))
            }
        }
    }
}

pub fn advance_round_clock(
    mut clock: ResMut<RoundClock>,
    settings: Res<RoundSettings>,
    simulation_clock: Res<SimulationClock>,
    mut started: MessageWriter<RoundStarted>,
    mut ended: MessageWriter<RoundEnded>,
) {
    let delta = simulation_clock.last_scaled_delta().as_secs_f32();
    match clock.tick(delta, &settings) {
        Some(RoundTransition::Started(round)) => {
            info!("Round {} starting", round);
            started.write(RoundStarted { round });
        }
        Some(RoundTransition::Ended(round)) => {
            info!("Round {} over", round);
            ended.write(RoundEnded { round });
        }
        None => {}
    }
}
