use std::{path::Path, time::Duration};

use bevy::{app::ScheduleRunnerPlugin, log::LogPlugin, prelude::*};

mod core;
mod currency;
mod demo;
mod roster;
mod round;
mod session;

use crate::{
    core::CorePlugin, currency::CurrencyPlugin, demo::DemoCrewPlugin, round::RoundPlugin,
    session::SessionPlugin,
};

const TICKS_PER_SECOND: f64 = 30.0;

fn main() {
    load_server_env();

    App::new()
        .add_plugins((
            MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
                1.0 / TICKS_PER_SECOND,
            ))),
            LogPlugin::default(),
            CorePlugin::with_time_scale(time_scale_from_env()),
            SessionPlugin,
            RoundPlugin,
            CurrencyPlugin::default(),
            DemoCrewPlugin, // After CurrencyPlugin so payout messages are registered
        ))
        .run();
}

fn load_server_env() {
    const SERVER_ENV_FILE: &str = "server.env";

    let path = Path::new(SERVER_ENV_FILE);
    if !path.exists() {
        return;
    }

    if let Err(err) = dotenvy::from_filename(path) {
        eprintln!("Failed to load {}: {}", SERVER_ENV_FILE, err);
    }
}

fn time_scale_from_env() -> f32 {
    std::env::var("SERVER_TIME_SCALE")
        .ok()
        .and_then(|value| value.trim().parse::<f32>().ok())
        .filter(|value| *value > 0.0)
        .unwrap_or(1.0)
}
