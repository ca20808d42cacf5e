//! Currency configuration loaded from `config/currency.toml` with environment overrides.
use std::{env, fmt, fs, path::Path, path::PathBuf};

use bevy::prelude::*;
use serde::Deserialize;

use super::reward::RewardConfig;

const CONFIG_PATH: &str = "config/currency.toml";
const DEFAULT_LEDGER_PATH: &str = "logs/currency_payouts.jsonl";

#[derive(Debug, Clone, Deserialize, Default)]
struct RawCurrencyConfig {
    #[serde(default)]
    rewards: RawRewards,
    #[serde(default)]
    display: RawDisplay,
    #[serde(default)]
    ledger: RawLedger,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawRewards {
    base_amount: i64,
    non_antagonist_multiplier: i64,
    server_multiplier: i64,
    minimum_population: i64,
    evacuation_multiplier: i64,
    objective_multiplier: f64,
    reload_each_round: bool,
}

impl Default for RawRewards {
    fn default() -> Self {
        let defaults = RewardConfig::default();
        Self {
            base_amount: defaults.base_amount,
            non_antagonist_multiplier: defaults.non_antagonist_multiplier,
            server_multiplier: defaults.server_multiplier,
            minimum_population: defaults.minimum_population as i64,
            evacuation_multiplier: defaults.evacuation_multiplier,
            objective_multiplier: defaults.objective_multiplier,
            reload_each_round: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawDisplay {
    singular: String,
    plural: String,
}

impl Default for RawDisplay {
    fn default() -> Self {
        Self {
            singular: "penny".to_string(),
            plural: "pennies".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawLedger {
    enabled: bool,
    path: String,
}

impl Default for RawLedger {
    fn default() -> Self {
        Self {
            enabled: true,
            path: DEFAULT_LEDGER_PATH.to_string(),
        }
    }
}

/// Names used when a currency amount is shown to players.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyDisplay {
    pub singular: String,
    pub plural: String,
}

impl Default for CurrencyDisplay {
    fn default() -> Self {
        RawDisplay::default().into()
    }
}

impl From<RawDisplay> for CurrencyDisplay {
    fn from(value: RawDisplay) -> Self {
        let fallback = RawDisplay::default();
        let singular = value.singular.trim();
        let plural = value.plural.trim();
        Self {
            singular: if singular.is_empty() {
                fallback.singular
            } else {
                singular.to_string()
            },
            plural: if plural.is_empty() {
                fallback.plural
            } else {
                plural.to_string()
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerSettings {
    pub enabled: bool,
    pub path: PathBuf,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        RawLedger::default().into()
    }
}

impl From<RawLedger> for LedgerSettings {
    fn from(value: RawLedger) -> Self {
        let path = value.path.trim();
        Self {
            enabled: value.enabled,
            path: if path.is_empty() {
                PathBuf::from(DEFAULT_LEDGER_PATH)
            } else {
                PathBuf::from(path)
            },
        }
    }
}

/// Runtime currency configuration. Replaced wholesale on reload, never edited mid-pass.
#[derive(Resource, Debug, Clone, Default)]
pub struct CurrencyConfig {
    pub rewards: RewardConfig,
    pub display: CurrencyDisplay,
    pub ledger: LedgerSettings,
    pub reload_each_round: bool,
    /// File this config was read from; reloads read it again.
    pub source: Option<PathBuf>,
}

impl CurrencyConfig {
    pub fn load_or_default() -> Self {
        match Self::load_from_file(CONFIG_PATH) {
            Ok(config) => config,
            Err(err) => {
                warn!("{}. Falling back to defaults.", err);
                let mut raw = RawCurrencyConfig::default();
                apply_env_overrides(&mut raw.rewards, |key| env::var(key).ok());
                raw.into()
            }
        }
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, CurrencyConfigError> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|err| CurrencyConfigError::Read {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        let mut raw = Self::parse_raw(path, &data)?;
        apply_env_overrides(&mut raw.rewards, |key| env::var(key).ok());
        Ok(Self {
            source: Some(path.to_path_buf()),
            ..raw.into()
        })
    }

    /// Reads the source file again, or `config/currency.toml` when there is none.
    pub fn reload(&self) -> Result<Self, CurrencyConfigError> {
        let path = self
            .source
            .clone()
            .unwrap_or_else(|| PathBuf::from(CONFIG_PATH));
        Self::load_from_file(path)
    }

    fn parse_raw(path: &Path, data: &str) -> Result<RawCurrencyConfig, CurrencyConfigError> {
        toml::from_str::<RawCurrencyConfig>(data).map_err(|err| CurrencyConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }
}

impl From<RawCurrencyConfig> for CurrencyConfig {
    fn from(value: RawCurrencyConfig) -> Self {
        let raw = value.rewards;
        let defaults = RewardConfig::default();

        let objective_multiplier = if raw.objective_multiplier.is_finite() {
            non_negative_f64("objective_multiplier", raw.objective_multiplier)
        } else {
            warn!(
                "objective_multiplier {} is not finite; using {}",
                raw.objective_multiplier, defaults.objective_multiplier
            );
            defaults.objective_multiplier
        };

        let rewards = RewardConfig {
            base_amount: raw.base_amount,
            non_antagonist_multiplier: non_negative(
                "non_antagonist_multiplier",
                raw.non_antagonist_multiplier,
            ),
            server_multiplier: non_negative("server_multiplier", raw.server_multiplier),
            minimum_population: non_negative("minimum_population", raw.minimum_population)
                as usize,
            evacuation_multiplier: non_negative(
                "evacuation_multiplier",
                raw.evacuation_multiplier,
            ),
            objective_multiplier,
        };

        Self {
            rewards,
            display: value.display.into(),
            ledger: value.ledger.into(),
            reload_each_round: raw.reload_each_round,
            source: None,
        }
    }
}

fn non_negative(name: &str, value: i64) -> i64 {
    if value < 0 {
        warn!("{} cannot be negative ({}); clamping to 0", name, value);
        0
    } else {
        value
    }
}

fn non_negative_f64(name: &str, value: f64) -> f64 {
    if value < 0.0 {
        warn!("{} cannot be negative ({}); clamping to 0", name, value);
        0.0
    } else {
        value
    }
}

/// Server operators can tune payouts without editing the config file.
fn apply_env_overrides(raw: &mut RawRewards, lookup: impl Fn(&str) -> Option<String>) {
    override_value(&lookup, "CURRENCY_BASE_AMOUNT", &mut raw.base_amount);
    override_value(
        &lookup,
        "CURRENCY_NON_ANTAG_MULTIPLIER",
        &mut raw.non_antagonist_multiplier,
    );
    override_value(
        &lookup,
        "CURRENCY_SERVER_MULTIPLIER",
        &mut raw.server_multiplier,
    );
    override_value(&lookup, "CURRENCY_MIN_PLAYERS", &mut raw.minimum_population);
    override_value(
        &lookup,
        "CURRENCY_EVACUATION_MULTIPLIER",
        &mut raw.evacuation_multiplier,
    );
    override_value(
        &lookup,
        "CURRENCY_GREENTEXT_MULTIPLIER",
        &mut raw.objective_multiplier,
    );
}

fn override_value<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    target: &mut T,
) {
    let Some(value) = lookup(key) else {
        return;
    };

    match value.trim().parse::<T>() {
        Ok(parsed) => *target = parsed,
        Err(_) => warn!(
            "{}",
            CurrencyConfigError::InvalidOverride {
                key,
                value: value.clone()
            }
        ),
    }
}

#[derive(Debug, Clone)]
pub enum CurrencyConfigError {
    Read { path: PathBuf, message: String },
    Parse { path: PathBuf, message: String },
    InvalidOverride { key: &'static str, value: String },
}

impl fmt::Display for CurrencyConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, message } => {
                write!(f, "Failed to read {} ({})", path.display(), message)
            }
            Self::Parse { path, message } => {
                write!(f, "Failed to parse {} ({})", path.display(), message)
            }
            Self::InvalidOverride { key, value } => {
                write!(f, "Ignoring {}={:?}: not a valid number", key, value)
            }
        }
    }
}

impl std::error::Error for CurrencyConfigError {}
