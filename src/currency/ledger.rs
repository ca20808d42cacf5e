//! JSON-lines ledger of round payout reports for offline inspection.
use std::{
    fmt,
    fs::{create_dir_all, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};

use bevy::prelude::*;
use serde::Serialize;

use super::{
    config::LedgerSettings, distribution::PayoutReport, events::RoundPayoutCompleted,
};

#[derive(Debug)]
pub enum LedgerError {
    Io(io::Error),
    Encode(serde_json::Error),
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "ledger io failure: {}", err),
            Self::Encode(err) => write!(f, "ledger encode failure: {}", err),
        }
    }
}

impl std::error::Error for LedgerError {}

impl From<io::Error> for LedgerError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PayoutLedgerRecord {
    pub recorded_at_seconds: f64,
    pub report: PayoutReport,
}

/// Buffers payout reports and appends them to disk on flush.
#[derive(Resource, Debug)]
pub struct PayoutLedger {
    output_path: PathBuf,
    enabled: bool,
    pending: Vec<PayoutLedgerRecord>,
}

impl PayoutLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: path.into(),
            enabled: true,
            pending: Vec::new(),
        }
    }

    pub fn from_settings(settings: &LedgerSettings) -> Self {
        Self {
            enabled: settings.enabled,
            ..Self::new(settings.path.clone())
        }
    }

    pub fn push(&mut self, record: PayoutLedgerRecord) {
        if self.enabled {
            self.pending.push(record);
        }
    }

    pub fn path(&self) -> &Path {
        &self.output_path
    }

    #[allow(dead_code)]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn flush(&mut self) -> Result<(), LedgerError> {
        if self.pending.is_empty() {
            return Ok(());
        }

        if let Some(parent) = self.output_path.parent() {
            create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.output_path)?;

        for record in std::mem::take(&mut self.pending) {
            serde_json::to_writer(&mut file, &record)?;
            file.write_all(b"\n")?;
        }

        file.flush()?;
        Ok(())
    }
}

pub fn record_payout_reports(
    time: Res<Time>,
    mut completed: MessageReader<RoundPayoutCompleted>,
    mut ledger: ResMut<PayoutLedger>,
) {
    let now = time.elapsed_secs_f64();
    for event in completed.read() {
        ledger.push(PayoutLedgerRecord {
            recorded_at_seconds: now,
            report: event.report.clone(),
        });
    }
}

pub fn flush_payout_ledger(mut ledger: ResMut<PayoutLedger>) {
    if let Err(err) = ledger.flush() {
        warn!(
            "Failed to persist payout ledger to {:?}: {}",
            ledger.path(),
            err
        );
    }
}
