//! Run reporting.
//!
//! When a run ends (player death, or the app closing mid-run) the core hands a
//! [`RunSummary`] to a [`RunSink`]. The sink owns storage; the game never reads history back.
//!
//! The default sink appends one JSON object per line to `runs.jsonl`.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use bevy::prelude::*;
use serde::Serialize;

use crate::common::state::GameState;
use crate::plugins::core::RunLedger;
use crate::plugins::player::Player;
use crate::plugins::player::items::{LOADOUT_SLOTS, Loadout};
use crate::plugins::spatial::Health;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub kills: u32,
    pub items: [String; LOADOUT_SLOTS],
    pub hp: i32,
    /// Chebyshev distance in cells from the start cell.
    pub max_distance: u32,
}

impl RunSummary {
    pub fn collect(ledger: &RunLedger, loadout: &Loadout, health: &Health) -> Self {
        Self {
            kills: ledger.kills,
            items: loadout.kinds().map(|k| k.name().to_owned()),
            hp: health.hp,
            max_distance: ledger.max_distance,
        }
    }
}

#[derive(Debug)]
pub enum PersistError {
    Io(std::io::Error),
    Serialize(serde_json::Error),
}

impl fmt::Display for PersistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistError::Io(e) => write!(f, "cannot write run summary: {e}"),
            PersistError::Serialize(e) => write!(f, "cannot encode run summary: {e}"),
        }
    }
}

impl std::error::Error for PersistError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PersistError::Io(e) => Some(e),
            PersistError::Serialize(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for PersistError {
    fn from(e: std::io::Error) -> Self {
        PersistError::Io(e)
    }
}

impl From<serde_json::Error> for PersistError {
    fn from(e: serde_json::Error) -> Self {
        PersistError::Serialize(e)
    }
}

pub trait RunSink {
    fn record(&mut self, summary: &RunSummary) -> Result<(), PersistError>;
}

/// Appends one JSON line per run.
#[derive(Debug, Clone)]
pub struct JsonLinesSink {
    pub path: PathBuf,
}

impl JsonLinesSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RunSink for JsonLinesSink {
    fn record(&mut self, summary: &RunSummary) -> Result<(), PersistError> {
        let mut line = serde_json::to_string(summary)?;
        line.push('\n');
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }
}

/// Optional: without a reporter, runs simply are not recorded.
#[derive(Resource)]
pub struct RunReporter {
    sink: Box<dyn RunSink + Send + Sync>,
    reported: bool,
}

impl RunReporter {
    pub fn new(sink: impl RunSink + Send + Sync + 'static) -> Self {
        Self { sink: Box::new(sink), reported: false }
    }

    pub fn reported(&self) -> bool {
        self.reported
    }

    /// Hand `summary` to the sink unless this run was already reported.
    pub fn report(&mut self, summary: &RunSummary) {
        if self.reported {
            return;
        }
        self.reported = true;
        match self.sink.record(summary) {
            Ok(()) => info!(?summary, "run recorded"),
            Err(e) => error!("{e}"),
        }
    }
}

pub fn plugin(app: &mut App) {
    app.add_systems(OnEnter(GameState::GameOver), report_run)
        .add_systems(Last, report_run.run_if(on_message::<AppExit>));
}

pub fn report_run(
    ledger: Res<RunLedger>,
    reporter: Option<ResMut<RunReporter>>,
    player: Option<Single<(&Loadout, &Health), With<Player>>>,
) {
    let (Some(mut reporter), Some(player)) = (reporter, player) else {
        return;
    };
    let (loadout, health) = *player;
    reporter.report(&RunSummary::collect(&ledger, loadout, health));
}

#[cfg(test)]
mod tests;
