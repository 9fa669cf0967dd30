use std::fs;
use std::sync::{Arc, Mutex};

use bevy::prelude::*;

use crate::common::test_utils::{run_system_once, sim_world};
use crate::plugins::core::RunLedger;
use crate::plugins::player::Player;
use crate::plugins::player::items::{ItemKind, Loadout};
use crate::plugins::spatial::Health;

use super::*;

/// Keeps every summary it is handed.
#[derive(Clone, Default)]
struct Recorder(Arc<Mutex<Vec<RunSummary>>>);

impl RunSink for Recorder {
    fn record(&mut self, summary: &RunSummary) -> Result<(), PersistError> {
        self.0.lock().unwrap().push(summary.clone());
        Ok(())
    }
}

fn summary(kills: u32) -> RunSummary {
    RunSummary {
        kills,
        items: ["Nothing".into(), "Arsonist".into(), "Nothing".into()],
        hp: 40,
        max_distance: 3,
    }
}

#[test]
fn json_lines_sink_appends_one_object_per_run() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("runs.jsonl");
    let mut sink = JsonLinesSink::new(&path);

    sink.record(&summary(1)).unwrap();
    sink.record(&summary(2)).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
    assert_eq!(second["kills"], 2);
    assert_eq!(second["items"][1], "Arsonist");
    assert_eq!(second["hp"], 40);
    assert_eq!(second["max_distance"], 3);
}

#[test]
fn unwritable_path_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = JsonLinesSink::new(dir.path().join("missing").join("runs.jsonl"));
    assert!(matches!(sink.record(&summary(0)), Err(PersistError::Io(_))));
}

#[test]
fn a_run_is_reported_once() {
    let recorder = Recorder::default();
    let mut reporter = RunReporter::new(recorder.clone());

    reporter.report(&summary(1));
    reporter.report(&summary(2));

    assert!(reporter.reported());
    assert_eq!(*recorder.0.lock().unwrap(), vec![summary(1)]);
}

#[test]
fn report_run_collects_from_the_world() {
    let mut world = sim_world();
    let recorder = Recorder::default();
    world.insert_resource(RunReporter::new(recorder.clone()));
    *world.resource_mut::<RunLedger>() = RunLedger { kills: 4, max_distance: 2 };
    let mut loadout = Loadout::default();
    loadout.slots[0].kind = ItemKind::Shrapnel;
    world.spawn((Player::default(), Health { hp: 0 }, loadout));

    run_system_once(&mut world, report_run);
    run_system_once(&mut world, report_run);

    let seen = recorder.0.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(
        seen[0],
        RunSummary {
            kills: 4,
            items: [ItemKind::Shrapnel.name().into(), "Nothing".into(), "Nothing".into()],
            hp: 0,
            max_distance: 2,
        }
    );
}

#[test]
fn no_reporter_means_nothing_happens() {
    let mut world = sim_world();
    world.spawn((Player::default(), Health { hp: 0 }, Loadout::default()));
    run_system_once(&mut world, report_run);
}
