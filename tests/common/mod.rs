//! Integration test harness.
//!
//! Keep integration tests headless:
//! - `MinimalPlugins` provides core ECS runtime and time.
//! - `StatesPlugin` drives `GameState` transitions.
//! - we then call `turret_run::game::configure_headless` to install gameplay plugins.
//!
//! Frame time is fixed so every `update()` is one 50 ms tick, and the world RNG is seeded.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use bevy::ecs::system::RunSystemOnce;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;
use turret_run::plugins::core::WorldRng;
use turret_run::plugins::persistence::{PersistError, RunSink, RunSummary};
use turret_run::plugins::player::Player;
use turret_run::plugins::spatial::Body;

pub const TICK: Duration = Duration::from_millis(50);

pub fn app_headless() -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin))
        .insert_resource(TimeUpdateStrategy::ManualDuration(TICK))
        .insert_resource(WorldRng::seeded(7));

    turret_run::game::configure_headless(&mut app);
    app
}

/// Boot and run the first tick (enters `InGame`, spawns the player and the start cells).
pub fn booted() -> App {
    let mut app = app_headless();
    app.update();
    app
}

pub fn run_once<T, Out, Marker>(app: &mut App, system: T) -> Out
where
    T: IntoSystem<(), Out, Marker>,
{
    let world = app.world_mut();
    let out = world.run_system_once(system).expect("system run failed");
    world.flush();
    out
}

pub fn player_body(app: &mut App) -> Body {
    *app.world_mut().query_filtered::<&Body, With<Player>>().single(app.world()).expect("one player")
}

/// Sink that keeps summaries in memory.
#[derive(Clone, Default)]
pub struct Recorder(pub Arc<Mutex<Vec<RunSummary>>>);

impl Recorder {
    pub fn runs(&self) -> Vec<RunSummary> {
        self.0.lock().unwrap().clone()
    }
}

impl RunSink for Recorder {
    fn record(&mut self, summary: &RunSummary) -> Result<(), PersistError> {
        self.0.lock().unwrap().push(summary.clone());
        Ok(())
    }
}
