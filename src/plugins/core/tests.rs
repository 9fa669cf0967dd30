use bevy::prelude::*;
use bevy::state::app::StatesPlugin;

use crate::common::clock::SimClock;
use crate::common::state::GameState;
use crate::common::test_utils::run_system_once;
use crate::common::tunables::Tunables;
use crate::plugins::core;
use crate::plugins::spatial::{PendingDespawn, Serials};

use super::*;

#[test]
fn inserts_resources() {
    let mut app = App::new();
    core::plugin(&mut app);
    assert!(app.world().get_resource::<Tunables>().is_some());
    assert!(app.world().get_resource::<ClearColor>().is_some());
    assert!(app.world().get_resource::<SimClock>().is_some());
    assert!(app.world().get_resource::<Serials>().is_some());
    assert!(app.world().get_resource::<RunLedger>().is_some());
    assert!(app.world().get_resource::<WorldRng>().is_some());
}

#[test]
fn keeps_preloaded_tunables() {
    let mut app = App::new();
    app.insert_resource(Tunables { player_hp: 7, ..default() });
    core::plugin(&mut app);
    assert_eq!(app.world().resource::<Tunables>().player_hp, 7);
}

#[test]
fn marked_entities_are_despawned_and_others_kept() {
    let mut world = World::new();
    let doomed = world.spawn(PendingDespawn).id();
    let kept = world.spawn_empty().id();

    run_system_once(&mut world, despawn_marked);

    assert!(world.get_entity(doomed).is_err());
    assert!(world.get_entity(kept).is_ok());
}

#[test]
fn clock_advances_once_per_update_in_game() {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin));
    app.init_state::<GameState>();
    core::plugin(&mut app);

    for _ in 0..3 {
        app.update();
    }
    assert_eq!(app.world().resource::<SimClock>().tick(), 3);
}

#[test]
fn clock_stops_after_game_over() {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin));
    app.init_state::<GameState>();
    core::plugin(&mut app);
    app.update();

    app.world_mut().resource_mut::<NextState<GameState>>().set(GameState::GameOver);
    app.update();
    let frozen = app.world().resource::<SimClock>().tick();
    app.update();
    assert_eq!(app.world().resource::<SimClock>().tick(), frozen);
}
