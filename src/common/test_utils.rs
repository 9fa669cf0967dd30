//! Test helpers.
//!
//! Systems are driven one at a time on a bare `World` through `RunSystemOnce`. Systems that use
//! `Commands` only enqueue structural changes, so we `flush()` before returning and assertions
//! see spawned / marked entities.

use std::time::Duration;

use bevy::ecs::message::Messages;
use bevy::ecs::system::{IntoSystem, RunSystemOnce};
use bevy::prelude::*;

use crate::common::clock::SimClock;
use crate::common::tunables::Tunables;
use crate::plugins::core::{RunLedger, WorldRng};
use crate::plugins::events::EventBus;
use crate::plugins::player::PlayerInput;
use crate::plugins::projectiles::SpawnProjectile;
use crate::plugins::spatial::Serials;
use crate::plugins::world::WorldGrid;

/// Run a system once on the given world, then flush deferred commands.
/// Returns the system output.
pub fn run_system_once<T, Out, Marker>(world: &mut World, system: T) -> Out
where
    T: IntoSystem<(), Out, Marker>,
{
    let out = world.run_system_once(system).expect("system run failed");
    world.flush();
    out
}

/// World with the resources every gameplay system expects.
pub fn sim_world() -> World {
    let mut world = World::new();
    world.insert_resource(Tunables::default());
    world.insert_resource(SimClock::default());
    world.insert_resource(Serials::default());
    world.insert_resource(EventBus::default());
    world.insert_resource(WorldRng::seeded(0));
    world.init_resource::<WorldGrid>();
    world.init_resource::<RunLedger>();
    world.init_resource::<PlayerInput>();
    world.init_resource::<Messages<SpawnProjectile>>();
    world
}

/// Every `SpawnProjectile` written since the last call.
pub fn drain_shots(world: &mut World) -> Vec<SpawnProjectile> {
    world.resource_mut::<Messages<SpawnProjectile>>().drain().collect()
}

/// Move the simulation clock to an absolute time, as one tick of `dt`.
pub fn advance_to(world: &mut World, secs: f32) {
    let mut clock = world.resource_mut::<SimClock>();
    let target = Duration::from_secs_f32(secs);
    let dt = target.saturating_sub(clock.now());
    clock.advance(dt);
}
