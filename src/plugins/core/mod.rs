//! Core plugin: shared resources, the per-tick system-set order, and end-of-tick cleanup.
//!
//! ```text
//! Update (one simulation tick per frame)
//!   Clock → Timers → Sync → Player → Enemies → Projectiles → Obituaries
//!         → Items → Spawn → Events → Camera → Streaming → Cleanup → Hud
//! ```
//!
//! Every set except `Hud` only runs in `GameState::InGame`; the HUD keeps
//! rendering the "Game over" banner afterwards.

use bevy::prelude::*;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::common::clock::SimClock;
use crate::common::state::GameState;
use crate::common::tunables::Tunables;
use crate::plugins::assets::BACKGROUND;
use crate::plugins::spatial::{PendingDespawn, Serials, sync_colliders};

#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimSet {
    /// Advance `SimClock` from Bevy's frame time.
    Clock,
    /// Lifetimes and toggling hazards.
    Timers,
    /// Recompute collider world rectangles before any query.
    Sync,
    Player,
    Enemies,
    Projectiles,
    /// Turn dying player shots into bus events.
    Obituaries,
    Items,
    /// Materialise queued projectile requests.
    Spawn,
    /// Commit pending bus calls.
    Events,
    Camera,
    Streaming,
    Cleanup,
    Hud,
}

impl SimSet {
    const ORDER: [SimSet; 14] = [
        SimSet::Clock,
        SimSet::Timers,
        SimSet::Sync,
        SimSet::Player,
        SimSet::Enemies,
        SimSet::Projectiles,
        SimSet::Obituaries,
        SimSet::Items,
        SimSet::Spawn,
        SimSet::Events,
        SimSet::Camera,
        SimSet::Streaming,
        SimSet::Cleanup,
        SimSet::Hud,
    ];
}

/// Shared random source for pattern selection, spawn rolls and spawner stock.
#[derive(Resource)]
pub struct WorldRng(pub SmallRng);

impl WorldRng {
    pub fn from_entropy() -> Self {
        Self(SmallRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self(SmallRng::seed_from_u64(seed))
    }
}

/// Run statistics reported when the run ends.
#[derive(Resource, Debug, Default, Clone, PartialEq, Eq)]
pub struct RunLedger {
    pub kills: u32,
    /// Largest Chebyshev distance (in cells) from the start cell reached so far.
    pub max_distance: u32,
}

pub fn plugin(app: &mut App) {
    app.init_resource::<Tunables>()
        .init_resource::<SimClock>()
        .init_resource::<Serials>()
        .init_resource::<RunLedger>()
        .insert_resource(ClearColor(BACKGROUND));
    if !app.world().contains_resource::<WorldRng>() {
        app.insert_resource(WorldRng::from_entropy());
    }

    app.configure_sets(
        Update,
        (
            SimSet::Clock,
            SimSet::Timers,
            SimSet::Sync,
            SimSet::Player,
            SimSet::Enemies,
            SimSet::Projectiles,
            SimSet::Obituaries,
            SimSet::Items,
            SimSet::Spawn,
            SimSet::Events,
            SimSet::Camera,
            SimSet::Streaming,
            SimSet::Cleanup,
            SimSet::Hud,
        )
            .chain(),
    );
    for set in SimSet::ORDER.into_iter().filter(|s| *s != SimSet::Hud) {
        app.configure_sets(Update, set.run_if(in_state(GameState::InGame)));
    }

    app.add_systems(
        Update,
        (
            advance_clock.in_set(SimSet::Clock),
            sync_colliders.in_set(SimSet::Sync),
            despawn_marked.in_set(SimSet::Cleanup),
        ),
    );
}

fn advance_clock(time: Res<Time>, mut clock: ResMut<SimClock>) {
    clock.advance(time.delta());
}

/// The single place entities leave the world.
pub fn despawn_marked(mut commands: Commands, q: Query<Entity, With<PendingDespawn>>) {
    for e in &q {
        commands.entity(e).try_despawn();
    }
}

#[cfg(test)]
mod tests;
