//! World plugin: procedural generation and cell streaming.
//!
//! Only the 3×3 block of cells around the player ever holds live entities.
//!
//! ```text
//! OnEnter(InGame):      plan(start cell) → materialise
//! Update/Streaming:     camera offset crossed ±half a cell?
//!                         ├─ step player cell, consume offset
//!                         ├─ mark every non-Indestructible entity for despawn
//!                         └─ plan(new cell) → materialise (grid grows on demand)
//! ```
//!
//! Materialised entities carry a [`CellOrigin`] so a kill or pickup can retire its slot.

use bevy::prelude::*;
use rand::Rng;

use crate::common::state::GameState;
use crate::common::tags::Tag;
use crate::common::tunables::Tunables;
use crate::plugins::camera::CameraRig;
use crate::plugins::core::{RunLedger, SimSet, WorldRng};
use crate::plugins::enemies;
use crate::plugins::hazards::{self, SpikeTiming};
use crate::plugins::pickups;
use crate::plugins::spatial::{PendingDespawn, Record, Spawner, Tags, Visual, mark_for_despawn};

pub mod grid;
pub mod patterns;

pub use grid::{Cell, Planned, Slot, SlotState, WorldGrid, cell_anchor, detect_crossing, distance_from_start};
pub use patterns::{Blueprint, Pattern, PatternLibrary, PatternSet};

#[derive(Component, Debug, Clone, Copy)]
pub struct Wall;

pub fn plugin(app: &mut App) {
    let cell = app.world().get_resource::<Tunables>().map(Tunables::cell).unwrap_or_else(|| Tunables::default().cell());
    app.init_resource::<WorldGrid>()
        .insert_resource(PatternLibrary::standard(cell))
        .add_systems(OnEnter(GameState::InGame), generate_start_cells)
        .add_systems(Update, stream_cells.in_set(SimSet::Streaming));
}

pub fn spawn_wall(spawner: &mut Spawner, pos: Vec2, size: Vec2) -> Entity {
    let record = Record::new("Wall", pos, size).tagged(Tag::Wall.into(), Tag::Wall.into()).look(Visual::FILL);
    spawner.spawn(record, Wall)
}

/// Instantiate one planned slot at `anchor` (top-left of its cell on screen).
pub fn materialize(
    plan: &Planned,
    anchor: Vec2,
    spawner: &mut Spawner,
    tunables: &Tunables,
    rng: &mut impl Rng,
) -> Entity {
    let e = match &plan.blueprint {
        Blueprint::Wall { pos, size } => spawn_wall(spawner, anchor + *pos, *size),
        Blueprint::Turret { pos, kind } => enemies::spawn_turret(spawner, anchor + *pos, *kind),
        Blueprint::AidKit { pos } => pickups::spawn_aid_kit(spawner, anchor + *pos),
        Blueprint::Spikes { pos, size, start_delay, delay_to_life, delay_to_death } => {
            let timing = SpikeTiming {
                start_delay: *start_delay,
                delay_to_life: *delay_to_life,
                delay_to_death: *delay_to_death,
            };
            hazards::spawn_spikes(spawner, anchor + *pos, *size, timing)
        }
        Blueprint::ItemSpawner { pos } => pickups::spawn_item_spawner(spawner, anchor + *pos, tunables, rng),
    };
    spawner.commands.entity(e).insert(plan.origin);
    e
}

fn materialize_all(
    plans: &[Planned],
    camera_offset: Vec2,
    spawner: &mut Spawner,
    tunables: &Tunables,
    rng: &mut impl Rng,
) {
    let (viewport, cell) = (tunables.viewport(), tunables.cell());
    for plan in plans {
        let anchor = cell_anchor(plan.delta, camera_offset, viewport, cell);
        materialize(plan, anchor, spawner, tunables, rng);
    }
}

pub fn generate_start_cells(
    tunables: Res<Tunables>,
    rig: Res<CameraRig>,
    library: Res<PatternLibrary>,
    mut grid: ResMut<WorldGrid>,
    mut rng: ResMut<WorldRng>,
    mut spawner: Spawner,
) {
    let center = grid.current();
    let plans = grid.plan(center, &mut rng.0, &library);
    materialize_all(&plans, rig.offset, &mut spawner, &tunables, &mut rng.0);
}

pub fn stream_cells(
    tunables: Res<Tunables>,
    library: Res<PatternLibrary>,
    mut rig: ResMut<CameraRig>,
    mut grid: ResMut<WorldGrid>,
    mut rng: ResMut<WorldRng>,
    mut ledger: ResMut<RunLedger>,
    mut spawner: Spawner,
    live: Query<(Entity, &Tags), Without<PendingDespawn>>,
) {
    let step = detect_crossing(&mut rig.offset, tunables.cell());
    if step == IVec2::ZERO {
        return;
    }

    let center = grid.current() + step;
    grid.set_current(center);
    ledger.max_distance = ledger.max_distance.max(distance_from_start(center));
    debug!("player entered cell {center}");

    for (e, tags) in &live {
        if !tags.has(Tag::Indestructible) {
            mark_for_despawn(&mut spawner.commands, e);
        }
    }

    let plans = grid.plan(center, &mut rng.0, &library);
    materialize_all(&plans, rig.offset, &mut spawner, &tunables, &mut rng.0);
}

#[cfg(test)]
mod tests;
