use bevy::prelude::*;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::common::tags::Tag;
use crate::common::test_utils::{run_system_once, sim_world};
use crate::common::tunables::Tunables;
use crate::plugins::camera::CameraRig;
use crate::plugins::core::{RunLedger, WorldRng};
use crate::plugins::spatial::{Body, CellOrigin, PendingDespawn, Tags};

use super::*;

fn library() -> PatternLibrary {
    PatternLibrary::standard(Tunables::default().cell())
}

fn streaming_world(seed: u64) -> World {
    let mut world = sim_world();
    world.insert_resource(WorldRng::seeded(seed));
    world.insert_resource(library());
    world.init_resource::<WorldGrid>();
    world.init_resource::<CameraRig>();
    world.init_resource::<RunLedger>();
    world
}

fn outcomes(grid: &WorldGrid, cell: IVec2) -> Vec<SlotState> {
    grid.get(cell).map(|c| c.slots.iter().map(|s| s.state).collect()).unwrap_or_default()
}

// -----------------------------------------------------------------------------
// Grid
// -----------------------------------------------------------------------------

#[test]
fn start_cell_is_visited_and_empty() {
    let grid = WorldGrid::new();
    assert_eq!(grid.get(IVec2::ZERO), Some(&Cell::default()));
    assert_eq!((grid.width(), grid.height()), (1, 1));
}

#[test]
fn grow_adds_a_ring_and_keeps_logical_coordinates() {
    let mut grid = WorldGrid::new();
    grid.grow();
    assert_eq!((grid.width(), grid.height()), (3, 3));
    assert!(grid.is_rectangular());
    assert_eq!(grid.get(IVec2::ZERO), Some(&Cell::default()));
    assert!(grid.contains(IVec2::new(-1, 1)));
    assert!(!grid.contains(IVec2::new(2, 0)));
    assert!(grid.get(IVec2::new(1, 1)).is_none(), "new ring is unvisited");
}

#[test]
fn neighborhood_always_fits_after_a_random_walk() {
    let mut rng = SmallRng::seed_from_u64(7);
    let lib = library();
    let mut grid = WorldGrid::new();
    let mut center = IVec2::ZERO;
    let steps = [IVec2::X, IVec2::NEG_X, IVec2::Y, IVec2::NEG_Y, IVec2::ONE, IVec2::NEG_ONE];

    for i in 0..40 {
        center += steps[(i * 5 + i / 3) % steps.len()];
        grid.plan(center, &mut rng, &lib);
        assert!(grid.is_rectangular());
        for d in grid::NEIGHBORHOOD {
            assert!(grid.get(center + d).is_some(), "cell {} missing at step {i}", center + d);
        }
    }
}

#[test]
fn revisiting_a_cell_reproduces_its_outcomes() {
    let mut rng = SmallRng::seed_from_u64(42);
    let lib = library();
    let mut grid = WorldGrid::new();

    let first = grid.plan(IVec2::ZERO, &mut rng, &lib);
    let before: Vec<_> = grid::NEIGHBORHOOD.iter().map(|d| outcomes(&grid, *d)).collect();
    assert!(before.iter().flatten().all(|s| *s != SlotState::Pending));

    grid.plan(IVec2::new(6, -4), &mut rng, &lib);
    let again = grid.plan(IVec2::ZERO, &mut rng, &lib);

    let after: Vec<_> = grid::NEIGHBORHOOD.iter().map(|d| outcomes(&grid, *d)).collect();
    assert_eq!(before, after);
    assert_eq!(first, again);
}

#[test]
fn retired_slots_do_not_come_back() {
    let mut rng = SmallRng::seed_from_u64(3);
    let lib = library();
    let mut grid = WorldGrid::new();
    let plans = grid.plan(IVec2::ZERO, &mut rng, &lib);
    let victim = plans.first().expect("some slot spawned").origin;

    grid.retire(victim);

    assert_eq!(grid.slot_state(victim), Some(SlotState::Absent));
    let again = grid.plan(IVec2::ZERO, &mut rng, &lib);
    assert!(again.iter().all(|p| p.origin != victim));
    assert_eq!(again.len(), plans.len() - 1);
}

#[test]
fn certain_and_impossible_slots() {
    let mut rng = SmallRng::seed_from_u64(1);
    let lib = PatternLibrary {
        sets: vec![vec![
            Pattern { blueprint: Blueprint::AidKit { pos: Vec2::ZERO }, chance: 1.0 },
            Pattern { blueprint: Blueprint::AidKit { pos: Vec2::ONE }, chance: 0.0 },
        ]],
    };
    let mut grid = WorldGrid::new();
    let plans = grid.plan(IVec2::ZERO, &mut rng, &lib);

    // Eight fresh neighbours, one spawned slot each; the start cell is empty.
    assert_eq!(plans.len(), 8);
    assert!(plans.iter().all(|p| p.origin.slot == 0));
    assert_eq!(outcomes(&grid, IVec2::X), vec![SlotState::Spawned, SlotState::Absent]);
}

#[test]
fn crossing_consumes_one_cell_per_axis() {
    let cell = Vec2::new(2000.0, 1000.0);

    let mut offset = Vec2::new(1001.0, -20.0);
    assert_eq!(detect_crossing(&mut offset, cell), IVec2::new(1, 0));
    assert_eq!(offset, Vec2::new(-999.0, -20.0));

    let mut offset = Vec2::new(-1005.0, 501.0);
    assert_eq!(detect_crossing(&mut offset, cell), IVec2::new(-1, 1));
    assert_eq!(offset, Vec2::new(995.0, -499.0));

    let mut offset = Vec2::new(1000.0, 500.0);
    assert_eq!(detect_crossing(&mut offset, cell), IVec2::ZERO, "exactly half is still inside");
}

#[test]
fn anchor_places_current_cell_around_the_viewport_center() {
    let viewport = Vec2::new(1000.0, 600.0);
    let cell = Vec2::new(2000.0, 1000.0);
    assert_eq!(cell_anchor(IVec2::ZERO, Vec2::ZERO, viewport, cell), Vec2::new(-500.0, -200.0));
    assert_eq!(cell_anchor(IVec2::new(1, -1), Vec2::new(100.0, 0.0), viewport, cell), Vec2::new(1400.0, -1200.0));
}

#[test]
fn chebyshev_distance() {
    assert_eq!(distance_from_start(IVec2::new(-3, 2)), 3);
    assert_eq!(distance_from_start(IVec2::new(1, -4)), 4);
}

// -----------------------------------------------------------------------------
// Systems
// -----------------------------------------------------------------------------

#[test]
fn start_generation_materialises_tagged_origins() {
    let mut world = streaming_world(11);
    run_system_once(&mut world, generate_start_cells);

    let origins: Vec<CellOrigin> = world.query::<&CellOrigin>().iter(&world).copied().collect();
    assert!(!origins.is_empty());
    assert!(origins.iter().all(|o| o.cell != IVec2::ZERO));
    let spawned = world
        .resource_mut::<WorldGrid>()
        .plan(IVec2::ZERO, &mut SmallRng::seed_from_u64(0), &library())
        .len();
    assert_eq!(origins.len(), spawned);
}

#[test]
fn walls_materialise_at_cell_local_positions() {
    let mut world = streaming_world(5);
    let lib = PatternLibrary {
        sets: vec![vec![Pattern {
            blueprint: Blueprint::Wall { pos: Vec2::new(10.0, 20.0), size: Vec2::new(30.0, 40.0) },
            chance: 1.0,
        }]],
    };
    world.insert_resource(lib);
    world.resource_mut::<CameraRig>().offset = Vec2::new(5.0, 0.0);

    run_system_once(&mut world, generate_start_cells);

    let mut q = world.query::<(&Body, &Tags, &CellOrigin)>();
    let (body, tags, _) = q
        .iter(&world)
        .find(|(_, _, o)| o.cell == IVec2::new(1, 0))
        .expect("wall east of the start cell");
    assert!(tags.has(Tag::Wall));
    // anchor(1, 0) = (-500, -200) - (5, 0) + (2000, 0)
    assert_eq!(body.pos, Vec2::new(1505.0, -180.0));
    assert_eq!(body.size, Vec2::new(30.0, 40.0));
}

#[test]
fn crossing_tears_down_and_regenerates() {
    let mut world = streaming_world(9);
    run_system_once(&mut world, generate_start_cells);
    let survivor = world.spawn((Body::new(Vec2::ZERO, Vec2::ONE), Tags(Tag::Indestructible.into()))).id();
    let old: Vec<Entity> = world.query_filtered::<Entity, With<CellOrigin>>().iter(&world).collect();

    world.resource_mut::<CameraRig>().offset = Vec2::new(1001.0, 0.0);
    run_system_once(&mut world, stream_cells);

    assert_eq!(world.resource::<WorldGrid>().current(), IVec2::X);
    assert_eq!(world.resource::<CameraRig>().offset, Vec2::new(-999.0, 0.0));
    assert_eq!(world.resource::<RunLedger>().max_distance, 1);
    assert!(old.iter().all(|e| world.get::<PendingDespawn>(*e).is_some()));
    assert!(world.get::<PendingDespawn>(survivor).is_none());
    assert!(world.resource::<WorldGrid>().get(IVec2::new(2, 1)).is_some());
}

#[test]
fn no_crossing_no_work() {
    let mut world = streaming_world(9);
    let e = world.spawn((Body::new(Vec2::ZERO, Vec2::ONE), Tags::default())).id();
    world.resource_mut::<CameraRig>().offset = Vec2::new(999.0, -499.0);

    run_system_once(&mut world, stream_cells);

    assert_eq!(world.resource::<WorldGrid>().current(), IVec2::ZERO);
    assert!(world.get::<PendingDespawn>(e).is_none());
}
