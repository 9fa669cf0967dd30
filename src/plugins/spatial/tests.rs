use bevy::prelude::*;

use crate::common::tags::{Tag, TagSet};
use crate::common::test_utils::{run_system_once, sim_world};

use super::index::{overlaps, scan};
use super::*;

fn spawn_block(world: &mut World, pos: Vec2, size: Vec2, tags: TagSet, collider_tags: TagSet) -> Entity {
    let body = Body::new(pos, size);
    world.spawn((body, Tags(tags), Collider::covering(&body, collider_tags))).id()
}

fn wall(world: &mut World, pos: Vec2, size: Vec2) -> Entity {
    spawn_block(world, pos, size, Tag::Wall.into(), Tag::Wall.into())
}

fn try_move(world: &mut World, mover: Entity, delta: Vec2) -> bool {
    run_system_once(
        world,
        move |index: CollisionIndex, mut q: Query<(&mut Body, &Collider)>| {
            let (mut body, collider) = q.get_mut(mover).unwrap();
            attempt_move(&index, mover, &mut body, collider, delta)
        },
    )
}

#[test]
fn overlap_is_strict() {
    let a = Rect::new(0.0, 0.0, 10.0, 10.0);
    assert!(overlaps(a, Rect::new(9.0, 9.0, 20.0, 20.0)));
    assert!(!overlaps(a, Rect::new(10.0, 0.0, 20.0, 10.0)), "shared edge");
    assert!(!overlaps(a, Rect::new(5.0, 5.0, 5.0, 5.0)), "zero area");
}

#[test]
fn scan_filters_by_owner_and_collider_supersets() {
    let mut world = World::new();
    let spikes = spawn_block(
        &mut world,
        Vec2::ZERO,
        Vec2::splat(10.0),
        TagSet::EMPTY,
        Tag::Dangerous.into(),
    );
    let bullet = spawn_block(
        &mut world,
        Vec2::ZERO,
        Vec2::splat(10.0),
        TagSet::of(&[Tag::DangerousForEnemy, Tag::OneHit, Tag::Bullet]),
        Tag::DangerousForEnemy.into(),
    );
    let far = spawn_block(&mut world, Vec2::splat(500.0), Vec2::splat(10.0), TagSet::EMPTY, TagSet::EMPTY);

    let mut q = world.query::<(Entity, &Collider, &Tags)>();
    let all: Vec<_> = q.iter(&world).map(|(e, c, t)| (e, *c, t.0)).collect();
    let candidates = || all.iter().map(|(e, c, t)| (*e, c, *t));
    let probe = Rect::new(5.0, 5.0, 6.0, 6.0);

    let hits = scan(candidates(), probe, TagSet::EMPTY, TagSet::EMPTY, None);
    assert_eq!(hits.len(), 2);
    assert!(hits.iter().all(|h| h.entity != far));

    let hits = scan(candidates(), probe, Tag::OneHit.into(), TagSet::EMPTY, None);
    assert_eq!(hits.iter().map(|h| h.entity).collect::<Vec<_>>(), vec![bullet]);

    let hits = scan(candidates(), probe, TagSet::EMPTY, Tag::Dangerous.into(), None);
    assert_eq!(hits.iter().map(|h| h.entity).collect::<Vec<_>>(), vec![spikes]);

    let hits = scan(candidates(), probe, TagSet::EMPTY, TagSet::EMPTY, Some(spikes));
    assert_eq!(hits.iter().map(|h| h.entity).collect::<Vec<_>>(), vec![bullet]);
}

#[test]
fn sync_places_collider_at_owner_plus_offset() {
    let mut world = World::new();
    let body = Body::new(Vec2::new(100.0, 50.0), Vec2::splat(20.0));
    let mut collider = Collider::covering(&body, TagSet::EMPTY);
    collider.offset = Vec2::new(5.0, -5.0);
    let e = world.spawn((body, collider)).id();

    world.get_mut::<Body>(e).unwrap().pos = Vec2::new(200.0, 0.0);
    run_system_once(&mut world, sync_colliders);

    let c = world.get::<Collider>(e).unwrap();
    assert_eq!(c.world, Rect::new(205.0, -5.0, 225.0, 15.0));
}

#[test]
fn attempt_move_rejected_by_overlapping_wall() {
    let mut world = World::new();
    let mover = spawn_block(&mut world, Vec2::ZERO, Vec2::splat(10.0), TagSet::EMPTY, TagSet::EMPTY);
    wall(&mut world, Vec2::new(12.0, -50.0), Vec2::new(100.0, 100.0));

    assert!(!try_move(&mut world, mover, Vec2::new(5.0, 0.0)));
    assert_eq!(world.get::<Body>(mover).unwrap().pos, Vec2::ZERO);
}

#[test]
fn attempt_move_commits_exact_delta_when_clear() {
    let mut world = World::new();
    let mover = spawn_block(&mut world, Vec2::ZERO, Vec2::splat(10.0), TagSet::EMPTY, TagSet::EMPTY);
    wall(&mut world, Vec2::new(12.0, -50.0), Vec2::new(100.0, 100.0));

    assert!(try_move(&mut world, mover, Vec2::new(-3.5, 7.25)));
    assert_eq!(world.get::<Body>(mover).unwrap().pos, Vec2::new(-3.5, 7.25));
}

#[test]
fn diagonal_move_is_all_or_nothing() {
    let mut world = World::new();
    let mover = spawn_block(&mut world, Vec2::ZERO, Vec2::splat(10.0), TagSet::EMPTY, TagSet::EMPTY);
    // Wall only to the right: a pure vertical move would succeed, the diagonal does not.
    wall(&mut world, Vec2::new(10.0, -100.0), Vec2::new(10.0, 300.0));

    assert!(!try_move(&mut world, mover, Vec2::new(2.0, 2.0)));
    assert!(try_move(&mut world, mover, Vec2::new(0.0, 2.0)));
    assert_eq!(world.get::<Body>(mover).unwrap().pos, Vec2::new(0.0, 2.0));
}

#[test]
fn non_wall_colliders_do_not_block() {
    let mut world = World::new();
    let mover = spawn_block(&mut world, Vec2::ZERO, Vec2::splat(10.0), TagSet::EMPTY, TagSet::EMPTY);
    spawn_block(&mut world, Vec2::new(5.0, 0.0), Vec2::splat(10.0), Tag::Coin.into(), TagSet::EMPTY);

    assert!(try_move(&mut world, mover, Vec2::new(5.0, 0.0)));
}

#[test]
fn marked_entities_are_invisible_to_queries() {
    let mut world = World::new();
    let w = wall(&mut world, Vec2::ZERO, Vec2::splat(10.0));
    world.entity_mut(w).insert(PendingDespawn);

    let hits = run_system_once(&mut world, |index: CollisionIndex| {
        index.query(Rect::new(0.0, 0.0, 5.0, 5.0), TagSet::EMPTY, TagSet::EMPTY, None).len()
    });
    assert_eq!(hits, 0);
}

#[test]
fn spawner_stamps_are_strictly_increasing() {
    let mut world = sim_world();
    run_system_once(&mut world, |mut spawner: Spawner| {
        for _ in 0..3 {
            spawner.spawn(Record::new("Thing", Vec2::ZERO, Vec2::ONE), ());
        }
    });

    let mut serials: Vec<u64> = world.query::<&Stamp>().iter(&world).map(|s| s.serial).collect();
    serials.sort();
    assert_eq!(serials, vec![0, 1, 2]);
}
