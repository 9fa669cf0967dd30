//! Enemies plugin: stationary turrets.
//!
//! ---------------------------
//! STATE MACHINE
//! ---------------------------
//! ```text
//!   idle ──(player within range)──► charging (attack cooldown) ──► firing ──┐
//!     ▲                                                                      │
//!     └──────────────────────────────────────────────────────────────────────┘
//!   any state ──(hp ≤ 0)──► dead: kill counted, coin dropped, pattern slot retired
//! ```
//!
//! ---------------------------
//! TICK ORDER (SimSet::Enemies)
//! ---------------------------
//! 1) `damage_turrets`: every `DangerousForEnemy` owner touching a turret hurts it, at most
//!    once per immunity window. `OneHit` owners (player bullets) die on touch even when
//!    the hit was absorbed by immunity, and each one is spent on a single turret.
//! 2) `kill_turrets`: facts → consequences. Turrets are never despawned here, only marked.
//! 3) `turret_fire`: shot requests go through `SpawnProjectile`; nothing is spawned directly.

use std::collections::HashSet;
use std::time::Duration;

use bevy::prelude::*;

use crate::common::clock::{Cooldown, SimClock};
use crate::common::tags::{Tag, TagSet};
use crate::common::tunables::Tunables;
use crate::plugins::core::{RunLedger, SimSet};
use crate::plugins::pickups::{COIN_SIZE, spawn_coin};
use crate::plugins::player::Player;
use crate::plugins::projectiles::{Faction, HomingModel, ProjectileKind, SpawnProjectile};
use crate::plugins::spatial::{
    Body, CellOrigin, CollisionIndex, Damage, Health, PendingDespawn, Record, Spawner, Visual, mark_for_despawn,
};
use crate::plugins::world::WorldGrid;

pub const TURRET_SIZE: f32 = 50.0;
pub const TURRET_HP: i32 = 100;
pub const TURRET_CONTACT_DAMAGE: i32 = 10;
/// Minimum time between two hits landing on the same turret.
pub const TURRET_IMMUNITY: f32 = 0.1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TurretKind {
    /// Rapid straight shots.
    Gunner,
    /// Slow homing shots.
    Seeker(HomingModel),
}

/// Per-kind firing parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TurretStats {
    pub range: f32,
    pub interval: f32,
    pub bullet_size: f32,
    pub bullet_speed: f32,
    pub bullet_damage: i32,
    /// Homing only.
    pub steer: f32,
}

impl TurretKind {
    pub fn stats(self) -> TurretStats {
        match self {
            TurretKind::Gunner => TurretStats {
                range: 500.0,
                interval: 0.2,
                bullet_size: 10.0,
                bullet_speed: 800.0,
                bullet_damage: 10,
                steer: 0.0,
            },
            TurretKind::Seeker(_) => TurretStats {
                range: 800.0,
                interval: 1.0,
                bullet_size: 20.0,
                bullet_speed: 600.0,
                bullet_damage: 20,
                steer: 8.0,
            },
        }
    }

    pub fn asset(self) -> &'static str {
        match self {
            TurretKind::Gunner => "turret-1",
            TurretKind::Seeker(_) => "turret-2",
        }
    }
}

#[derive(Component, Debug, Clone, PartialEq)]
pub struct Turret {
    pub kind: TurretKind,
    attack: Cooldown,
    immunity: Cooldown,
}

impl Turret {
    pub fn new(kind: TurretKind, now: Duration) -> Self {
        Self {
            kind,
            attack: Cooldown::started_at(kind.stats().interval, now),
            immunity: Cooldown::started_at(TURRET_IMMUNITY, now),
        }
    }
}

pub fn plugin(app: &mut App) {
    app.add_systems(
        Update,
        (damage_turrets, kill_turrets, turret_fire).chain().in_set(SimSet::Enemies),
    );
}

pub fn spawn_turret(spawner: &mut Spawner, pos: Vec2, kind: TurretKind) -> Entity {
    let now = spawner.now();
    let record = Record::new("Turret", pos, Vec2::splat(TURRET_SIZE))
        .tagged(TagSet::of(&[Tag::Enemy, Tag::Dangerous]), Tag::Dangerous.into())
        .look(Visual::asset(kind.asset()));
    spawner.spawn(
        record,
        (Turret::new(kind, now), Health { hp: TURRET_HP }, Damage(TURRET_CONTACT_DAMAGE)),
    )
}

pub fn damage_turrets(
    clock: Res<SimClock>,
    mut commands: Commands,
    index: CollisionIndex,
    mut turrets: Query<(Entity, &mut Turret, &mut Health), Without<PendingDespawn>>,
    sources: Query<&Damage>,
) {
    let now = clock.now();
    let mut spent = HashSet::new();
    for (e, mut turret, mut health) in &mut turrets {
        for hit in index.touching(e, Tag::DangerousForEnemy.into(), TagSet::EMPTY) {
            if spent.contains(&hit.entity) {
                continue;
            }
            if turret.immunity.try_trigger(now) {
                health.hp -= sources.get(hit.entity).map_or(0, |d| d.0);
            }
            if hit.owner_tags.contains(Tag::OneHit) {
                spent.insert(hit.entity);
                mark_for_despawn(&mut commands, hit.entity);
            }
        }
    }
}

pub fn kill_turrets(
    tunables: Res<Tunables>,
    mut ledger: ResMut<RunLedger>,
    mut grid: ResMut<WorldGrid>,
    mut spawner: Spawner,
    q: Query<(Entity, &Health, &Body, Option<&CellOrigin>), (With<Turret>, Without<PendingDespawn>)>,
) {
    for (e, health, body, origin) in &q {
        if health.hp > 0 {
            continue;
        }
        ledger.kills += 1;
        spawn_coin(&mut spawner, body.center() - Vec2::splat(COIN_SIZE * 0.5), &tunables);
        if let Some(origin) = origin {
            grid.retire(*origin);
        }
        mark_for_despawn(&mut spawner.commands, e);
        debug!("turret {e} destroyed, {} kills", ledger.kills);
    }
}

/// Shot from `shooter` toward `target`, or `None` when out of range or on top of it.
pub fn aim(kind: TurretKind, shooter: &Body, target: &Body, target_entity: Entity) -> Option<SpawnProjectile> {
    let stats = kind.stats();
    let to = target.center() - shooter.center();
    let dist = to.length();
    if dist >= stats.range || dist <= f32::EPSILON {
        return None;
    }
    let size = Vec2::splat(stats.bullet_size);
    let projectile = match kind {
        TurretKind::Gunner => ProjectileKind::Straight,
        TurretKind::Seeker(model) => ProjectileKind::Homing { target: target_entity, steer: stats.steer, model },
    };
    Some(SpawnProjectile {
        pos: shooter.center() - size * 0.5,
        size,
        vel: to / dist * stats.bullet_speed,
        damage: stats.bullet_damage,
        kind: projectile,
        faction: Faction::Enemy,
        from_player: false,
    })
}

pub fn turret_fire(
    clock: Res<SimClock>,
    mut shots: MessageWriter<SpawnProjectile>,
    player: Option<Single<(Entity, &Body), With<Player>>>,
    mut turrets: Query<(&mut Turret, &Body), Without<PendingDespawn>>,
) {
    let Some(player) = player else {
        return;
    };
    let (target, target_body) = *player;
    let now = clock.now();
    for (mut turret, body) in &mut turrets {
        if !turret.attack.ready(now) {
            continue;
        }
        if let Some(shot) = aim(turret.kind, body, target_body, target) {
            turret.attack.trigger(now);
            shots.write(shot);
        }
    }
}
