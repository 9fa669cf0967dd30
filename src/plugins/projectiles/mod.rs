//! Projectiles plugin: **message-based producer → consumer** spawning, flight and death.
//!
//! # Data flow
//! ```text
//!   Update (one tick)
//!┌────────────────────────────────────────────────────────────────────────────┐
//!│  Producers (Player, Enemies, Items sets)                                   │
//!│    - player weapon, turrets, Shrapnel item                                 │
//!│    - write: SpawnProjectile message                                        │
//!│                                                                            │
//!│  Projectiles set                                                           │
//!│    (1) wall_death:   touching a Wall collider → PendingDespawn             │
//!│    (2) steer_homing: add steering toward the target, maybe renormalise     │
//!│    (3) fly:          pos += vel * dt                                       │
//!│                                                                            │
//!│  Obituaries set                                                            │
//!│    (4) report_player_shots: Added<PendingDespawn> on a player shot         │
//!│        → bus event BulletDeath+PlayerShot at the projectile centre         │
//!│                                                                            │
//!│  Spawn set                                                                 │
//!│    (5) spawn_projectiles: the single consumer of SpawnProjectile           │
//!└────────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Producers never touch `Commands` for projectiles; they only enqueue intent. Lifetime
//! expiry is handled with every other [`Lifetime`] in the hazards plugin.
//!
//! # Homing models
//! Both homing models add a steering vector of fixed length toward the target every tick
//! (not scaled by `dt`). `SpeedPreserving` then rescales the velocity back to its previous
//! length, so only the heading changes. `Inertial` keeps the sum, so speed drifts.

use bevy::prelude::*;

use crate::common::clock::{Lifetime, SimClock};
use crate::common::tags::{Tag, TagSet};
use crate::common::tunables::Tunables;
use crate::plugins::core::SimSet;
use crate::plugins::events::{EventBus, EventTag, EventTags, Payload};
use crate::plugins::spatial::{
    Body, CollisionIndex, Damage, PendingDespawn, Record, Spawner, Velocity, Visual, mark_for_despawn,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HomingModel {
    SpeedPreserving,
    Inertial,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ProjectileKind {
    Straight,
    Homing { target: Entity, steer: f32, model: HomingModel },
}

/// Who a projectile hurts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Faction {
    /// Hurts enemies (`DangerousForEnemy`).
    Player,
    /// Hurts the player (`Dangerous`).
    Enemy,
}

impl Faction {
    /// `(owner tags, collider tags)`.
    pub fn tags(self) -> (TagSet, TagSet) {
        let danger = match self {
            Faction::Player => Tag::DangerousForEnemy,
            Faction::Enemy => Tag::Dangerous,
        };
        (TagSet::of(&[danger, Tag::Indestructible, Tag::OneHit, Tag::Bullet]), danger.into())
    }
}

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Projectile {
    pub kind: ProjectileKind,
    /// Fired from the player's weapon; its death is reported on the bus.
    pub from_player: bool,
}

#[derive(Message, Clone, Copy, Debug, PartialEq)]
pub struct SpawnProjectile {
    /// Top-left corner.
    pub pos: Vec2,
    pub size: Vec2,
    pub vel: Vec2,
    pub damage: i32,
    pub kind: ProjectileKind,
    pub faction: Faction,
    pub from_player: bool,
}

pub fn plugin(app: &mut App) {
    app.add_message::<SpawnProjectile>();
    app.add_systems(
        Update,
        (
            (wall_death, steer_homing, fly).chain().in_set(SimSet::Projectiles),
            report_player_shots.in_set(SimSet::Obituaries),
            spawn_projectiles.in_set(SimSet::Spawn),
        ),
    );
}

/// New velocity after one steering update toward `to`.
///
/// Returns `vel` unchanged when the target sits on the projectile's centre.
pub fn steer(vel: Vec2, from: Vec2, to: Vec2, amount: f32, model: HomingModel) -> Vec2 {
    let Some(dir) = (to - from).try_normalize() else {
        return vel;
    };
    let steered = vel + dir * amount;
    match model {
        HomingModel::Inertial => steered,
        HomingModel::SpeedPreserving => steered.normalize_or_zero() * vel.length(),
    }
}

pub fn wall_death(
    mut commands: Commands,
    index: CollisionIndex,
    q: Query<Entity, (With<Projectile>, Without<PendingDespawn>)>,
) {
    for e in &q {
        if !index.touching(e, TagSet::EMPTY, Tag::Wall.into()).is_empty() {
            mark_for_despawn(&mut commands, e);
        }
    }
}

pub fn steer_homing(
    mut q: Query<(&Body, &mut Velocity, &Projectile)>,
    targets: Query<&Body, Without<Projectile>>,
) {
    for (body, mut vel, projectile) in &mut q {
        let ProjectileKind::Homing { target, steer: amount, model } = projectile.kind else {
            continue;
        };
        let Ok(target) = targets.get(target) else {
            continue;
        };
        vel.0 = steer(vel.0, body.center(), target.center(), amount, model);
    }
}

pub fn fly(clock: Res<SimClock>, mut q: Query<(&mut Body, &Velocity), With<Projectile>>) {
    let dt = clock.dt();
    for (mut body, vel) in &mut q {
        body.pos += vel.0 * dt;
    }
}

pub fn report_player_shots(mut bus: ResMut<EventBus>, q: Query<(&Body, &Projectile), Added<PendingDespawn>>) {
    for (body, projectile) in &q {
        if projectile.from_player {
            bus.emit(
                EventTags::of(&[EventTag::BulletDeath, EventTag::PlayerShot]),
                Payload { pos: Some(body.center()), weapon: None },
            );
        }
    }
}

pub fn spawn_projectiles(
    tunables: Res<Tunables>,
    mut requests: MessageReader<SpawnProjectile>,
    mut spawner: Spawner,
) {
    let now = spawner.now();
    for req in requests.read() {
        let (tags, collider_tags) = req.faction.tags();
        let ttl = match req.kind {
            ProjectileKind::Straight => tunables.straight_bullet_lifetime,
            ProjectileKind::Homing { .. } => tunables.homing_bullet_lifetime,
        };
        let record = Record::new("Bullet", req.pos, req.size).tagged(tags, collider_tags).look(Visual::FILL);
        spawner.spawn(
            record,
            (
                Projectile { kind: req.kind, from_player: req.from_player },
                Velocity(req.vel),
                Damage(req.damage),
                Lifetime::new(now, ttl),
            ),
        );
    }
}
