//! Hazards: timed spikes, fire, and lifetime expiry for everything that carries a [`Lifetime`].
//!
//! Spikes timeline (`start_delay = 1, delay_to_life = 2, delay_to_death = 1`):
//! ```text
//!   t: 0     1     2           4     5           7
//!      [ off ][ on  ][    off    ][ on  ][    off    ] ...
//! ```
//! While on, both the entity and its collider are `Dangerous` and the sprite is shown. While
//! off, both tag sets are empty and the sprite is hidden. Both delays zero means "always on".

use std::time::Duration;

use bevy::prelude::*;

use crate::common::clock::{Lifetime, SimClock};
use crate::common::tags::{Tag, TagSet};
use crate::common::tunables::Tunables;
use crate::plugins::core::SimSet;
use crate::plugins::spatial::{Collider, Damage, PendingDespawn, Record, Spawner, Tags, Visual, mark_for_despawn};

pub const SPIKES_DAMAGE: i32 = 10;
pub const FIRE_SIZE: f32 = 50.0;
pub const FIRE_DAMAGE: i32 = 1;

/// Seconds, as authored in the pattern library.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpikeTiming {
    pub start_delay: f32,
    pub delay_to_life: f32,
    pub delay_to_death: f32,
}

impl SpikeTiming {
    #[inline]
    pub fn permanent(&self) -> bool {
        self.delay_to_life == 0.0 && self.delay_to_death == 0.0
    }
}

#[derive(Component, Debug, Clone, PartialEq)]
pub struct Spikes {
    pub timing: SpikeTiming,
    pub active: bool,
    phase_started: Duration,
    phase_len: Duration,
}

impl Spikes {
    pub fn new(timing: SpikeTiming, now: Duration) -> Self {
        let (active, first) = if timing.permanent() { (true, 0.0) } else { (false, timing.start_delay) };
        Self { timing, active, phase_started: now, phase_len: secs(first) }
    }

    /// Advance through every phase boundary up to `now`. Returns whether `active` changed.
    pub fn advance(&mut self, now: Duration) -> bool {
        if self.timing.permanent() {
            return false;
        }
        let before = self.active;
        while now.saturating_sub(self.phase_started) >= self.phase_len {
            self.phase_started += self.phase_len;
            self.active = !self.active;
            let next = if self.active { self.timing.delay_to_death } else { self.timing.delay_to_life };
            self.phase_len = secs(next);
            if self.phase_len.is_zero() {
                // Zero-length phase: flips once per tick.
                break;
            }
        }
        self.active != before
    }

    /// Tags of both the entity and its collider in the current phase.
    pub fn tags(&self) -> TagSet {
        if self.active { Tag::Dangerous.into() } else { TagSet::EMPTY }
    }
}

fn secs(s: f32) -> Duration {
    Duration::from_secs_f32(s.max(0.0))
}

#[derive(Component, Debug, Clone, Copy)]
pub struct Fire;

pub fn plugin(app: &mut App) {
    app.add_systems(Update, (toggle_spikes, expire_lifetimes).in_set(SimSet::Timers));
}

pub fn spawn_spikes(spawner: &mut Spawner, pos: Vec2, size: Vec2, timing: SpikeTiming) -> Entity {
    let spikes = Spikes::new(timing, spawner.now());
    let tags = spikes.tags();
    let visual = Visual { visible: spikes.active, ..Visual::asset("spikes") };
    let record = Record::new("Spikes", pos, size).tagged(tags, tags).look(visual);
    spawner.spawn(record, (spikes, Damage(SPIKES_DAMAGE)))
}

/// A burning patch centred on `center`, hurting enemies only.
pub fn spawn_fire(spawner: &mut Spawner, center: Vec2, tunables: &Tunables) -> Entity {
    let now = spawner.now();
    let size = Vec2::splat(FIRE_SIZE);
    let record = Record::new("Fire", center - size * 0.5, size)
        .tagged(TagSet::of(&[Tag::DangerousForEnemy, Tag::Indestructible]), Tag::DangerousForEnemy.into())
        .look(Visual::asset("fire"));
    spawner.spawn(record, (Fire, Damage(FIRE_DAMAGE), Lifetime::new(now, tunables.fire_lifetime)))
}

pub fn toggle_spikes(clock: Res<SimClock>, mut q: Query<(&mut Spikes, &mut Tags, &mut Collider, &mut Visual)>) {
    let now = clock.now();
    for (mut spikes, mut tags, mut collider, mut visual) in &mut q {
        if !spikes.advance(now) {
            continue;
        }
        let set = spikes.tags();
        tags.0 = set;
        collider.tags = set;
        visual.visible = spikes.active;
    }
}

pub fn expire_lifetimes(
    clock: Res<SimClock>,
    mut commands: Commands,
    q: Query<(Entity, &Lifetime), Without<PendingDespawn>>,
) {
    let now = clock.now();
    for (e, lifetime) in &q {
        if lifetime.expired(now) {
            mark_for_despawn(&mut commands, e);
        }
    }
}
