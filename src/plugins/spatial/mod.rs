//! Spatial entity record.
//!
//! Every simulated object is an axis-aligned rectangle in **camera-relative screen space**
//! (origin top-left, y grows downwards) plus an independently tagged collider rectangle.
//!
//! ```text
//!   Body.pos ──► ┌──────────────┐
//!                │   Collider   │  world = Body.pos + Collider.offset
//!                │  (own tags)  │  (recomputed by sync_colliders, every tick,
//!                └──────────────┘   before any collision query)
//! ```
//!
//! Structural removal is never immediate: `mark_for_despawn` inserts `PendingDespawn`, the
//! collision index skips marked entities, and the core cleanup system despawns them at the
//! end of the tick. This is what makes "destroy while iterating" safe.

use std::time::Duration;

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::common::clock::SimClock;
use crate::common::tags::{Tag, TagSet};

pub mod index;

pub use index::{CollisionIndex, Hit};

// -----------------------------------------------------------------------------
// Components
// -----------------------------------------------------------------------------

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Body {
    /// Top-left corner.
    pub pos: Vec2,
    pub size: Vec2,
}

impl Body {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self { pos, size }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::from_corners(self.pos, self.pos + self.size)
    }
}

#[derive(Component, Debug, Clone, Copy, PartialEq, Default)]
pub struct Tags(pub TagSet);

impl Tags {
    #[inline]
    pub fn has(&self, tag: Tag) -> bool {
        self.0.contains(tag)
    }
}

/// Interaction rectangle, offset from its owner and tagged on its own.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Collider {
    pub offset: Vec2,
    pub size: Vec2,
    pub tags: TagSet,
    /// World rectangle as of the last `sync_colliders` run.
    pub world: Rect,
}

impl Collider {
    /// Collider covering the whole body.
    pub fn covering(body: &Body, tags: TagSet) -> Self {
        Self { offset: Vec2::ZERO, size: body.size, tags, world: body.rect() }
    }

    #[inline]
    pub fn rect_at(&self, owner_pos: Vec2) -> Rect {
        let min = owner_pos + self.offset;
        Rect::from_corners(min, min + self.size)
    }

    #[inline]
    pub fn place(&mut self, owner_pos: Vec2) {
        self.world = self.rect_at(owner_pos);
    }
}

/// Creation order and time. Serials are unique and strictly increasing.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stamp {
    pub serial: u64,
    pub born: Duration,
}

/// Logical look handed to the render collaborator.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Visual {
    pub look: Look,
    pub visible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Look {
    /// Named asset, resolved through the asset catalog.
    Asset(&'static str),
    /// Plain rectangle in the foreground colour.
    Fill,
}

impl Visual {
    pub const FILL: Visual = Visual { look: Look::Fill, visible: true };

    pub const fn asset(key: &'static str) -> Self {
        Self { look: Look::Asset(key), visible: true }
    }
}

#[derive(Component, Debug, Clone, Copy, PartialEq, Default)]
pub struct Velocity(pub Vec2);

/// Damage dealt to whoever touches this entity's dangerous collider.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Damage(pub i32);

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Health {
    pub hp: i32,
}

/// Marker: entity should be removed from the world at the end of this tick.
#[derive(Component, Debug, Clone, Copy)]
pub struct PendingDespawn;

/// Non-owning back-reference to the pattern slot an entity was materialised from.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellOrigin {
    pub cell: IVec2,
    pub slot: usize,
}

// -----------------------------------------------------------------------------
// Creation
// -----------------------------------------------------------------------------

/// Monotonic serial source.
#[derive(Resource, Debug, Default)]
pub struct Serials {
    next: u64,
}

impl Serials {
    pub fn next(&mut self) -> u64 {
        let s = self.next;
        self.next += 1;
        s
    }
}

/// The common part of every entity.
#[derive(Debug, Clone)]
pub struct Record {
    pub name: &'static str,
    pub body: Body,
    pub tags: TagSet,
    pub collider_tags: TagSet,
    pub visual: Visual,
}

impl Record {
    pub fn new(name: &'static str, pos: Vec2, size: Vec2) -> Self {
        Self {
            name,
            body: Body::new(pos, size),
            tags: TagSet::EMPTY,
            collider_tags: TagSet::EMPTY,
            visual: Visual::FILL,
        }
    }

    pub fn tagged(mut self, tags: TagSet, collider_tags: TagSet) -> Self {
        self.tags = tags;
        self.collider_tags = collider_tags;
        self
    }

    pub fn look(mut self, visual: Visual) -> Self {
        self.visual = visual;
        self
    }
}

/// Spawns entities with a fresh [`Stamp`].
#[derive(SystemParam)]
pub struct Spawner<'w, 's> {
    pub commands: Commands<'w, 's>,
    serials: ResMut<'w, Serials>,
    clock: Res<'w, SimClock>,
}

impl Spawner<'_, '_> {
    pub fn spawn(&mut self, record: Record, behaviour: impl Bundle) -> Entity {
        let stamp = Stamp { serial: self.serials.next(), born: self.clock.now() };
        let collider = Collider::covering(&record.body, record.collider_tags);
        self.commands
            .spawn((
                Name::new(record.name),
                record.body,
                Tags(record.tags),
                collider,
                record.visual,
                stamp,
                behaviour,
            ))
            .id()
    }

    #[inline]
    pub fn now(&self) -> Duration {
        self.clock.now()
    }
}

/// Schedule an entity for end-of-tick removal. Safe on entities already gone.
#[inline]
pub fn mark_for_despawn(commands: &mut Commands, e: Entity) {
    commands.entity(e).try_insert(PendingDespawn);
}

// -----------------------------------------------------------------------------
// Systems / movement
// -----------------------------------------------------------------------------

/// Recompute every collider's world rectangle from its owner's position.
pub fn sync_colliders(mut q: Query<(&Body, &mut Collider)>) {
    for (body, mut collider) in &mut q {
        collider.place(body.pos);
    }
}

/// Commit `delta` only if the displaced collider would touch no `Wall` collider.
///
/// Diagonal moves are accepted or rejected as one unit, so an entity pressed into a corner
/// can stay stuck even where a single-axis move would have succeeded.
pub fn attempt_move(
    index: &CollisionIndex,
    me: Entity,
    body: &mut Body,
    collider: &Collider,
    delta: Vec2,
) -> bool {
    if delta == Vec2::ZERO {
        return true;
    }
    let probe = collider.rect_at(body.pos + delta);
    let blocked = !index
        .query(probe, TagSet::EMPTY, Tag::Wall.into(), Some(me))
        .is_empty();
    if !blocked {
        body.pos += delta;
    }
    !blocked
}

#[cfg(test)]
mod tests;
