//! Collision index: "which tagged colliders overlap this probe rectangle?"
//!
//! The strategy is a linear broad-phase scan over live colliders. The world holds at most a
//! few hundred entities, so this is cheaper than maintaining a spatial hash. Everything goes
//! through [`scan`]; swapping in a grid or hash only means replacing that function.
//!
//! Probing a hypothetical position never touches a real collider: callers build a throwaway
//! rectangle (`Collider::rect_at(pos + delta)` or [`CollisionIndex::probe`]) and query with it.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::common::tags::TagSet;

use super::{Collider, PendingDespawn, Tags};

/// One overlapping collider. Results carry no ordering guarantee.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub entity: Entity,
    pub rect: Rect,
    pub collider_tags: TagSet,
    pub owner_tags: TagSet,
}

/// Strict overlap: shared edges and zero-area rectangles never collide.
#[inline]
pub fn overlaps(a: Rect, b: Rect) -> bool {
    a.min.x < b.max.x
        && b.min.x < a.max.x
        && a.min.y < b.max.y
        && b.min.y < a.max.y
        && a.width() > 0.0
        && a.height() > 0.0
        && b.width() > 0.0
        && b.height() > 0.0
}

/// Broad-phase scan over `(entity, collider, owner tags)` candidates.
pub fn scan<'a>(
    candidates: impl IntoIterator<Item = (Entity, &'a Collider, TagSet)>,
    probe: Rect,
    owner_tags: TagSet,
    collider_tags: TagSet,
    exclude: Option<Entity>,
) -> Vec<Hit> {
    candidates
        .into_iter()
        .filter(|(e, _, _)| Some(*e) != exclude)
        .filter(|(_, c, owner)| owner.contains_all(owner_tags) && c.tags.contains_all(collider_tags))
        .filter(|(_, c, _)| overlaps(c.world, probe))
        .map(|(entity, c, owner)| Hit { entity, rect: c.world, collider_tags: c.tags, owner_tags: owner })
        .collect()
}

#[derive(SystemParam)]
pub struct CollisionIndex<'w, 's> {
    colliders: Query<'w, 's, (Entity, &'static Collider, &'static Tags), Without<PendingDespawn>>,
}

impl CollisionIndex<'_, '_> {
    /// Every live collider overlapping `probe` whose owner tags ⊇ `owner_tags` and whose own
    /// tags ⊇ `collider_tags`, optionally ignoring `exclude` (usually the caller itself).
    pub fn query(
        &self,
        probe: Rect,
        owner_tags: TagSet,
        collider_tags: TagSet,
        exclude: Option<Entity>,
    ) -> Vec<Hit> {
        scan(
            self.colliders.iter().map(|(e, c, t)| (e, c, t.0)),
            probe,
            owner_tags,
            collider_tags,
            exclude,
        )
    }

    /// Disposable probe: `e`'s collider displaced by `delta` from where it was last synced.
    pub fn probe(&self, e: Entity, delta: Vec2) -> Option<Rect> {
        let (_, c, _) = self.colliders.get(e).ok()?;
        Some(Rect::from_corners(c.world.min + delta, c.world.max + delta))
    }

    /// Everything currently touching `e`'s collider.
    pub fn touching(&self, e: Entity, owner_tags: TagSet, collider_tags: TagSet) -> Vec<Hit> {
        match self.probe(e, Vec2::ZERO) {
            Some(probe) => self.query(probe, owner_tags, collider_tags, Some(e)),
            None => Vec::new(),
        }
    }
}
