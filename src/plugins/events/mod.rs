//! Event bus with read-then-commit consumption.
//!
//! Producers `emit` events. Consumers ask for events they have not consumed yet, react, and
//! `register_call`. Registration only lands in a per-tick *pending* set; `apply()` (once per tick,
//! after every consumer ran) commits pending calls into permanent per-consumer counts.
//!
//! Consequences:
//! - within one tick, no consumer can observe another consumer's reaction, so evaluation order
//!   of sibling item effects does not matter;
//! - registering the same consumer twice in one tick is idempotent (one pending call).
//!
//! Eviction: an event lives through the tick it was emitted in plus `retention` further ticks,
//! then `apply()` drops it. One extra tick lets consumers that ran *before* the producer within
//! the emitting tick still see it on the next one.

use std::collections::{HashMap, HashSet};

use bevy::prelude::*;

use crate::common::state::GameState;
use crate::common::tunables::Tunables;
use crate::plugins::core::SimSet;
use crate::plugins::player::weapons::WeaponKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EventTag {
    BulletDeath,
    /// The bullet was fired from the player's weapon.
    PlayerShot,
    WeaponChange,
    Character,
}

#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Debug)]
pub struct EventTags(u8);

impl EventTags {
    pub const fn of(tags: &[EventTag]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < tags.len() {
            bits |= 1 << tags[i] as u8;
            i += 1;
        }
        Self(bits)
    }

    #[inline]
    pub const fn contains_all(self, required: EventTags) -> bool {
        self.0 & required.0 == required.0
    }
}

/// Immutable payload of an event.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Payload {
    /// Camera-relative position, kept in step with entity coordinates by `translate`.
    pub pos: Option<Vec2>,
    pub weapon: Option<WeaponKind>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId(u64);

/// Identity of one consumer: an owning entity plus a channel (e.g. a carried item).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ConsumerId {
    pub owner: Entity,
    pub channel: u32,
}

impl ConsumerId {
    pub const fn new(owner: Entity, channel: u32) -> Self {
        Self { owner, channel }
    }
}

#[derive(Debug, Clone)]
pub struct BusEvent {
    pub id: EventId,
    pub tags: EventTags,
    pub payload: Payload,
    emitted_at: u64,
    calls: HashMap<ConsumerId, u32>,
    pending: HashSet<ConsumerId>,
}

#[derive(Resource, Debug)]
pub struct EventBus {
    events: Vec<BusEvent>,
    next_id: u64,
    tick: u64,
    retention: u64,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_retention(1)
    }
}

impl EventBus {
    pub fn with_retention(retention: u64) -> Self {
        Self { events: Vec::new(), next_id: 0, tick: 0, retention }
    }

    pub fn emit(&mut self, tags: EventTags, payload: Payload) -> EventId {
        let id = EventId(self.next_id);
        self.next_id += 1;
        self.events.push(BusEvent {
            id,
            tags,
            payload,
            emitted_at: self.tick,
            calls: HashMap::new(),
            pending: HashSet::new(),
        });
        id
    }

    /// Events tagged with at least `required` that `consumer` has not committed a call to.
    ///
    /// Pending (same-tick) calls do not hide an event: a consumer checks its own pending state
    /// through the return value of [`EventBus::register_call`].
    pub fn pending_for(&self, consumer: ConsumerId, required: EventTags) -> Vec<(EventId, Payload)> {
        self.events
            .iter()
            .filter(|ev| ev.tags.contains_all(required) && !ev.calls.contains_key(&consumer))
            .map(|ev| (ev.id, ev.payload))
            .collect()
    }

    /// Record that `consumer` reacted to `id` this tick. Returns `false` if it already had.
    pub fn register_call(&mut self, id: EventId, consumer: ConsumerId) -> bool {
        match self.events.iter_mut().find(|ev| ev.id == id) {
            Some(ev) => ev.pending.insert(consumer),
            None => false,
        }
    }

    /// Convenience for the common "react once" loop: returns the payloads this consumer should
    /// act on now, registering the calls.
    pub fn take_for(&mut self, consumer: ConsumerId, required: EventTags) -> Vec<Payload> {
        let mut out = Vec::new();
        for ev in self.events.iter_mut() {
            if !ev.tags.contains_all(required) || ev.calls.contains_key(&consumer) {
                continue;
            }
            if ev.pending.insert(consumer) {
                out.push(ev.payload);
            }
        }
        out
    }

    /// Commit pending calls, advance the bus tick and evict expired events.
    pub fn apply(&mut self) {
        for ev in &mut self.events {
            for consumer in ev.pending.drain() {
                *ev.calls.entry(consumer).or_insert(0) += 1;
            }
        }
        let (tick, retention) = (self.tick, self.retention);
        self.events.retain(|ev| ev.emitted_at + retention > tick);
        self.tick += 1;
    }

    /// Committed call count of `consumer` for `id`.
    pub fn calls(&self, id: EventId, consumer: ConsumerId) -> u32 {
        self.get(id).and_then(|ev| ev.calls.get(&consumer).copied()).unwrap_or(0)
    }

    pub fn is_pending(&self, id: EventId, consumer: ConsumerId) -> bool {
        self.get(id).is_some_and(|ev| ev.pending.contains(&consumer))
    }

    pub fn get(&self, id: EventId) -> Option<&BusEvent> {
        self.events.iter().find(|ev| ev.id == id)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Shift every positional payload; used when the camera recenters the world.
    pub fn translate(&mut self, delta: Vec2) {
        for ev in &mut self.events {
            if let Some(pos) = ev.payload.pos.as_mut() {
                *pos += delta;
            }
        }
    }
}

pub fn plugin(app: &mut App) {
    let retention = app
        .world()
        .get_resource::<Tunables>()
        .map(|t| t.event_retention_ticks)
        .unwrap_or(1);
    app.insert_resource(EventBus::with_retention(retention));
    app.add_systems(
        Update,
        apply_events.in_set(SimSet::Events).run_if(in_state(GameState::InGame)),
    );
}

fn apply_events(mut bus: ResMut<EventBus>) {
    bus.apply();
}
