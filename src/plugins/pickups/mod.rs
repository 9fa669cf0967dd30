//! Pickups: coins, aid kits and item spawners.
//!
//! Pickups are passive. The player's contact resolution does the picking up; this module
//! only builds the entities and re-arms spawners.
//!
//! ```text
//! ItemSpawner:  stocked ──(coins ≥ price)──► purchased: collider shrunk to zero
//!                                 ▲                       │ spawner_rearm seconds
//!                                 └──── swap back free ◄──┘ collider restored
//! ```

use std::time::Duration;

use bevy::prelude::*;
use rand::Rng;
use rand::seq::SliceRandom;

use crate::common::clock::{Cooldown, Lifetime, SimClock};
use crate::common::tags::{Tag, TagSet};
use crate::common::tunables::Tunables;
use crate::plugins::core::SimSet;
use crate::plugins::player::Player;
use crate::plugins::player::items::{ItemKind, Loadout};
use crate::plugins::spatial::{Body, Collider, Record, Spawner, Visual};

pub const COIN_SIZE: f32 = 10.0;
pub const PICKUP_SIZE: f32 = 50.0;

#[derive(Component, Debug, Clone, Copy)]
pub struct Coin;

#[derive(Component, Debug, Clone, Copy)]
pub struct AidKit;

#[derive(Component, Debug, Clone, PartialEq)]
pub struct ItemSpawner {
    pub item: ItemKind,
    pub price: u32,
    pub purchased: bool,
    rearm: Cooldown,
}

impl ItemSpawner {
    pub fn new(item: ItemKind, rearm_secs: f32) -> Self {
        Self { item, price: item.price(), purchased: false, rearm: Cooldown::from_secs(rearm_secs) }
    }

    /// Whether the spawner currently accepts a contact.
    #[inline]
    pub fn armed(&self, now: Duration) -> bool {
        self.rearm.ready(now)
    }

    /// Sell (or, once purchased, swap for free) the stocked item into `loadout`.
    ///
    /// Returns the item the player picked up; the evicted one stays here at price 0.
    pub fn try_purchase(
        &mut self,
        player: &mut Player,
        loadout: &mut Loadout,
        arsonist_interval: f32,
        now: Duration,
    ) -> Option<ItemKind> {
        if !self.armed(now) || !(self.purchased || player.coins >= self.price) {
            return None;
        }
        if !self.purchased {
            player.coins -= self.price;
        }
        let bought = self.item;
        self.item = loadout.swap_in(bought, player, arsonist_interval);
        self.price = 0;
        self.purchased = true;
        self.rearm.trigger(now);
        Some(bought)
    }
}

pub fn plugin(app: &mut App) {
    app.add_systems(Update, rearm_spawners.in_set(SimSet::Timers));
}

pub fn spawn_coin(spawner: &mut Spawner, pos: Vec2, tunables: &Tunables) -> Entity {
    let now = spawner.now();
    let tags = TagSet::of(&[Tag::Coin, Tag::Indestructible]);
    let record = Record::new("Coin", pos, Vec2::splat(COIN_SIZE))
        .tagged(tags, Tag::Coin.into())
        .look(Visual::asset("coin"));
    spawner.spawn(record, (Coin, Lifetime::new(now, tunables.coin_lifetime)))
}

pub fn spawn_aid_kit(spawner: &mut Spawner, pos: Vec2) -> Entity {
    let record = Record::new("AidKit", pos, Vec2::splat(PICKUP_SIZE))
        .tagged(Tag::AidKit.into(), Tag::AidKit.into())
        .look(Visual::asset("aid-kit"));
    spawner.spawn(record, AidKit)
}

/// Spawner stocked with a uniformly chosen item.
pub fn spawn_item_spawner(spawner: &mut Spawner, pos: Vec2, tunables: &Tunables, rng: &mut impl Rng) -> Entity {
    let item = ItemKind::STOCK.choose(rng).copied().unwrap_or_default();
    let record = Record::new("ItemSpawner", pos, Vec2::splat(PICKUP_SIZE))
        .tagged(Tag::ItemSpawner.into(), Tag::ItemSpawner.into())
        .look(Visual::asset("item-spawner"));
    spawner.spawn(record, ItemSpawner::new(item, tunables.spawner_rearm))
}

/// A just-used spawner has no collider until it re-arms.
pub fn rearm_spawners(clock: Res<SimClock>, mut q: Query<(&ItemSpawner, &Body, &mut Collider)>) {
    let now = clock.now();
    for (spawner, body, mut collider) in &mut q {
        let size = if spawner.armed(now) { body.size } else { Vec2::ZERO };
        if collider.size != size {
            collider.size = size;
        }
    }
}
