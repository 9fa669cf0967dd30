//! Carried items.
//!
//! The player carries exactly three items. Buying one shifts the loadout like a ring
//! buffer: the new item lands in slot 0, the others move down, and the item in the last
//! slot is taken off and handed back to the spawner.
//!
//! Event-driven items (BulletPyro, Shrapnel) consume bus events under their slot's own
//! bus channel, so two of them react to the same bullet death independently and in any
//! order. The channel is handed out when the item is put on and travels with it through
//! shifts, so an item moving to another slot never sees an event twice.

use std::fmt;

use bevy::prelude::*;

use crate::common::clock::Cooldown;
use crate::common::tunables::Tunables;
use crate::plugins::events::{ConsumerId, EventBus, EventTag, EventTags};
use crate::plugins::hazards::spawn_fire;
use crate::plugins::projectiles::{Faction, ProjectileKind, SpawnProjectile};
use crate::plugins::spatial::{Body, Spawner};

use super::Player;
use super::weapons::Direction;

pub const LOADOUT_SLOTS: usize = 3;

const PLAYER_BULLET_DEATH: EventTags = EventTags::of(&[EventTag::BulletDeath, EventTag::PlayerShot]);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum ItemKind {
    #[default]
    Nothing,
    Accelerator,
    DamageBooster,
    Arsonist,
    BulletPyro,
    Shrapnel,
}

impl ItemKind {
    /// What item spawners stock.
    pub const STOCK: [ItemKind; 6] = [
        ItemKind::Nothing,
        ItemKind::Accelerator,
        ItemKind::DamageBooster,
        ItemKind::Arsonist,
        ItemKind::BulletPyro,
        ItemKind::Shrapnel,
    ];

    pub fn price(self) -> u32 {
        match self {
            ItemKind::Nothing => 0,
            ItemKind::Accelerator => 10,
            ItemKind::DamageBooster => 30,
            ItemKind::Arsonist => 15,
            ItemKind::BulletPyro => 100,
            ItemKind::Shrapnel => 50,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ItemKind::Nothing => "Nothing",
            ItemKind::Accelerator => "Accelerator",
            ItemKind::DamageBooster => "Damage booster",
            ItemKind::Arsonist => "Arsonist",
            ItemKind::BulletPyro => "BulletPyro",
            ItemKind::Shrapnel => "Shrapnel",
        }
    }

    pub fn put_on(self, player: &mut Player) {
        match self {
            ItemKind::Accelerator => player.speed += 200.0,
            ItemKind::DamageBooster => player.damage_bonus += 5,
            _ => {}
        }
    }

    pub fn take_off(self, player: &mut Player) {
        match self {
            ItemKind::Accelerator => player.speed -= 200.0,
            ItemKind::DamageBooster => player.damage_bonus -= 5,
            _ => {}
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ItemSlot {
    pub kind: ItemKind,
    /// Arsonist pacing; unused by other items.
    pub timer: Cooldown,
    /// Bus channel of the item in this slot.
    pub channel: u32,
}

impl ItemSlot {
    pub fn new(kind: ItemKind, arsonist_interval: f32, channel: u32) -> Self {
        Self { kind, timer: Cooldown::from_secs(arsonist_interval), channel }
    }
}

#[derive(Component, Clone, Debug, PartialEq)]
pub struct Loadout {
    pub slots: [ItemSlot; LOADOUT_SLOTS],
    next_channel: u32,
}

impl Default for Loadout {
    fn default() -> Self {
        Self::empty(Tunables::default().arsonist_interval)
    }
}

impl Loadout {
    pub fn empty(arsonist_interval: f32) -> Self {
        let slots = std::array::from_fn(|i| ItemSlot::new(ItemKind::Nothing, arsonist_interval, i as u32));
        Self { slots, next_channel: LOADOUT_SLOTS as u32 }
    }

    pub fn kinds(&self) -> [ItemKind; LOADOUT_SLOTS] {
        self.slots.map(|s| s.kind)
    }

    /// Put `item` in slot 0, shift the rest down, and return the evicted last item.
    pub fn swap_in(&mut self, item: ItemKind, player: &mut Player, arsonist_interval: f32) -> ItemKind {
        let evicted = self.slots[LOADOUT_SLOTS - 1].kind;
        evicted.take_off(player);
        self.slots.rotate_right(1);
        self.slots[0] = ItemSlot::new(item, arsonist_interval, self.next_channel);
        self.next_channel += 1;
        item.put_on(player);
        evicted
    }
}

/// Per-tick item effects.
pub fn run_items(
    tunables: Res<Tunables>,
    mut bus: ResMut<EventBus>,
    mut spawner: Spawner,
    mut shots: MessageWriter<SpawnProjectile>,
    mut q: Query<(Entity, &Body, &mut Loadout), With<Player>>,
) {
    let now = spawner.now();
    for (player, body, mut loadout) in &mut q {
        for slot in &mut loadout.slots {
            let consumer = ConsumerId::new(player, slot.channel);
            match slot.kind {
                ItemKind::Arsonist => {
                    if slot.timer.try_trigger(now) {
                        spawn_fire(&mut spawner, body.center(), &tunables);
                    }
                }
                ItemKind::BulletPyro => {
                    for payload in bus.take_for(consumer, PLAYER_BULLET_DEATH) {
                        if let Some(pos) = payload.pos {
                            spawn_fire(&mut spawner, pos, &tunables);
                        }
                    }
                }
                ItemKind::Shrapnel => {
                    for payload in bus.take_for(consumer, PLAYER_BULLET_DEATH) {
                        if let Some(pos) = payload.pos {
                            shots.write_batch(shrapnel(pos));
                        }
                    }
                }
                ItemKind::Nothing | ItemKind::Accelerator | ItemKind::DamageBooster => {}
            }
        }
    }
}

/// Four 10-damage fragments flying out of `pos` along the axes.
pub fn shrapnel(pos: Vec2) -> [SpawnProjectile; 4] {
    [Direction::Right, Direction::Left, Direction::Down, Direction::Up].map(|d| {
        let unit = d.unit();
        SpawnProjectile {
            pos: pos + unit * 10.0,
            size: Vec2::splat(10.0),
            vel: unit * 500.0,
            damage: 10,
            kind: ProjectileKind::Straight,
            faction: Faction::Player,
            from_player: false,
        }
    })
}
