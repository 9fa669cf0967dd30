//! Player plugin.
//!
//! Pipeline (all in `SimSet::Player`, chained):
//! - `request_weapon_change`: a Tab edge becomes a `WeaponChange + Character` bus event
//! - `change_weapon`: the player consumes that event and draws the next weapon
//! - `move_player`: collision-aware move, whole-vector rejection on walls
//! - `fire_weapon`: one aimed shot request if the weapon cooldown allows
//! - `place_objects`: mouse placement of spawners and aid kits
//! - `resolve_contacts`: damage, pickups, purchases
//! - `update_look` / `check_death`
//!
//! `PlayerInput` is written by the input collaborator (full app) or directly by tests. Edge
//! signals (`cycle_weapon`, `place`) are consumed when read; held keys are level state.
//!
//! API note (Bevy >= 0.18):
//! - Prefer the `Single` SystemParam (and `Option<Single<...>>`) for single-entity access.
//!   `Option<Single>` lets a system do nothing while the player is missing.

use std::time::Duration;

use bevy::prelude::*;

use crate::common::clock::{Cooldown, SimClock};
use crate::common::state::GameState;
use crate::common::tags::{Tag, TagSet};
use crate::common::tunables::Tunables;
use crate::plugins::core::{SimSet, WorldRng};
use crate::plugins::events::{ConsumerId, EventBus, EventTag, EventTags, Payload};
use crate::plugins::pickups::{self, ItemSpawner};
use crate::plugins::projectiles::SpawnProjectile;
use crate::plugins::spatial::{
    Body, CellOrigin, Collider, CollisionIndex, Damage, Health, PendingDespawn, Record, Spawner, Visual,
    attempt_move, mark_for_despawn,
};
use crate::plugins::world::WorldGrid;

pub mod items;
pub mod weapons;

use items::Loadout;
use weapons::{Direction, Weapon, WeaponKind};

const WEAPON_CHANGE: EventTags = EventTags::of(&[EventTag::WeaponChange, EventTag::Character]);
/// Bus channel of the player itself; carried items count up from 0.
const PLAYER_CHANNEL: u32 = u32::MAX;

#[derive(Component, Debug, Clone, PartialEq)]
pub struct Player {
    /// Pixels per second.
    pub speed: f32,
    /// Added to every weapon shot.
    pub damage_bonus: i32,
    pub coins: u32,
    /// Throttles contact damage.
    pub contact: Cooldown,
    pub weapon: Weapon,
}

impl Default for Player {
    fn default() -> Self {
        Self::new(&Tunables::default(), Duration::ZERO)
    }
}

impl Player {
    pub fn new(tunables: &Tunables, now: Duration) -> Self {
        Self {
            speed: tunables.player_speed,
            damage_bonus: 0,
            coins: 0,
            contact: Cooldown::started_at(tunables.player_damage_interval, now),
            weapon: Weapon::drawn_at(WeaponKind::MachineGun, now),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placeable {
    ItemSpawner,
    AidKit,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaceRequest {
    pub kind: Placeable,
    /// Screen position of the new object's top-left corner.
    pub pos: Vec2,
}

#[derive(Resource, Default, Debug, Clone, PartialEq)]
pub struct PlayerInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Aim of a held fire key, if any.
    pub fire: Option<Direction>,
    pub cycle_weapon: bool,
    pub place: Option<PlaceRequest>,
}

impl PlayerInput {
    /// Movement direction, not normalised: diagonals are faster.
    pub fn axis(&self) -> Vec2 {
        let x = (self.right as i8 - self.left as i8) as f32;
        let y = (self.down as i8 - self.up as i8) as f32;
        Vec2::new(x, y)
    }
}

pub fn plugin(app: &mut App) {
    app.init_resource::<PlayerInput>()
        .add_systems(OnEnter(GameState::InGame), spawn_player)
        .add_systems(
            Update,
            (
                (
                    request_weapon_change,
                    change_weapon,
                    move_player,
                    fire_weapon,
                    place_objects,
                    resolve_contacts,
                    update_look,
                    check_death,
                )
                    .chain()
                    .in_set(SimSet::Player),
                items::run_items.in_set(SimSet::Items),
            ),
        );
}

pub fn spawn_player(tunables: Res<Tunables>, mut spawner: Spawner) {
    let size = Vec2::splat(tunables.player_size);
    let pos = (tunables.viewport() - size) * 0.5;
    let now = spawner.now();
    let record = Record::new("Player", pos, size)
        .tagged(TagSet::of(&[Tag::Character, Tag::Indestructible]), TagSet::EMPTY)
        .look(Visual::asset("player"));
    spawner.spawn(
        record,
        (
            Player::new(&tunables, now),
            Health { hp: tunables.player_hp },
            Loadout::empty(tunables.arsonist_interval),
        ),
    );
}

pub fn request_weapon_change(
    mut input: ResMut<PlayerInput>,
    mut bus: ResMut<EventBus>,
    player: Option<Single<&Player>>,
) {
    if !std::mem::take(&mut input.cycle_weapon) {
        return;
    }
    let Some(player) = player else {
        return;
    };
    bus.emit(WEAPON_CHANGE, Payload { pos: None, weapon: Some(player.weapon.kind.next()) });
}

pub fn change_weapon(
    clock: Res<SimClock>,
    mut bus: ResMut<EventBus>,
    player: Option<Single<(Entity, &mut Player)>>,
) {
    let Some(player) = player else {
        return;
    };
    let (e, mut player) = player.into_inner();
    for payload in bus.take_for(ConsumerId::new(e, PLAYER_CHANNEL), WEAPON_CHANGE) {
        if let Some(kind) = payload.weapon {
            player.weapon = Weapon::drawn_at(kind, clock.now());
        }
    }
}

pub fn move_player(
    clock: Res<SimClock>,
    input: Res<PlayerInput>,
    index: CollisionIndex,
    mut q: Query<(Entity, &Player, &mut Body, &Collider)>,
) {
    let axis = input.axis();
    if axis == Vec2::ZERO {
        return;
    }
    for (e, player, mut body, collider) in &mut q {
        let delta = axis * player.speed * clock.dt();
        attempt_move(&index, e, &mut body, collider, delta);
    }
}

pub fn fire_weapon(
    clock: Res<SimClock>,
    input: Res<PlayerInput>,
    mut shots: MessageWriter<SpawnProjectile>,
    mut q: Query<(&mut Player, &Body)>,
) {
    let Some(dir) = input.fire else {
        return;
    };
    for (mut player, body) in &mut q {
        let bonus = player.damage_bonus;
        if let Some(shot) = player.weapon.fire(dir, body, bonus, clock.now()) {
            shots.write(shot);
        }
    }
}

pub fn place_objects(
    tunables: Res<Tunables>,
    mut input: ResMut<PlayerInput>,
    mut rng: ResMut<WorldRng>,
    mut spawner: Spawner,
) {
    let Some(request) = input.place.take() else {
        return;
    };
    match request.kind {
        Placeable::ItemSpawner => {
            pickups::spawn_item_spawner(&mut spawner, request.pos, &tunables, &mut rng.0);
        }
        Placeable::AidKit => {
            pickups::spawn_aid_kit(&mut spawner, request.pos);
        }
    }
}

/// Everything the player's collider touches this tick.
///
/// - `Dangerous` colliders hurt, at most once per contact interval; `OneHit` owners die on touch
/// - aid kits heal (no cap) and retire their pattern slot
/// - coins add one to the purse
/// - item spawners sell or swap their item
#[allow(clippy::too_many_arguments)]
pub fn resolve_contacts(
    tunables: Res<Tunables>,
    clock: Res<SimClock>,
    mut commands: Commands,
    mut grid: ResMut<WorldGrid>,
    index: CollisionIndex,
    mut players: Query<(Entity, &mut Player, &mut Health, &mut Loadout)>,
    damage: Query<&Damage>,
    origins: Query<&CellOrigin>,
    mut spawners: Query<&mut ItemSpawner>,
) {
    let now = clock.now();
    for (e, mut player, mut health, mut loadout) in &mut players {
        for hit in index.touching(e, TagSet::EMPTY, Tag::Dangerous.into()) {
            if player.contact.try_trigger(now) {
                health.hp -= damage.get(hit.entity).map_or(0, |d| d.0);
            }
            if hit.owner_tags.contains(Tag::OneHit) {
                mark_for_despawn(&mut commands, hit.entity);
            }
        }

        for hit in index.touching(e, Tag::AidKit.into(), TagSet::EMPTY) {
            health.hp += tunables.aid_kit_heal;
            if let Ok(origin) = origins.get(hit.entity) {
                grid.retire(*origin);
            }
            mark_for_despawn(&mut commands, hit.entity);
        }

        for hit in index.touching(e, Tag::Coin.into(), TagSet::EMPTY) {
            player.coins += 1;
            mark_for_despawn(&mut commands, hit.entity);
        }

        for hit in index.touching(e, Tag::ItemSpawner.into(), TagSet::EMPTY) {
            let Ok(mut spawner) = spawners.get_mut(hit.entity) else {
                continue;
            };
            if let Some(bought) = spawner.try_purchase(&mut player, &mut loadout, tunables.arsonist_interval, now) {
                info!("picked up {bought}, left {} behind", spawner.item);
            }
        }
    }
}

/// Asset key for the player at `hp`.
pub fn look_for(hp: i32) -> &'static str {
    if hp >= 80 {
        "player"
    } else if hp >= 40 {
        "player-hurt"
    } else {
        "player-critical"
    }
}

pub fn update_look(mut q: Query<(&Health, &mut Visual), (With<Player>, Changed<Health>)>) {
    for (health, mut visual) in &mut q {
        *visual = Visual::asset(look_for(health.hp));
    }
}

pub fn check_death(
    mut next: ResMut<NextState<GameState>>,
    mut q: Query<(&Health, &mut Visual), (With<Player>, Without<PendingDespawn>)>,
) {
    for (health, mut visual) in &mut q {
        if health.hp <= 0 {
            info!("player died");
            visual.visible = false;
            next.set(GameState::GameOver);
        }
    }
}
