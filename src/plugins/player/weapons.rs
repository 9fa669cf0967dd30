//! Player weapons.
//!
//! | weapon      | damage | interval | speed | bullet |
//! |-------------|--------|----------|-------|--------|
//! | Gun         | 30     | 0.5 s    | 800   | 10     |
//! | MachineGun  | 5      | 0.2 s    | 800   | 5      |
//! | Rifle       | 20     | 1.0 s    | 2000  | 7      |
//!
//! Shots leave the player's edge in one of four directions; the cooldown starts when the
//! weapon is drawn, so a freshly swapped weapon cannot fire on the same tick.

use std::time::Duration;

use bevy::prelude::*;

use crate::common::clock::Cooldown;
use crate::plugins::projectiles::{Faction, ProjectileKind, SpawnProjectile};
use crate::plugins::spatial::Body;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WeaponKind {
    Gun,
    MachineGun,
    Rifle,
}

impl WeaponKind {
    /// Tab cycles through weapons in this order.
    pub const CYCLE: [WeaponKind; 3] = [WeaponKind::Gun, WeaponKind::MachineGun, WeaponKind::Rifle];

    pub fn damage(self) -> i32 {
        match self {
            WeaponKind::Gun => 30,
            WeaponKind::MachineGun => 5,
            WeaponKind::Rifle => 20,
        }
    }

    pub fn interval(self) -> f32 {
        match self {
            WeaponKind::Gun => 0.5,
            WeaponKind::MachineGun => 0.2,
            WeaponKind::Rifle => 1.0,
        }
    }

    pub fn bullet_speed(self) -> f32 {
        match self {
            WeaponKind::Gun | WeaponKind::MachineGun => 800.0,
            WeaponKind::Rifle => 2000.0,
        }
    }

    pub fn bullet_size(self) -> f32 {
        match self {
            WeaponKind::Gun => 10.0,
            WeaponKind::MachineGun => 5.0,
            WeaponKind::Rifle => 7.0,
        }
    }

    pub fn next(self) -> Self {
        let i = Self::CYCLE.iter().position(|k| *k == self).unwrap_or(0);
        Self::CYCLE[(i + 1) % Self::CYCLE.len()]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    /// Parse an aim token. Anything unrecognised is `None`, which fires nothing.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "left" => Some(Direction::Left),
            "right" => Some(Direction::Right),
            "up" => Some(Direction::Up),
            "down" => Some(Direction::Down),
            _ => None,
        }
    }

    /// Unit vector in screen space (y down).
    pub fn unit(self) -> Vec2 {
        match self {
            Direction::Left => Vec2::NEG_X,
            Direction::Right => Vec2::X,
            Direction::Up => Vec2::NEG_Y,
            Direction::Down => Vec2::Y,
        }
    }

    /// Top-left of a shot leaving `shooter` in this direction.
    pub fn muzzle(self, shooter: &Body) -> Vec2 {
        let c = shooter.center();
        let (pos, size) = (shooter.pos, shooter.size);
        match self {
            Direction::Right => Vec2::new(pos.x + size.x + 5.0, c.y),
            Direction::Left => Vec2::new(pos.x - 10.0, c.y),
            Direction::Up => Vec2::new(c.x, pos.y - 10.0),
            Direction::Down => Vec2::new(c.x, pos.y + size.y + 5.0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Weapon {
    pub kind: WeaponKind,
    cooldown: Cooldown,
}

impl Weapon {
    pub fn drawn_at(kind: WeaponKind, now: Duration) -> Self {
        Self { kind, cooldown: Cooldown::started_at(kind.interval(), now) }
    }

    /// Shot request if the cooldown allows one. `bonus` is added to the base damage.
    pub fn fire(&mut self, dir: Direction, shooter: &Body, bonus: i32, now: Duration) -> Option<SpawnProjectile> {
        if !self.cooldown.try_trigger(now) {
            return None;
        }
        Some(SpawnProjectile {
            pos: dir.muzzle(shooter),
            size: Vec2::splat(self.kind.bullet_size()),
            vel: dir.unit() * self.kind.bullet_speed(),
            damage: self.kind.damage() + bonus,
            kind: ProjectileKind::Straight,
            faction: Faction::Player,
            from_player: true,
        })
    }
}
