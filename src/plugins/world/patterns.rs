//! Cell pattern library.
//!
//! A pattern set is everything one cell may contain: blueprints in cell-local coordinates
//! (origin = the cell's top-left corner) paired with a spawn chance. Sets are immutable;
//! a cell deep-copies the set it was given.

use bevy::prelude::*;

use crate::plugins::enemies::TurretKind;
use crate::plugins::projectiles::HomingModel;

/// What a slot turns into when it materialises.
#[derive(Debug, Clone, PartialEq)]
pub enum Blueprint {
    Wall { pos: Vec2, size: Vec2 },
    Turret { pos: Vec2, kind: TurretKind },
    AidKit { pos: Vec2 },
    /// Delays in seconds. All three zero means permanently active.
    Spikes { pos: Vec2, size: Vec2, start_delay: f32, delay_to_life: f32, delay_to_death: f32 },
    ItemSpawner { pos: Vec2 },
}

impl Blueprint {
    fn wall(x: f32, y: f32, w: f32, h: f32) -> Self {
        Blueprint::Wall { pos: Vec2::new(x, y), size: Vec2::new(w, h) }
    }

    fn spikes(x: f32, y: f32) -> Self {
        Blueprint::Spikes {
            pos: Vec2::new(x, y),
            size: Vec2::new(500.0, 250.0),
            start_delay: 0.0,
            delay_to_life: 0.0,
            delay_to_death: 0.0,
        }
    }

    fn gunner(x: f32, y: f32) -> Self {
        Blueprint::Turret { pos: Vec2::new(x, y), kind: TurretKind::Gunner }
    }

    fn seeker(x: f32, y: f32, model: HomingModel) -> Self {
        Blueprint::Turret { pos: Vec2::new(x, y), kind: TurretKind::Seeker(model) }
    }

    fn aid_kit(x: f32, y: f32) -> Self {
        Blueprint::AidKit { pos: Vec2::new(x, y) }
    }

    fn spawner(x: f32, y: f32) -> Self {
        Blueprint::ItemSpawner { pos: Vec2::new(x, y) }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    pub blueprint: Blueprint,
    /// Spawn probability in `[0, 1]`.
    pub chance: f32,
}

pub type PatternSet = Vec<Pattern>;

#[derive(Resource, Debug, Clone)]
pub struct PatternLibrary {
    pub sets: Vec<PatternSet>,
}

fn set(items: impl IntoIterator<Item = (Blueprint, f32)>) -> PatternSet {
    items.into_iter().map(|(blueprint, chance)| Pattern { blueprint, chance }).collect()
}

impl PatternLibrary {
    /// The nine shipped cell layouts, scaled to `cell`.
    pub fn standard(cell: Vec2) -> Self {
        let (w, h) = (cell.x, cell.y);
        let (cx, cy) = (w / 2.0, h / 2.0);
        let speed = HomingModel::SpeedPreserving;
        let inertial = HomingModel::Inertial;

        // Outer walls with a 200px gate in the middle of each side, guarded by four turrets.
        let gates = set([
            (Blueprint::wall(0.0, 0.0, cx - 100.0, 50.0), 1.0),
            (Blueprint::wall(cx + 100.0, 0.0, cx - 100.0, 50.0), 1.0),
            (Blueprint::wall(0.0, h - 50.0, cx - 100.0, 50.0), 1.0),
            (Blueprint::wall(cx + 100.0, h - 50.0, cx - 100.0, 50.0), 1.0),
            (Blueprint::wall(0.0, 0.0, 50.0, cy - 100.0), 1.0),
            (Blueprint::wall(0.0, cy + 100.0, 50.0, cy - 100.0), 1.0),
            (Blueprint::wall(w - 50.0, 0.0, 50.0, cy - 100.0), 1.0),
            (Blueprint::wall(w - 50.0, cy + 100.0, 50.0, cy - 100.0), 1.0),
            (Blueprint::gunner(cx - 75.0, cy - 75.0), 0.9),
            (Blueprint::seeker(cx + 75.0, cy - 75.0, speed), 0.9),
            (Blueprint::seeker(cx - 75.0, cy + 75.0, speed), 0.9),
            (Blueprint::gunner(cx + 75.0, cy + 75.0), 0.9),
            (Blueprint::aid_kit(cx - 25.0, cy - 25.0), 0.5),
            (Blueprint::aid_kit(cx + 25.0, cy - 25.0), 0.5),
            (Blueprint::aid_kit(cx - 25.0, cy + 25.0), 0.5),
            (Blueprint::aid_kit(cx + 25.0, cy + 25.0), 0.5),
        ]);

        // Two offset blocks with a seeker nest between them.
        let blocks = set([
            (Blueprint::wall(cx - 200.0, cy - 200.0, 200.0, 200.0), 1.0),
            (Blueprint::wall(cx, cy, 200.0, 200.0), 1.0),
            (Blueprint::seeker(cx, cy - 150.0, speed), 1.0),
            (Blueprint::seeker(cx + 100.0, cy - 50.0, inertial), 1.0),
            (Blueprint::seeker(cx - 150.0, cy, speed), 1.0),
            (Blueprint::seeker(cx - 50.0, cy + 100.0, inertial), 1.0),
            (Blueprint::aid_kit(cx, cy - 50.0), 0.8),
            (Blueprint::aid_kit(cx, cy - 100.0), 0.8),
            (Blueprint::aid_kit(cx + 50.0, cy - 50.0), 0.8),
            (Blueprint::aid_kit(cx - 50.0, cy), 0.8),
            (Blueprint::aid_kit(cx - 100.0, cy), 0.8),
            (Blueprint::aid_kit(cx - 50.0, cy + 50.0), 0.8),
        ]);

        let spikes_falling = set([
            (Blueprint::spikes(0.0, 0.0), 1.0),
            (Blueprint::spikes(500.0, 250.0), 1.0),
            (Blueprint::spikes(1000.0, 500.0), 1.0),
            (Blueprint::spikes(1500.0, 750.0), 1.0),
        ]);

        let spikes_rising = set([
            (Blueprint::spikes(0.0, h - 250.0), 1.0),
            (Blueprint::spikes(500.0, h - 500.0), 1.0),
            (Blueprint::spikes(1000.0, h - 750.0), 1.0),
            (Blueprint::spikes(1500.0, h - 1000.0), 1.0),
        ]);

        let solid = set([(Blueprint::wall(0.0, 0.0, w, h), 1.0)]);

        let corridor_horizontal = set([
            (Blueprint::wall(0.0, cy - 150.0, w, 50.0), 1.0),
            (Blueprint::wall(0.0, cy + 100.0, w, 50.0), 1.0),
        ]);

        let corridor_vertical = set([
            (Blueprint::wall(cx - 150.0, 0.0, 50.0, h), 1.0),
            (Blueprint::wall(cx + 100.0, 0.0, 50.0, h), 1.0),
        ]);

        let crossroads = set([
            (Blueprint::wall(0.0, cy - 150.0, cx - 100.0, 50.0), 1.0),
            (Blueprint::wall(0.0, cy + 100.0, cx - 100.0, 50.0), 1.0),
            (Blueprint::wall(cx + 100.0, cy - 150.0, cx - 100.0, 50.0), 1.0),
            (Blueprint::wall(cx + 100.0, cy + 100.0, cx - 100.0, 50.0), 1.0),
            (Blueprint::wall(cx - 150.0, 0.0, 50.0, cy - 100.0), 1.0),
            (Blueprint::wall(cx + 100.0, 0.0, 50.0, cy - 100.0), 1.0),
            (Blueprint::wall(cx - 150.0, cy + 100.0, 50.0, cy - 100.0), 1.0),
            (Blueprint::wall(cx + 100.0, cy + 100.0, 50.0, cy - 100.0), 1.0),
        ]);

        let shop = set([
            (Blueprint::spawner(cx - 100.0, cy - 100.0), 1.0),
            (Blueprint::spawner(cx - 100.0, cy + 75.0), 1.0),
            (Blueprint::spawner(cx + 75.0, cy - 100.0), 1.0),
            (Blueprint::spawner(cx + 75.0, cy + 75.0), 1.0),
        ]);

        Self {
            sets: vec![
                gates,
                blocks,
                spikes_falling,
                spikes_rising,
                solid,
                corridor_horizontal,
                corridor_vertical,
                crossroads,
                shop,
            ],
        }
    }
}
