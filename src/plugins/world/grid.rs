//! World grid: the dense, ever-growing rectangle of visited cells.
//!
//! Logical cell coordinates put the start cell at `(0, 0)`; x grows right and y grows down
//! (screen orientation). Storage is column-major `Vec<Vec<Option<Cell>>>` plus the storage
//! index of the logical origin. Growing inserts one empty ring on every side and shifts that
//! origin, so logical coordinates of already visited cells never change.
//!
//! ```text
//!   before grow        after grow
//!                      . . . . .
//!     a b c            . a b c .
//!     d e f     →      . d e f .
//!                      . . . . .
//! ```

use bevy::prelude::*;
use rand::Rng;
use rand::seq::SliceRandom;

use crate::plugins::spatial::CellOrigin;

use super::patterns::{Blueprint, PatternLibrary, PatternSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    /// Not rolled yet.
    Pending,
    Spawned,
    Absent,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    pub blueprint: Blueprint,
    pub chance: f32,
    pub state: SlotState,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cell {
    pub slots: Vec<Slot>,
}

impl Cell {
    pub fn from_set(set: &PatternSet) -> Self {
        Self {
            slots: set
                .iter()
                .map(|p| Slot { blueprint: p.blueprint.clone(), chance: p.chance, state: SlotState::Pending })
                .collect(),
        }
    }
}

/// A slot that should exist in the world right now.
#[derive(Debug, Clone, PartialEq)]
pub struct Planned {
    pub origin: CellOrigin,
    /// Cell offset from the player cell, in cells.
    pub delta: IVec2,
    pub blueprint: Blueprint,
}

#[derive(Resource, Debug, Clone)]
pub struct WorldGrid {
    columns: Vec<Vec<Option<Cell>>>,
    /// Storage index of logical cell (0, 0).
    origin: IVec2,
    current: IVec2,
}

impl Default for WorldGrid {
    fn default() -> Self {
        Self::new()
    }
}

/// The 3×3 neighbourhood, as offsets.
pub const NEIGHBORHOOD: [IVec2; 9] = [
    IVec2::new(-1, -1),
    IVec2::new(0, -1),
    IVec2::new(1, -1),
    IVec2::new(-1, 0),
    IVec2::new(0, 0),
    IVec2::new(1, 0),
    IVec2::new(-1, 1),
    IVec2::new(0, 1),
    IVec2::new(1, 1),
];

impl WorldGrid {
    /// One-cell grid whose start cell is already visited and empty, so the player never
    /// spawns inside a wall or next to a turret.
    pub fn new() -> Self {
        Self { columns: vec![vec![Some(Cell::default())]], origin: IVec2::ZERO, current: IVec2::ZERO }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    pub fn is_rectangular(&self) -> bool {
        let h = self.height();
        self.columns.iter().all(|c| c.len() == h)
    }

    #[inline]
    pub fn current(&self) -> IVec2 {
        self.current
    }

    pub fn set_current(&mut self, cell: IVec2) {
        self.current = cell;
    }

    fn storage(&self, cell: IVec2) -> Option<(usize, usize)> {
        let s = cell + self.origin;
        if s.x < 0 || s.y < 0 || s.x as usize >= self.width() || s.y as usize >= self.height() {
            return None;
        }
        Some((s.x as usize, s.y as usize))
    }

    pub fn contains(&self, cell: IVec2) -> bool {
        self.storage(cell).is_some()
    }

    pub fn get(&self, cell: IVec2) -> Option<&Cell> {
        let (x, y) = self.storage(cell)?;
        self.columns[x][y].as_ref()
    }

    pub fn get_mut(&mut self, cell: IVec2) -> Option<&mut Cell> {
        let (x, y) = self.storage(cell)?;
        self.columns[x][y].as_mut()
    }

    /// Insert one empty ring on every side.
    pub fn grow(&mut self) {
        for column in &mut self.columns {
            column.insert(0, None);
            column.push(None);
        }
        let h = self.height();
        self.columns.insert(0, vec![None; h]);
        self.columns.push(vec![None; h]);
        self.origin += IVec2::ONE;
        info!("world grid grew to {}x{}", self.width(), self.height());
    }

    /// Grow until the 3×3 neighbourhood of `center` fits.
    pub fn ensure_neighborhood(&mut self, center: IVec2) {
        while !NEIGHBORHOOD.iter().all(|d| self.contains(center + *d)) {
            self.grow();
        }
    }

    /// Visit the neighbourhood of `center`: fill unvisited cells from the library, roll
    /// pending slots once, and list every slot that should be materialised.
    ///
    /// Rolled outcomes are cached, so revisiting a cell reproduces its contents.
    pub fn plan(&mut self, center: IVec2, rng: &mut impl Rng, library: &PatternLibrary) -> Vec<Planned> {
        self.ensure_neighborhood(center);
        let mut out = Vec::new();
        for delta in NEIGHBORHOOD {
            let cell = center + delta;
            let Some((x, y)) = self.storage(cell) else {
                continue;
            };
            let entry = &mut self.columns[x][y];
            if entry.is_none() {
                let Some(set) = library.sets.choose(rng) else {
                    continue;
                };
                debug!("cell {cell} gets a pattern set of {} slots", set.len());
                *entry = Some(Cell::from_set(set));
            }
            let Some(contents) = entry.as_mut() else {
                continue;
            };
            for (index, slot) in contents.slots.iter_mut().enumerate() {
                if slot.state == SlotState::Pending {
                    slot.state = if rng.r#gen::<f32>() < slot.chance { SlotState::Spawned } else { SlotState::Absent };
                }
                if slot.state == SlotState::Spawned {
                    out.push(Planned {
                        origin: CellOrigin { cell, slot: index },
                        delta,
                        blueprint: slot.blueprint.clone(),
                    });
                }
            }
        }
        out
    }

    /// Forget a slot for good (its turret died, its aid kit was picked up).
    pub fn retire(&mut self, origin: CellOrigin) {
        if let Some(slot) = self.get_mut(origin.cell).and_then(|c| c.slots.get_mut(origin.slot)) {
            slot.state = SlotState::Absent;
        }
    }

    pub fn slot_state(&self, origin: CellOrigin) -> Option<SlotState> {
        self.get(origin.cell).and_then(|c| c.slots.get(origin.slot)).map(|s| s.state)
    }
}

/// Screen position of the top-left corner of the cell `delta` cells away from the player
/// cell, given the current camera offset.
#[inline]
pub fn cell_anchor(delta: IVec2, camera_offset: Vec2, viewport: Vec2, cell: Vec2) -> Vec2 {
    (viewport - cell) * 0.5 - camera_offset + cell * delta.as_vec2()
}

/// Cell step implied by the camera offset. Consumes the crossed distance from `offset`,
/// so the remainder stays relative to the new cell's centre. Both axes may cross at once.
pub fn detect_crossing(offset: &mut Vec2, cell: Vec2) -> IVec2 {
    let half = cell * 0.5;
    let mut step = IVec2::ZERO;
    if offset.x > half.x {
        step.x = 1;
        offset.x -= cell.x;
    } else if offset.x < -half.x {
        step.x = -1;
        offset.x += cell.x;
    }
    if offset.y > half.y {
        step.y = 1;
        offset.y -= cell.y;
    } else if offset.y < -half.y {
        step.y = -1;
        offset.y += cell.y;
    }
    step
}

/// Chebyshev distance from the start cell.
#[inline]
pub fn distance_from_start(cell: IVec2) -> u32 {
    cell.x.unsigned_abs().max(cell.y.unsigned_abs())
}
