use slotmap::SlotMap;
use thiserror::Error;

use crate::types::*;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    #[error("grid must have at least one row and one column (got {cols}x{rows})")]
    Empty { cols: usize, rows: usize },

    #[error("expected {expected} traversal values for the grid, got {actual}")]
    ValueCount { expected: usize, actual: usize },

    #[error("traversal value {value} at ({x}, {y}) must be non-negative or +inf")]
    InvalidValue { x: i32, y: i32, value: f32 },

    #[error("cell ({x}, {y}) is outside the grid")]
    OutOfBounds { x: i32, y: i32 },
}

/// Row-major traversal values. `f32::INFINITY` marks a wall.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    cols: usize,
    rows: usize,
    values: Vec<f32>,
}

impl Grid {
    pub fn new(cols: usize, rows: usize, values: Vec<f32>) -> Result<Self, GridError> {
        if cols == 0 || rows == 0 {
            return Err(GridError::Empty { cols, rows });
        }
        if values.len() != cols * rows {
            return Err(GridError::ValueCount { expected: cols * rows, actual: values.len() });
        }
        let grid = Self { cols, rows, values };
        if let Some((idx, value)) =
            grid.values.iter().enumerate().find(|(_, value)| !is_valid_value(**value))
        {
            let pos = grid.pos_of(idx);
            return Err(GridError::InvalidValue { x: pos.x, y: pos.y, value: *value });
        }
        Ok(grid)
    }

    /// Wall-free grid where every cell has traversal value 0.
    pub fn open(cols: usize, rows: usize) -> Result<Self, GridError> {
        Self::new(cols, rows, vec![0.0; cols * rows])
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.cols && (pos.y as usize) < self.rows
    }

    pub fn index(&self, pos: Pos) -> Option<usize> {
        self.in_bounds(pos).then(|| (pos.y as usize) * self.cols + (pos.x as usize))
    }

    pub fn pos_of(&self, index: usize) -> Pos {
        Pos { y: (index / self.cols) as i32, x: (index % self.cols) as i32 }
    }

    pub fn value(&self, pos: Pos) -> Option<f32> {
        self.index(pos).map(|idx| self.values[idx])
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Out-of-bounds cells count as walls.
    pub fn is_wall(&self, pos: Pos) -> bool {
        self.value(pos).is_none_or(f32::is_infinite)
    }

    pub fn set_value(&mut self, pos: Pos, value: f32) -> Result<(), GridError> {
        let Some(idx) = self.index(pos) else {
            return Err(GridError::OutOfBounds { x: pos.x, y: pos.y });
        };
        if !is_valid_value(value) {
            return Err(GridError::InvalidValue { x: pos.x, y: pos.y, value });
        }
        self.values[idx] = value;
        Ok(())
    }

    pub fn set_wall(&mut self, pos: Pos) {
        if let Some(idx) = self.index(pos) {
            self.values[idx] = f32::INFINITY;
        }
    }

    pub fn passable_cells(&self) -> impl Iterator<Item = Pos> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter(|(_, value)| value.is_finite())
            .map(|(idx, _)| self.pos_of(idx))
    }
}

fn is_valid_value(value: f32) -> bool {
    value >= 0.0 && !value.is_nan()
}

/// Anything the planner can target: a position plus an "still in play" predicate.
pub trait Entity {
    fn pos(&self) -> Pos;

    fn is_active(&self) -> bool {
        true
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Hostile {
    pub id: HostileId,
    pub pos: Pos,
    pub strength: f32,
    pub defeated: bool,
    pub on_hit: OnHit,
}

impl Entity for Hostile {
    fn pos(&self) -> Pos {
        self.pos
    }

    fn is_active(&self) -> bool {
        !self.defeated
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RecoveryItem {
    pub id: RecoveryId,
    pub pos: Pos,
    pub amount: f32,
}

impl Entity for RecoveryItem {
    fn pos(&self) -> Pos {
        self.pos
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Exit {
    pub pos: Pos,
}

impl Entity for Exit {
    fn pos(&self) -> Pos {
        self.pos
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Agent {
    pub pos: Pos,
    pub health: f32,
    pub energy: f32,
}

impl Agent {
    pub fn new(pos: Pos) -> Self {
        Self { pos, health: 100.0, energy: 100.0 }
    }

    pub fn is_down(&self) -> bool {
        self.health <= 0.0 || self.energy <= 0.0
    }
}

/// Terrain plus every entity placed on it.
#[derive(Clone, Debug)]
pub struct Level {
    pub grid: Grid,
    pub hostiles: SlotMap<HostileId, Hostile>,
    pub recovery: SlotMap<RecoveryId, RecoveryItem>,
    pub exits: Vec<Exit>,
}

impl Level {
    pub fn new(grid: Grid) -> Self {
        Self {
            grid,
            hostiles: SlotMap::with_key(),
            recovery: SlotMap::with_key(),
            exits: Vec::new(),
        }
    }

    pub fn add_hostile(&mut self, pos: Pos, strength: f32, on_hit: OnHit) -> HostileId {
        let id = self.hostiles.insert(Hostile {
            id: HostileId::default(), // Will be overwritten
            pos,
            strength,
            defeated: false,
            on_hit,
        });
        self.hostiles[id].id = id;
        id
    }

    pub fn add_recovery(&mut self, pos: Pos, amount: f32) -> RecoveryId {
        let id = self.recovery.insert(RecoveryItem { id: RecoveryId::default(), pos, amount });
        self.recovery[id].id = id;
        id
    }

    pub fn add_exit(&mut self, pos: Pos) {
        self.exits.push(Exit { pos });
    }

    pub fn live_hostiles(&self) -> impl Iterator<Item = &Hostile> {
        self.hostiles.values().filter(|hostile| hostile.is_active())
    }

    pub fn any_hostile_alive(&self) -> bool {
        self.live_hostiles().next().is_some()
    }

    pub fn live_hostile_at(&self, pos: Pos) -> Option<&Hostile> {
        self.live_hostiles().find(|hostile| hostile.pos == pos)
    }

    pub fn recovery_at(&self, pos: Pos) -> Option<&RecoveryItem> {
        self.recovery.values().find(|item| item.pos == pos)
    }

    pub fn is_exit(&self, pos: Pos) -> bool {
        self.exits.iter().any(|exit| exit.pos == pos)
    }
}

/// Read-only view handed to the planner for one decision.
#[derive(Clone, Copy, Debug)]
pub struct Snapshot<'a> {
    pub level: &'a Level,
    pub agent: Agent,
}

impl<'a> Snapshot<'a> {
    pub fn new(level: &'a Level, agent: Agent) -> Self {
        Self { level, agent }
    }
}
