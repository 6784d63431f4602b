//! Grid search primitives: per-cell node bookkeeping, edge cost strategies and A*.
//! This module exists so route finding stays free of goal-selection policy.
//! It does not own target choice or per-tick movement.

mod astar;
mod cost;
mod node;

pub use astar::find_path;
pub use cost::{CostModel, EdgeCost, Euclidean, Heuristic, terrain_cost};
pub use node::{NodeArray, SearchNode};

use crate::types::{Direction, MoveDelta};

/// Ordered move codes from the start cell (excluded) to the goal cell.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Path {
    steps: Vec<Direction>,
}

impl Path {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[Direction] {
        &self.steps
    }

    pub fn get(&self, index: usize) -> Option<Direction> {
        self.steps.get(index).copied()
    }

    pub fn codes(&self) -> Vec<u8> {
        self.steps.iter().map(|dir| dir.code()).collect()
    }

    pub fn deltas(&self) -> impl Iterator<Item = MoveDelta> + '_ {
        self.steps.iter().map(|dir| dir.delta())
    }
}

impl From<Vec<Direction>> for Path {
    fn from(steps: Vec<Direction>) -> Self {
        Self { steps }
    }
}
