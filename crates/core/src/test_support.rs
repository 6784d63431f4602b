//! Shared test fixtures for the crate's unit test suites.
//! This module exists to avoid repeating grid and level setup across many tests.
//! It does not own production planning logic.

use crate::nav::Path;
use crate::state::{Agent, Grid, Level};
use crate::types::*;

/// `#` is a wall, a digit `d` is traversal value `d / 10`, anything else is value 0.
pub(crate) fn grid_from_rows(rows: &[&str]) -> Grid {
    let cols = rows.first().map_or(0, |row| row.len());
    let values = rows
        .iter()
        .flat_map(|row| row.chars())
        .map(|cell| match cell {
            '#' => f32::INFINITY,
            digit @ '0'..='9' => digit.to_digit(10).map_or(0.0, |d| d as f32 / 10.0),
            _ => 0.0,
        })
        .collect();
    Grid::new(cols, rows.len(), values).expect("fixture rows must be rectangular")
}

/// Cells visited by following `path` from `start`, excluding `start`.
pub(crate) fn cells_on(start: Pos, path: &Path) -> Vec<Pos> {
    path.steps()
        .iter()
        .scan(start, |pos, dir| {
            *pos = pos.step(*dir);
            Some(*pos)
        })
        .collect()
}

pub(crate) fn walk(start: Pos, path: &Path) -> Pos {
    cells_on(start, path).last().copied().unwrap_or(start)
}

/// Open 10x6 room with the agent at (1, 3).
pub(crate) fn open_room_fixture() -> (Level, Agent) {
    let level = Level::new(Grid::open(10, 6).expect("grid"));
    (level, Agent::new(Pos::new(1, 3)))
}

/// 5x3 room with a single wall cell at (2, 1) and two mirror-image detours around it.
/// The agent stands at (0, 1) and a strength-10 hostile at (4, 1).
pub(crate) fn split_lane_fixture() -> (Level, Agent, HostileId) {
    let mut level = Level::new(grid_from_rows(&[
        ".....", //
        "..#..", //
        ".....",
    ]));
    let hostile = level.add_hostile(Pos::new(4, 1), 10.0, OnHit::Plain);
    (level, Agent::new(Pos::new(0, 1)), hostile)
}
