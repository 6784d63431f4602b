//! Level descriptions for the command-line tools.
//! A scenario is either read from JSON or generated from a seed, then built into a
//! `Simulation`: the first level with its agent, followed by any queued levels.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail, ensure};
use pathpilot_core::{Agent, EngineConfig, Grid, Level, OnHit, Pos, Simulation, Stage};
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// One string per row: `#` wall, digit `d` value `d / 10`, `.` value 0.
    pub map: Vec<String>,
    pub agent: AgentSpec,
    #[serde(default)]
    pub hostiles: Vec<HostileSpec>,
    #[serde(default)]
    pub recovery: Vec<RecoverySpec>,
    #[serde(default)]
    pub exits: Vec<Cell>,
    /// Levels entered, in order, each time an open exit is taken.
    #[serde(default)]
    pub next_levels: Vec<LevelSpec>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelSpec {
    pub map: Vec<String>,
    pub start: Cell,
    #[serde(default)]
    pub hostiles: Vec<HostileSpec>,
    #[serde(default)]
    pub recovery: Vec<RecoverySpec>,
    #[serde(default)]
    pub exits: Vec<Cell>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl From<Cell> for Pos {
    fn from(cell: Cell) -> Self {
        Pos::new(cell.x, cell.y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentSpec {
    #[serde(flatten)]
    pub at: Cell,
    #[serde(default = "full")]
    pub health: f32,
    #[serde(default = "full")]
    pub energy: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HostileSpec {
    #[serde(flatten)]
    pub at: Cell,
    pub strength: f32,
    #[serde(default = "plain")]
    pub on_hit: OnHit,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecoverySpec {
    #[serde(flatten)]
    pub at: Cell,
    pub amount: f32,
}

fn full() -> f32 {
    100.0
}

fn plain() -> OnHit {
    OnHit::Plain
}

fn below(rng: &mut ChaCha8Rng, bound: usize) -> usize {
    rng.next_u64() as usize % bound.max(1)
}

fn take(free: &mut Vec<Cell>, rng: &mut ChaCha8Rng) -> Option<Cell> {
    if free.is_empty() { None } else { Some(free.swap_remove(below(rng, free.len()))) }
}

fn derive_level_seed(seed: u64, level_index: usize) -> u64 {
    let mut mixed = seed ^ 0x9E37_79B9_7F4A_7C15;
    mixed ^= (level_index as u64).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    mixed ^= mixed >> 30;
    mixed = mixed.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    mixed ^= mixed >> 27;
    mixed = mixed.wrapping_mul(0x94D0_49BB_1331_11EB);
    mixed ^ (mixed >> 31)
}

impl Scenario {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("Failed to deserialize scenario JSON")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario file: {}", path.display()))?;
        Self::from_json(&text)
    }

    /// `levels` random caves in a row, each with its own seed derived from `seed`.
    pub fn generate_levels(seed: u64, cols: usize, rows: usize, levels: usize) -> Self {
        let mut scenario = Self::generate(seed, cols, rows);
        scenario.next_levels = (1..levels)
            .map(|index| {
                let level = Self::generate(derive_level_seed(seed, index), cols, rows);
                LevelSpec {
                    map: level.map,
                    start: level.agent.at,
                    hostiles: level.hostiles,
                    recovery: level.recovery,
                    exits: level.exits,
                }
            })
            .collect();
        scenario
    }

    /// Random cave of `cols` x `rows`: about one wall in five, a handful of entities.
    pub fn generate(seed: u64, cols: usize, rows: usize) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let mut map: Vec<Vec<u8>> = (0..rows)
            .map(|_| {
                (0..cols)
                    .map(|_| match below(&mut rng, 10) {
                        0 | 1 => b'#',
                        2..=4 => b'.',
                        roll => b'0' + roll as u8,
                    })
                    .collect()
            })
            .collect();

        let mut free: Vec<Cell> = (0..rows)
            .flat_map(|y| (0..cols).map(move |x| Cell { x: x as i32, y: y as i32 }))
            .filter(|cell| map[cell.y as usize][cell.x as usize] != b'#')
            .collect();

        let start = take(&mut free, &mut rng).unwrap_or(Cell { x: 0, y: 0 });
        if let Some(cell) =
            map.get_mut(start.y as usize).and_then(|row| row.get_mut(start.x as usize))
        {
            *cell = b'.';
        }

        let mut hostiles = Vec::new();
        for _ in 0..1 + below(&mut rng, 4) {
            let Some(at) = take(&mut free, &mut rng) else { break };
            let on_hit = match below(&mut rng, 4) {
                0 => OnHit::Poison { level: (10 + below(&mut rng, 30)) as f32 },
                1 => OnHit::Teleport { hits: 0 },
                _ => OnHit::Plain,
            };
            hostiles.push(HostileSpec { at, strength: (5 + below(&mut rng, 50)) as f32, on_hit });
        }
        let mut recovery = Vec::new();
        for _ in 0..below(&mut rng, 4) {
            let Some(at) = take(&mut free, &mut rng) else { break };
            recovery.push(RecoverySpec { at, amount: (10 + below(&mut rng, 40)) as f32 });
        }
        let exits = take(&mut free, &mut rng).into_iter().collect();

        Self {
            map: map.into_iter().map(|row| String::from_utf8_lossy(&row).into_owned()).collect(),
            agent: AgentSpec { at: start, health: full(), energy: full() },
            hostiles,
            recovery,
            exits,
            next_levels: Vec::new(),
        }
    }

    /// Builds the first level and the agent standing on it.
    pub fn build(&self) -> Result<(Level, Agent)> {
        let (level, pos) =
            build_level(&self.map, self.agent.at, &self.hostiles, &self.recovery, &self.exits)?;
        let agent = Agent { pos, health: self.agent.health, energy: self.agent.energy };
        Ok((level, agent))
    }

    /// Builds every queued level after the first.
    pub fn stages(&self) -> Result<Vec<Stage>> {
        self.next_levels
            .iter()
            .enumerate()
            .map(|(index, spec)| {
                let (level, start) =
                    build_level(&spec.map, spec.start, &spec.hostiles, &spec.recovery, &spec.exits)
                        .with_context(|| format!("Invalid level {}", index + 1))?;
                Ok(Stage { level, start })
            })
            .collect()
    }

    pub fn simulation(&self, seed: u64, config: EngineConfig) -> Result<Simulation> {
        let (level, agent) = self.build()?;
        Ok(Simulation::new(seed, level, agent, config).with_stages(self.stages()?))
    }
}

fn build_level(
    map: &[String],
    start: Cell,
    hostiles: &[HostileSpec],
    recovery: &[RecoverySpec],
    exits: &[Cell],
) -> Result<(Level, Pos)> {
    let grid = parse_grid(map)?;
    let check = |what: &str, cell: Cell| -> Result<Pos> {
        let pos = Pos::from(cell);
        ensure!(grid.in_bounds(pos), "{what} at ({}, {}) is outside the map", cell.x, cell.y);
        ensure!(!grid.is_wall(pos), "{what} at ({}, {}) is inside a wall", cell.x, cell.y);
        Ok(pos)
    };

    let start = check("agent", start)?;
    let hostile_cells =
        hostiles.iter().map(|spec| check("hostile", spec.at)).collect::<Result<Vec<_>>>()?;
    let recovery_cells =
        recovery.iter().map(|spec| check("recovery item", spec.at)).collect::<Result<Vec<_>>>()?;
    let exit_cells = exits.iter().map(|&cell| check("exit", cell)).collect::<Result<Vec<_>>>()?;

    let mut level = Level::new(grid);
    for (spec, pos) in hostiles.iter().zip(hostile_cells) {
        level.add_hostile(pos, spec.strength, spec.on_hit);
    }
    for (spec, pos) in recovery.iter().zip(recovery_cells) {
        level.add_recovery(pos, spec.amount);
    }
    for pos in exit_cells {
        level.add_exit(pos);
    }
    Ok((level, start))
}

fn parse_grid(map: &[String]) -> Result<Grid> {
    let cols = map.first().map_or(0, |row| row.len());
    let mut values = Vec::with_capacity(cols * map.len());
    for (y, row) in map.iter().enumerate() {
        ensure!(row.len() == cols, "map row {y} has {} cells, expected {cols}", row.len());
        for (x, cell) in row.chars().enumerate() {
            values.push(match cell {
                '#' => f32::INFINITY,
                '.' => 0.0,
                digit @ '0'..='9' => digit.to_digit(10).map_or(0.0, |d| d as f32 / 10.0),
                other => bail!("unknown map cell {other:?} at ({x}, {y})"),
            });
        }
    }
    Grid::new(cols, map.len(), values).context("Failed to build grid")
}
