//! Seeded reference world that executes autoplay moves.
//! Moves are resolved deterministically from the seed.
//! It does not own goal selection or pathfinding.

use std::collections::VecDeque;
use std::hash::Hasher;

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::SeedableRng;
use tracing::{debug, warn};
use xxhash_rust::xxh3::Xxh3;

use crate::autoplay::{MovementExecutor, WorldView};
use crate::config::EngineConfig;
use crate::nav::terrain_cost;
use crate::state::{Agent, Level, Snapshot};
use crate::types::*;

mod encounters;

/// Level lost by every cloud after each move.
pub const POISON_DECAY_PER_MOVE: f32 = 10.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PoisonCloud {
    pub source: HostileId,
    pub center: Pos,
    pub level: f32,
}

impl PoisonCloud {
    pub fn radius(&self) -> u32 {
        (self.level / 10.0).floor().max(0.0) as u32
    }

    pub fn covers(&self, pos: Pos) -> bool {
        self.center.chebyshev(pos) <= self.radius()
    }
}

/// A level waiting behind the current one, entered at `start`.
#[derive(Clone, Debug)]
pub struct Stage {
    pub level: Level,
    pub start: Pos,
}

pub struct Simulation {
    seed: u64,
    tick: u64,
    rng: ChaCha8Rng,
    config: EngineConfig,
    level: Level,
    level_index: usize,
    upcoming: VecDeque<Stage>,
    agent: Agent,
    clouds: Vec<PoisonCloud>,
    log: Vec<LogEvent>,
}

impl Simulation {
    pub fn new(seed: u64, level: Level, agent: Agent, config: EngineConfig) -> Self {
        Self {
            seed,
            tick: 0,
            rng: ChaCha8Rng::seed_from_u64(seed),
            config,
            level,
            level_index: 0,
            upcoming: VecDeque::new(),
            agent,
            clouds: Vec::new(),
            log: Vec::new(),
        }
    }

    /// Queues levels to play after the current one, in order.
    pub fn with_stages(mut self, stages: impl IntoIterator<Item = Stage>) -> Self {
        self.upcoming.extend(stages);
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of moves requested so far, including refused ones.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    /// Zero-based index of the level being played.
    pub fn level_index(&self) -> usize {
        self.level_index
    }

    pub fn levels_remaining(&self) -> usize {
        self.upcoming.len()
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    pub fn clouds(&self) -> &[PoisonCloud] {
        &self.clouds
    }

    pub fn log(&self) -> &[LogEvent] {
        &self.log
    }

    pub fn snapshot_hash(&self) -> u64 {
        let mut hasher = Xxh3::new();
        hasher.write_u64(self.seed);
        hasher.write_u64(self.tick);
        hasher.write_usize(self.level_index);
        hasher.write_i32(self.agent.pos.x);
        hasher.write_i32(self.agent.pos.y);
        hasher.write_u32(self.agent.health.to_bits());
        hasher.write_u32(self.agent.energy.to_bits());
        for hostile in self.level.hostiles.values() {
            hasher.write_i32(hostile.pos.x);
            hasher.write_i32(hostile.pos.y);
            hasher.write_u8(u8::from(hostile.defeated));
            if let OnHit::Teleport { hits } = hostile.on_hit {
                hasher.write_u8(hits);
            }
        }
        hasher.write_usize(self.level.recovery.len());
        for item in self.level.recovery.values() {
            hasher.write_i32(item.pos.x);
            hasher.write_i32(item.pos.y);
        }
        for cloud in &self.clouds {
            hasher.write_i32(cloud.center.x);
            hasher.write_i32(cloud.center.y);
            hasher.write_u32(cloud.level.to_bits());
        }
        hasher.finish()
    }

    fn down_outcome(&self) -> MoveOutcome {
        if self.agent.health <= 0.0 { MoveOutcome::Killed } else { MoveOutcome::OutOfEnergy }
    }

    fn pick_up_recovery(&mut self, pos: Pos) {
        let Some(id) = self.level.recovery_at(pos).map(|item| item.id) else {
            return;
        };
        if let Some(item) = self.level.recovery.remove(id) {
            self.agent.health = (self.agent.health + item.amount).min(self.config.max_health);
            self.log.push(LogEvent::RecoveryConsumed { item: id, amount: item.amount });
        }
    }

    /// Installs the next queued level. Vitals carry over; clouds stay behind.
    fn enter_next_level(&mut self) -> bool {
        let Some(Stage { level, start }) = self.upcoming.pop_front() else {
            return false;
        };
        self.level = level;
        self.level_index += 1;
        self.agent.pos = start;
        self.clouds.clear();
        debug!(index = self.level_index, ?start, "entered next level");
        self.log.push(LogEvent::LevelEntered { index: self.level_index, start });
        true
    }

    fn damage(&mut self, amount: f32) {
        self.agent.health -= amount;
        if self.agent.health <= 0.0 {
            self.agent.health = 0.0;
        }
    }
}

impl WorldView for Simulation {
    fn snapshot(&self) -> Snapshot<'_> {
        Snapshot::new(&self.level, self.agent)
    }
}

impl MovementExecutor for Simulation {
    fn apply_move(&mut self, delta: MoveDelta) -> MoveOutcome {
        self.tick += 1;
        if self.agent.is_down() {
            return self.down_outcome();
        }

        let from = self.agent.pos;
        let to = from.offset(delta);
        let value = match self.level.grid.value(to) {
            Some(value) if Direction::from_delta(delta).is_some() && value.is_finite() => value,
            _ => {
                debug!(?delta, ?from, "move rejected");
                return MoveOutcome::Blocked;
            }
        };

        let remaining = self.agent.energy - terrain_cost(value, self.config.cost_scale);
        if remaining < 0.0 {
            warn!(energy = self.agent.energy, "not enough energy for move");
            self.agent.energy = 0.0;
            self.log.push(LogEvent::EnergyDepleted);
            return MoveOutcome::OutOfEnergy;
        }
        self.agent.energy = remaining;
        self.agent.pos = to;

        self.pick_up_recovery(to);
        self.settle_clouds();
        self.resolve_encounter(from, to);

        if self.agent.health <= 0.0 {
            self.log.push(LogEvent::AgentDied);
            return MoveOutcome::Killed;
        }
        if self.agent.energy <= 0.0 {
            self.log.push(LogEvent::EnergyDepleted);
        }
        if self.level.is_exit(to) && !self.level.any_hostile_alive() {
            self.log.push(LogEvent::ExitReached { pos: to });
            if self.enter_next_level() {
                return MoveOutcome::LevelAdvanced;
            }
            self.log.push(LogEvent::AllLevelsCompleted);
            return MoveOutcome::AllLevelsCompleted;
        }
        MoveOutcome::Moved
    }
}
