use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    pub struct HostileId;
    pub struct RecoveryId;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub y: i32,
    pub x: i32,
}

impl Pos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { y, x }
    }

    pub fn offset(self, delta: MoveDelta) -> Self {
        Self { y: self.y + delta.dy, x: self.x + delta.dx }
    }

    pub fn step(self, dir: Direction) -> Self {
        self.offset(dir.delta())
    }

    /// Squared Euclidean distance, exact in integer arithmetic.
    pub fn distance_sq(self, other: Pos) -> i64 {
        let dx = i64::from(self.x) - i64::from(other.x);
        let dy = i64::from(self.y) - i64::from(other.y);
        dx * dx + dy * dy
    }

    pub fn chebyshev(self, other: Pos) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoveDelta {
    pub dx: i32,
    pub dy: i32,
}

/// Eight-way move code. The discriminant is the wire code (0 = north, clockwise).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Direction {
    North = 0,
    NorthEast = 1,
    East = 2,
    SouthEast = 3,
    South = 4,
    SouthWest = 5,
    West = 6,
    NorthWest = 7,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(usize::from(code)).copied()
    }

    pub fn delta(self) -> MoveDelta {
        let (dx, dy) = match self {
            Direction::North => (0, -1),
            Direction::NorthEast => (1, -1),
            Direction::East => (1, 0),
            Direction::SouthEast => (1, 1),
            Direction::South => (0, 1),
            Direction::SouthWest => (-1, 1),
            Direction::West => (-1, 0),
            Direction::NorthWest => (-1, -1),
        };
        MoveDelta { dx, dy }
    }

    pub fn from_delta(delta: MoveDelta) -> Option<Self> {
        Self::ALL.into_iter().find(|dir| dir.delta() == delta)
    }

    /// Direction of a single step from `from` to the adjacent cell `to`.
    pub fn between(from: Pos, to: Pos) -> Option<Self> {
        Self::from_delta(MoveDelta { dx: to.x - from.x, dy: to.y - from.y })
    }
}

/// Which kind of goal the held path serves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DecisionState {
    #[default]
    None,
    Threat,
    Recovery,
    Exit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CostVariant {
    Base,
    RecoveryAware,
}

/// Effect a hostile applies when the agent walks into it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum OnHit {
    Plain,
    Poison { level: f32 },
    Teleport { hits: u8 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DriveMode {
    Continuous,
    SingleShot,
}

/// Result reported by a movement executor for one requested step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveOutcome {
    Moved,
    Blocked,
    OutOfEnergy,
    Killed,
    /// The agent took an open exit and the executor loaded the next level.
    LevelAdvanced,
    /// The agent took the open exit of the last level.
    AllLevelsCompleted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StopReason {
    Requested,
    PathComplete,
    NothingToDo,
    PathBlocked,
    /// A single-shot path crossed into the next level.
    LevelAdvanced,
    AllLevelsCompleted,
    AgentDown,
}

#[derive(Clone, Debug, PartialEq)]
pub enum LogEvent {
    DecisionMade {
        state: DecisionState,
        target: Option<Pos>,
        cost_model: Option<CostVariant>,
        path_len: usize,
    },
    PathPlanned { target: Pos, path_len: usize },
    AutoPlayStarted { mode: DriveMode },
    AutoPlayStopped { reason: StopReason },
    RecoveryConsumed { item: RecoveryId, amount: f32 },
    HostileDefeated { hostile: HostileId },
    HostileTeleported { hostile: HostileId, to: Pos },
    PoisonApplied { hostile: HostileId, damage: f32 },
    ExitReached { pos: Pos },
    LevelEntered { index: usize, start: Pos },
    AllLevelsCompleted,
    AgentDied,
    EnergyDepleted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepTaken {
    pub delta: MoveDelta,
    pub outcome: MoveOutcome,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickResult {
    pub step: Option<StepTaken>,
    pub replanned: bool,
    pub stop_reason: Option<StopReason>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStopReason {
    Stopped(StopReason),
    BudgetExhausted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    pub ticks: u32,
    pub steps: u32,
    pub stop_reason: RunStopReason,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_codes_follow_clockwise_table() {
        let expected = [(0, -1), (1, -1), (1, 0), (1, 1), (0, 1), (-1, 1), (-1, 0), (-1, -1)];
        for (code, (dx, dy)) in expected.into_iter().enumerate() {
            let dir = Direction::from_code(code as u8).expect("code in range");
            assert_eq!(dir.code(), code as u8);
            assert_eq!(dir.delta(), MoveDelta { dx, dy });
        }
        assert_eq!(Direction::from_code(8), None);
    }

    #[test]
    fn between_rejects_non_adjacent_cells() {
        let origin = Pos::new(3, 3);
        assert_eq!(Direction::between(origin, Pos::new(4, 2)), Some(Direction::NorthEast));
        assert_eq!(Direction::between(origin, Pos::new(3, 3)), None);
        assert_eq!(Direction::between(origin, Pos::new(5, 3)), None);
    }

    #[test]
    fn pos_orders_by_row_then_column() {
        let mut cells = vec![Pos::new(2, 1), Pos::new(0, 2), Pos::new(1, 1)];
        cells.sort();
        assert_eq!(cells, vec![Pos::new(1, 1), Pos::new(2, 1), Pos::new(0, 2)]);
    }
}
