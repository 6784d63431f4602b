use crate::config::EngineConfig;
use crate::state::Level;
use crate::types::{CostVariant, HostileId, Pos};

/// Cost of stepping from `from` onto the adjacent cell `to` whose traversal value is `value`.
/// Returning `f32::INFINITY` forbids the step.
pub trait EdgeCost {
    fn cost(&self, from: Pos, to: Pos, value: f32) -> f32;
}

impl<F> EdgeCost for F
where
    F: Fn(Pos, Pos, f32) -> f32,
{
    fn cost(&self, from: Pos, to: Pos, value: f32) -> f32 {
        self(from, to, value)
    }
}

pub trait Heuristic {
    fn estimate(&self, from: Pos, goal: Pos) -> f32;
}

/// Straight-line distance between cell coordinates.
///
/// Step costs are scaled by terrain and are far below one per cell, so this estimate
/// overshoots the remaining cost on most maps. The search still terminates and returns
/// a valid route, but it behaves closer to greedy best-first than to optimal A*.
#[derive(Clone, Copy, Debug, Default)]
pub struct Euclidean;

impl Heuristic for Euclidean {
    fn estimate(&self, from: Pos, goal: Pos) -> f32 {
        (from.distance_sq(goal) as f32).sqrt()
    }
}

/// Base traversal cost for a cell value; walls are infinite.
pub fn terrain_cost(value: f32, scale: f32) -> f32 {
    if value.is_infinite() { f32::INFINITY } else { 1.0 / (value + 1.0) * scale }
}

/// Blocking rules plus terrain cost over one level snapshot.
#[derive(Clone, Copy, Debug)]
pub struct CostModel<'a> {
    level: &'a Level,
    variant: CostVariant,
    goal: Pos,
    pursued: Option<HostileId>,
    hostiles_alive: bool,
    scale: f32,
    discount: f32,
}

impl<'a> CostModel<'a> {
    pub fn base(level: &'a Level, goal: Pos, config: &EngineConfig) -> Self {
        Self {
            level,
            variant: CostVariant::Base,
            goal,
            pursued: None,
            hostiles_alive: level.any_hostile_alive(),
            scale: config.cost_scale,
            discount: config.recovery_discount,
        }
    }

    /// Entering a recovery-item cell costs `recovery_discount` times the base cost.
    pub fn recovery_aware(level: &'a Level, goal: Pos, config: &EngineConfig) -> Self {
        Self { variant: CostVariant::RecoveryAware, ..Self::base(level, goal, config) }
    }

    /// Lets the route end on (and only on) the pursued hostile's cell.
    pub fn pursuing(self, hostile: HostileId) -> Self {
        Self { pursued: Some(hostile), ..self }
    }

    pub fn variant(&self) -> CostVariant {
        self.variant
    }

    pub fn is_blocked(&self, to: Pos) -> bool {
        if self.level.live_hostile_at(to).is_some_and(|hostile| Some(hostile.id) != self.pursued) {
            return true;
        }
        // Exits stay closed while hostiles remain, unless the exit is the goal itself.
        self.hostiles_alive && to != self.goal && self.level.is_exit(to)
    }
}

impl EdgeCost for CostModel<'_> {
    fn cost(&self, _from: Pos, to: Pos, value: f32) -> f32 {
        if value.is_infinite() || self.is_blocked(to) {
            return f32::INFINITY;
        }
        let base = terrain_cost(value, self.scale);
        match self.variant {
            CostVariant::RecoveryAware if self.level.recovery_at(to).is_some() => {
                base * self.discount
            }
            _ => base,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Grid;
    use crate::types::OnHit;

    fn open_level() -> Level {
        Level::new(Grid::open(6, 4).expect("grid"))
    }

    #[test]
    fn base_cost_follows_inverse_value_formula() {
        let level = open_level();
        let model = CostModel::base(&level, Pos::new(5, 3), &EngineConfig::default());
        let from = Pos::new(0, 0);
        let to = Pos::new(1, 0);
        assert!((model.cost(from, to, 0.0) - 0.1).abs() < 1e-6);
        assert!((model.cost(from, to, 1.0) - 0.05).abs() < 1e-6);
        assert!(model.cost(from, to, f32::INFINITY).is_infinite());
    }

    #[test]
    fn live_hostiles_block_unless_pursued() {
        let mut level = open_level();
        let target = level.add_hostile(Pos::new(4, 1), 10.0, OnHit::Plain);
        let other = level.add_hostile(Pos::new(2, 1), 10.0, OnHit::Plain);
        let config = EngineConfig::default();

        let model = CostModel::base(&level, Pos::new(4, 1), &config).pursuing(target);
        assert!(!model.is_blocked(Pos::new(4, 1)));
        assert!(model.is_blocked(Pos::new(2, 1)));

        level.hostiles[other].defeated = true;
        let model = CostModel::base(&level, Pos::new(4, 1), &config).pursuing(target);
        assert!(!model.is_blocked(Pos::new(2, 1)));
    }

    #[test]
    fn exit_is_closed_while_hostiles_live_unless_it_is_the_goal() {
        let mut level = open_level();
        let exit = Pos::new(3, 2);
        level.add_exit(exit);
        let hostile = level.add_hostile(Pos::new(5, 3), 10.0, OnHit::Plain);
        let config = EngineConfig::default();

        assert!(CostModel::base(&level, Pos::new(5, 3), &config).is_blocked(exit));
        assert!(!CostModel::base(&level, exit, &config).is_blocked(exit));

        level.hostiles[hostile].defeated = true;
        assert!(!CostModel::base(&level, Pos::new(5, 3), &config).is_blocked(exit));
    }

    #[test]
    fn recovery_discount_only_applies_in_recovery_aware_variant() {
        let mut level = open_level();
        let item = Pos::new(2, 2);
        level.add_recovery(item, 20.0);
        let config = EngineConfig::default();
        let from = Pos::new(1, 1);

        let base = CostModel::base(&level, Pos::new(5, 3), &config);
        let aware = CostModel::recovery_aware(&level, Pos::new(5, 3), &config);
        assert_eq!(aware.variant(), CostVariant::RecoveryAware);
        assert!((base.cost(from, item, 0.0) - 0.1).abs() < 1e-6);
        assert!((aware.cost(from, item, 0.0) - 0.05).abs() < 1e-6);
        assert!((aware.cost(from, Pos::new(2, 1), 0.0) - 0.1).abs() < 1e-6);
    }

    #[test]
    fn closures_act_as_edge_costs() {
        let flat = |_from: Pos, _to: Pos, _value: f32| 1.0_f32;
        assert_eq!(flat.cost(Pos::new(0, 0), Pos::new(1, 0), 7.0), 1.0);
        assert_eq!(Euclidean.estimate(Pos::new(0, 0), Pos::new(3, 4)), 5.0);
    }
}
