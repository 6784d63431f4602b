//! Goal-selection state machine and the path it currently holds.
//! This module exists to turn agent vitals plus a level snapshot into one search request.
//! It does not own movement, encounter resolution, or tick scheduling.

use tracing::debug;

use crate::config::EngineConfig;
use crate::nav::{CostModel, Euclidean, NodeArray, Path, find_path};
use crate::state::Snapshot;
use crate::targets::{exit_target, nearest, nearest_recovery, nearest_threat};
use crate::types::*;

/// What the most recent decision chose and how it searched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlanSummary {
    pub state: DecisionState,
    pub target: Option<Pos>,
    pub cost_model: Option<CostVariant>,
    pub path_len: usize,
}

pub struct Planner {
    config: EngineConfig,
    nodes: NodeArray,
    path: Path,
    cursor: usize,
    state: DecisionState,
    last_plan: Option<PlanSummary>,
    log: Vec<LogEvent>,
}

impl Planner {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            nodes: NodeArray::default(),
            path: Path::empty(),
            cursor: 0,
            state: DecisionState::None,
            last_plan: None,
            log: Vec::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> DecisionState {
        self.state
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn remaining(&self) -> usize {
        self.path.len().saturating_sub(self.cursor)
    }

    pub fn last_plan(&self) -> Option<PlanSummary> {
        self.last_plan
    }

    pub fn log(&self) -> &[LogEvent] {
        &self.log
    }

    pub(crate) fn push_log(&mut self, event: LogEvent) {
        self.log.push(event);
    }

    /// Chooses the next goal from the agent's vitals and replaces the held path.
    pub fn decide_next_action(&mut self, view: Snapshot<'_>) -> (DecisionState, &Path) {
        self.clear_path();
        let level = view.level;
        let agent = view.agent;
        let config = self.config;

        let summary = match nearest_threat(level, agent.pos) {
            Some(threat) if agent.health <= threat.strength => {
                // An item underfoot is not a goal: its path would be empty.
                let items = level.recovery.values().filter(|item| item.pos != agent.pos);
                match nearest(agent.pos, items) {
                    Some(item) => {
                        let model = CostModel::base(level, item.pos, &config);
                        self.search(view, item.pos, DecisionState::Recovery, model)
                    }
                    None => {
                        let model = CostModel::base(level, threat.pos, &config).pursuing(threat.id);
                        self.search(view, threat.pos, DecisionState::Threat, model)
                    }
                }
            }
            Some(threat) if agent.health < config.wounded_threshold => {
                let model =
                    CostModel::recovery_aware(level, threat.pos, &config).pursuing(threat.id);
                self.search(view, threat.pos, DecisionState::Threat, model)
            }
            Some(threat) => {
                let model = CostModel::base(level, threat.pos, &config).pursuing(threat.id);
                self.search(view, threat.pos, DecisionState::Threat, model)
            }
            None => match exit_target(level) {
                Some(exit) => {
                    let model = CostModel::base(level, exit.pos, &config);
                    self.search(view, exit.pos, DecisionState::Exit, model)
                }
                None => {
                    self.state = DecisionState::None;
                    PlanSummary {
                        state: DecisionState::None,
                        target: None,
                        cost_model: None,
                        path_len: 0,
                    }
                }
            },
        };

        debug!(
            state = ?summary.state,
            target = ?summary.target,
            cost_model = ?summary.cost_model,
            path_len = summary.path_len,
            "decision made"
        );
        self.log.push(LogEvent::DecisionMade {
            state: summary.state,
            target: summary.target,
            cost_model: summary.cost_model,
            path_len: summary.path_len,
        });
        self.last_plan = Some(summary);
        (self.state, &self.path)
    }

    /// Plans straight to `cell` with the base cost model; no hostile is exempt from blocking.
    pub fn plan_path_to(&mut self, view: Snapshot<'_>, cell: Pos) -> &Path {
        self.clear_path();
        if !view.level.grid.in_bounds(cell) {
            debug!(?cell, "goal outside grid");
            self.state = DecisionState::None;
            self.log.push(LogEvent::PathPlanned { target: cell, path_len: 0 });
            return &self.path;
        }
        let config = self.config;
        let model = CostModel::base(view.level, cell, &config);
        let summary = self.search(view, cell, DecisionState::None, model);
        self.log.push(LogEvent::PathPlanned { target: cell, path_len: summary.path_len });
        self.last_plan = Some(summary);
        &self.path
    }

    pub fn plan_to_nearest_threat(&mut self, view: Snapshot<'_>) -> bool {
        self.clear_path();
        let Some(threat) = nearest_threat(view.level, view.agent.pos) else {
            self.state = DecisionState::None;
            return false;
        };
        let config = self.config;
        let model = CostModel::base(view.level, threat.pos, &config).pursuing(threat.id);
        self.record_single(view, threat.pos, DecisionState::Threat, model)
    }

    pub fn plan_to_nearest_recovery(&mut self, view: Snapshot<'_>) -> bool {
        self.clear_path();
        let Some(item) = nearest_recovery(view.level, view.agent.pos) else {
            self.state = DecisionState::None;
            return false;
        };
        let config = self.config;
        let model = CostModel::base(view.level, item.pos, &config);
        self.record_single(view, item.pos, DecisionState::Recovery, model)
    }

    pub fn plan_to_exit(&mut self, view: Snapshot<'_>) -> bool {
        self.clear_path();
        let Some(exit) = exit_target(view.level) else {
            self.state = DecisionState::None;
            return false;
        };
        let config = self.config;
        let model = CostModel::base(view.level, exit.pos, &config);
        self.record_single(view, exit.pos, DecisionState::Exit, model)
    }

    /// Pops the next move of the held path.
    pub fn next_step(&mut self) -> Option<MoveDelta> {
        let dir = self.path.get(self.cursor)?;
        self.cursor += 1;
        Some(dir.delta())
    }

    /// Drops the held path and returns to the `None` state.
    pub fn stop(&mut self) {
        self.clear_path();
        self.state = DecisionState::None;
    }

    pub(crate) fn clear_path(&mut self) {
        self.path = Path::empty();
        self.cursor = 0;
    }

    fn record_single(
        &mut self,
        view: Snapshot<'_>,
        target: Pos,
        state: DecisionState,
        model: CostModel<'_>,
    ) -> bool {
        let summary = self.search(view, target, state, model);
        self.log.push(LogEvent::PathPlanned { target, path_len: summary.path_len });
        self.last_plan = Some(summary);
        !self.path.is_empty()
    }

    fn search(
        &mut self,
        view: Snapshot<'_>,
        target: Pos,
        state: DecisionState,
        model: CostModel<'_>,
    ) -> PlanSummary {
        self.nodes.reset(&view.level.grid);
        self.path = find_path(
            &mut self.nodes,
            view.agent.pos,
            target,
            &model,
            &Euclidean,
            self.config.heuristic_weight,
        );
        self.cursor = 0;
        self.state = state;
        PlanSummary {
            state,
            target: Some(target),
            cost_model: Some(model.variant()),
            path_len: self.path.len(),
        }
    }
}
