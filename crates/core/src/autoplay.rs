//! Per-tick driver that feeds the held path to a movement executor one step at a time.
//! This module exists so an external scheduler only has to call `tick`.
//! It does not own goal choice (see `policy`) or the effects of a step (see `sim`).

use tracing::{debug, trace, warn};

use crate::config::EngineConfig;
use crate::policy::Planner;
use crate::state::Snapshot;
use crate::types::*;

/// Read access to the world a decision is made against.
pub trait WorldView {
    fn snapshot(&self) -> Snapshot<'_>;
}

/// Applies one step of agent movement: energy, encounters, pickups, exits.
pub trait MovementExecutor: WorldView {
    fn apply_move(&mut self, delta: MoveDelta) -> MoveOutcome;
}

pub struct AutoPlay {
    planner: Planner,
    mode: Option<DriveMode>,
}

impl AutoPlay {
    pub fn new(config: EngineConfig) -> Self {
        Self { planner: Planner::new(config), mode: None }
    }

    pub fn planner(&self) -> &Planner {
        &self.planner
    }

    pub fn mode(&self) -> Option<DriveMode> {
        self.mode
    }

    pub fn is_active(&self) -> bool {
        self.mode.is_some()
    }

    pub fn log(&self) -> &[LogEvent] {
        self.planner.log()
    }

    /// Starts continuous play: decide now, replan whenever the path runs out.
    pub fn start<W: WorldView + ?Sized>(&mut self, world: &W) -> DecisionState {
        self.stop();
        let view = world.snapshot();
        if view.agent.is_down() {
            debug!("agent is down; autoplay not started");
            return DecisionState::None;
        }
        let (state, _) = self.planner.decide_next_action(view);
        self.activate(DriveMode::Continuous);
        state
    }

    /// Follows one path to `cell`, then stops.
    pub fn go_to<W: WorldView + ?Sized>(&mut self, world: &W, cell: Pos) -> bool {
        self.stop();
        let planned = !self.planner.plan_path_to(world.snapshot(), cell).is_empty();
        self.start_single_shot(planned)
    }

    pub fn attack_nearest_threat<W: WorldView + ?Sized>(&mut self, world: &W) -> bool {
        self.stop();
        let planned = self.planner.plan_to_nearest_threat(world.snapshot());
        self.start_single_shot(planned)
    }

    pub fn take_nearest_recovery<W: WorldView + ?Sized>(&mut self, world: &W) -> bool {
        self.stop();
        let planned = self.planner.plan_to_nearest_recovery(world.snapshot());
        self.start_single_shot(planned)
    }

    /// Clears the held path and decision state. Idempotent.
    pub fn stop(&mut self) {
        self.halt(StopReason::Requested);
    }

    /// Advances by at most one step, replanning first if continuous play ran out of path.
    pub fn tick<W: MovementExecutor + ?Sized>(&mut self, world: &mut W) -> TickResult {
        let Some(mode) = self.mode else {
            return TickResult { step: None, replanned: false, stop_reason: None };
        };
        if world.snapshot().agent.is_down() {
            return self.finish(None, false, StopReason::AgentDown);
        }

        let mut replanned = false;
        let delta = match self.planner.next_step() {
            Some(delta) => delta,
            None if mode == DriveMode::SingleShot => {
                return self.finish(None, false, StopReason::PathComplete);
            }
            None => {
                self.planner.decide_next_action(world.snapshot());
                replanned = true;
                match self.planner.next_step() {
                    Some(delta) => delta,
                    None => return self.finish(None, true, StopReason::NothingToDo),
                }
            }
        };

        let outcome = world.apply_move(delta);
        let step = Some(StepTaken { delta, outcome });
        trace!(?delta, ?outcome, replanned, "autoplay step");

        let stop_reason = match outcome {
            MoveOutcome::Moved if world.snapshot().agent.is_down() => Some(StopReason::AgentDown),
            MoveOutcome::Moved => None,
            MoveOutcome::Blocked => {
                warn!(?delta, "executor rejected step; dropping path");
                match mode {
                    DriveMode::SingleShot => Some(StopReason::PathBlocked),
                    DriveMode::Continuous => {
                        self.planner.clear_path();
                        None
                    }
                }
            }
            MoveOutcome::LevelAdvanced => match mode {
                DriveMode::SingleShot => Some(StopReason::LevelAdvanced),
                DriveMode::Continuous => {
                    debug!("level advanced; replanning on the next tick");
                    self.planner.clear_path();
                    None
                }
            },
            MoveOutcome::AllLevelsCompleted => Some(StopReason::AllLevelsCompleted),
            MoveOutcome::OutOfEnergy | MoveOutcome::Killed => Some(StopReason::AgentDown),
        };

        match stop_reason {
            Some(reason) => self.finish(step, replanned, reason),
            None => TickResult { step, replanned, stop_reason: None },
        }
    }

    /// Ticks until the driver stops or `max_ticks` is spent.
    pub fn run<W: MovementExecutor + ?Sized>(
        &mut self,
        world: &mut W,
        max_ticks: u32,
    ) -> RunResult {
        let mut ticks = 0;
        let mut steps = 0;
        while ticks < max_ticks {
            let result = self.tick(world);
            ticks += 1;
            if result.step.is_some() {
                steps += 1;
            }
            if let Some(reason) = result.stop_reason {
                return RunResult { ticks, steps, stop_reason: RunStopReason::Stopped(reason) };
            }
            if !self.is_active() {
                return RunResult {
                    ticks,
                    steps,
                    stop_reason: RunStopReason::Stopped(StopReason::Requested),
                };
            }
        }
        RunResult { ticks, steps, stop_reason: RunStopReason::BudgetExhausted }
    }

    fn start_single_shot(&mut self, planned: bool) -> bool {
        if planned {
            self.activate(DriveMode::SingleShot);
        }
        planned
    }

    fn activate(&mut self, mode: DriveMode) {
        self.mode = Some(mode);
        self.planner.push_log(LogEvent::AutoPlayStarted { mode });
    }

    fn finish(
        &mut self,
        step: Option<StepTaken>,
        replanned: bool,
        reason: StopReason,
    ) -> TickResult {
        self.halt(reason);
        TickResult { step, replanned, stop_reason: Some(reason) }
    }

    fn halt(&mut self, reason: StopReason) {
        self.planner.stop();
        if self.mode.take().is_some() {
            debug!(?reason, "autoplay stopped");
            self.planner.push_log(LogEvent::AutoPlayStopped { reason });
        }
    }
}
