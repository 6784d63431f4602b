use pathpilot_core::{
    Agent, AutoPlay, DecisionState, EngineConfig, Grid, Level, LogEvent, MovementExecutor, OnHit,
    Pos, RunStopReason, Simulation, Stage, StopReason, WorldView,
};

fn open_level(cols: usize, rows: usize) -> Level {
    Level::new(Grid::open(cols, rows).expect("grid"))
}

fn agent_at(x: i32, y: i32, health: f32) -> Agent {
    Agent { health, ..Agent::new(Pos::new(x, y)) }
}

fn decisions(log: &[LogEvent]) -> Vec<DecisionState> {
    log.iter()
        .filter_map(|event| match event {
            LogEvent::DecisionMade { state, .. } => Some(*state),
            _ => None,
        })
        .collect()
}

#[test]
fn continuous_play_clears_hostiles_then_takes_exit() {
    let mut level = open_level(10, 6);
    let near = level.add_hostile(Pos::new(4, 3), 20.0, OnHit::Plain);
    let far = level.add_hostile(Pos::new(6, 1), 20.0, OnHit::Plain);
    level.add_exit(Pos::new(8, 3));
    let mut sim = Simulation::new(11, level, agent_at(1, 3, 100.0), EngineConfig::default());
    let mut driver = AutoPlay::new(EngineConfig::default());

    assert_eq!(driver.start(&sim), DecisionState::Threat);
    let result = driver.run(&mut sim, 200);

    assert_eq!(result.stop_reason, RunStopReason::Stopped(StopReason::AllLevelsCompleted));
    assert!(sim.level().hostiles[near].defeated);
    assert!(sim.level().hostiles[far].defeated);
    assert_eq!(sim.agent().pos, Pos::new(8, 3));
    assert_eq!(sim.agent().health, 60.0);
    assert_eq!(
        decisions(driver.log()),
        vec![DecisionState::Threat, DecisionState::Threat, DecisionState::Exit]
    );
    assert!(!driver.is_active());
}

#[test]
fn outmatched_agent_heals_before_fighting() {
    let mut level = open_level(10, 6);
    let hostile = level.add_hostile(Pos::new(6, 3), 40.0, OnHit::Plain);
    let item = level.add_recovery(Pos::new(1, 5), 50.0);
    let mut sim = Simulation::new(5, level, agent_at(1, 3, 30.0), EngineConfig::default());
    let mut driver = AutoPlay::new(EngineConfig::default());

    assert_eq!(driver.start(&sim), DecisionState::Recovery);
    let result = driver.run(&mut sim, 200);

    assert_eq!(result.stop_reason, RunStopReason::Stopped(StopReason::NothingToDo));
    assert!(sim.level().hostiles[hostile].defeated);
    assert_eq!(sim.agent().health, 40.0);
    assert!(sim.log().contains(&LogEvent::RecoveryConsumed { item, amount: 50.0 }));
    assert_eq!(
        decisions(driver.log()),
        vec![DecisionState::Recovery, DecisionState::Threat, DecisionState::None]
    );
}

#[test]
fn outmatched_agent_standing_on_an_item_does_not_stall() {
    let mut level = open_level(10, 6);
    let hostile = level.add_hostile(Pos::new(6, 3), 40.0, OnHit::Plain);
    level.add_recovery(Pos::new(1, 3), 20.0);
    let mut sim = Simulation::new(5, level, agent_at(1, 3, 30.0), EngineConfig::default());
    let mut driver = AutoPlay::new(EngineConfig::default());

    assert_eq!(driver.start(&sim), DecisionState::Threat);
    let result = driver.run(&mut sim, 200);

    assert_eq!(result.stop_reason, RunStopReason::Stopped(StopReason::AgentDown));
    assert_eq!(result.steps, 5);
    assert!(!sim.level().hostiles[hostile].defeated);
    assert_eq!(decisions(driver.log()), vec![DecisionState::Threat]);
}

#[test]
fn hopeless_fight_ends_with_agent_down() {
    let mut level = open_level(10, 6);
    let hostile = level.add_hostile(Pos::new(4, 3), 40.0, OnHit::Plain);
    let mut sim = Simulation::new(5, level, agent_at(1, 3, 30.0), EngineConfig::default());
    let mut driver = AutoPlay::new(EngineConfig::default());

    assert_eq!(driver.start(&sim), DecisionState::Threat);
    let result = driver.run(&mut sim, 200);

    assert_eq!(result.stop_reason, RunStopReason::Stopped(StopReason::AgentDown));
    assert_eq!(result.steps, 3);
    assert_eq!(sim.agent().health, 0.0);
    assert!(!sim.level().hostiles[hostile].defeated);
    assert_eq!(sim.log().last(), Some(&LogEvent::AgentDied));
}

#[test]
fn running_dry_on_energy_stops_the_driver() {
    let mut level = open_level(10, 6);
    level.add_exit(Pos::new(8, 3));
    let agent = Agent { energy: 0.25, ..Agent::new(Pos::new(1, 3)) };
    let mut sim = Simulation::new(5, level, agent, EngineConfig::default());
    let mut driver = AutoPlay::new(EngineConfig::default());

    driver.start(&sim);
    let result = driver.run(&mut sim, 200);

    assert_eq!(result.stop_reason, RunStopReason::Stopped(StopReason::AgentDown));
    assert_eq!(result.steps, 3);
    assert_eq!(sim.agent().pos, Pos::new(3, 3));
    assert_eq!(sim.agent().energy, 0.0);
}

#[test]
fn tick_budget_bounds_a_run() {
    let mut level = open_level(10, 6);
    level.add_exit(Pos::new(8, 3));
    let mut sim = Simulation::new(5, level, Agent::new(Pos::new(1, 3)), EngineConfig::default());
    let mut driver = AutoPlay::new(EngineConfig::default());

    driver.start(&sim);
    let result = driver.run(&mut sim, 2);

    assert_eq!(result.stop_reason, RunStopReason::BudgetExhausted);
    assert_eq!((result.ticks, result.steps), (2, 2));
    assert!(driver.is_active());
    assert_eq!(sim.agent().pos, Pos::new(3, 3));
}

#[test]
fn one_shot_commands_stop_at_their_target() {
    let mut level = open_level(10, 6);
    level.add_recovery(Pos::new(4, 1), 10.0);
    let hostile = level.add_hostile(Pos::new(7, 4), 10.0, OnHit::Plain);
    let mut sim = Simulation::new(5, level, agent_at(1, 3, 50.0), EngineConfig::default());
    let mut driver = AutoPlay::new(EngineConfig::default());

    assert!(driver.take_nearest_recovery(&sim));
    let result = driver.run(&mut sim, 50);
    assert_eq!(result.stop_reason, RunStopReason::Stopped(StopReason::PathComplete));
    assert_eq!(sim.agent().pos, Pos::new(4, 1));
    assert_eq!(sim.agent().health, 60.0);
    assert!(!driver.take_nearest_recovery(&sim));

    assert!(driver.attack_nearest_threat(&sim));
    driver.run(&mut sim, 50);
    assert!(sim.level().hostiles[hostile].defeated);

    assert!(driver.go_to(&sim, Pos::new(0, 0)));
    driver.run(&mut sim, 50);
    assert_eq!(sim.snapshot().agent.pos, Pos::new(0, 0));
}

#[test]
fn driver_only_ever_requests_unit_moves() {
    let mut level = open_level(12, 8);
    level.grid.set_wall(Pos::new(5, 2));
    level.grid.set_wall(Pos::new(5, 3));
    level.grid.set_wall(Pos::new(5, 4));
    level.add_hostile(Pos::new(9, 3), 10.0, OnHit::Plain);
    level.add_exit(Pos::new(11, 7));

    struct Audited(Simulation);
    impl WorldView for Audited {
        fn snapshot(&self) -> pathpilot_core::Snapshot<'_> {
            self.0.snapshot()
        }
    }
    impl MovementExecutor for Audited {
        fn apply_move(&mut self, delta: pathpilot_core::MoveDelta) -> pathpilot_core::MoveOutcome {
            assert!(delta.dx.abs() <= 1 && delta.dy.abs() <= 1);
            assert!((delta.dx, delta.dy) != (0, 0));
            self.0.apply_move(delta)
        }
    }

    let mut world = Audited(Simulation::new(
        3,
        level,
        Agent::new(Pos::new(1, 3)),
        EngineConfig::default(),
    ));
    let mut driver = AutoPlay::new(EngineConfig::default());
    driver.start(&world);
    let result = driver.run(&mut world, 200);
    assert_eq!(result.stop_reason, RunStopReason::Stopped(StopReason::AllLevelsCompleted));
}

fn two_level_run() -> Simulation {
    let mut first = open_level(10, 6);
    first.add_exit(Pos::new(4, 3));
    let mut second = open_level(10, 6);
    second.add_hostile(Pos::new(5, 3), 20.0, OnHit::Plain);
    second.add_exit(Pos::new(8, 3));
    Simulation::new(21, first, agent_at(1, 3, 100.0), EngineConfig::default())
        .with_stages([Stage { level: second, start: Pos::new(2, 3) }])
}

#[test]
fn continuous_play_carries_on_through_every_level() {
    let mut sim = two_level_run();
    let mut driver = AutoPlay::new(EngineConfig::default());

    assert_eq!(driver.start(&sim), DecisionState::Exit);
    let result = driver.run(&mut sim, 200);

    assert_eq!(result.stop_reason, RunStopReason::Stopped(StopReason::AllLevelsCompleted));
    assert_eq!((result.ticks, result.steps), (9, 9));
    assert_eq!(sim.level_index(), 1);
    assert_eq!(sim.agent().pos, Pos::new(8, 3));
    assert_eq!(sim.agent().health, 80.0);
    assert_eq!(
        decisions(driver.log()),
        vec![DecisionState::Exit, DecisionState::Threat, DecisionState::Exit]
    );
    assert!(sim.log().contains(&LogEvent::LevelEntered { index: 1, start: Pos::new(2, 3) }));
    assert_eq!(sim.log().last(), Some(&LogEvent::AllLevelsCompleted));
}

#[test]
fn single_shot_stops_when_it_crosses_into_the_next_level() {
    let mut sim = two_level_run();
    let mut driver = AutoPlay::new(EngineConfig::default());

    assert!(driver.go_to(&sim, Pos::new(4, 3)));
    let result = driver.run(&mut sim, 50);

    assert_eq!(result.stop_reason, RunStopReason::Stopped(StopReason::LevelAdvanced));
    assert_eq!(result.steps, 3);
    assert_eq!(sim.level_index(), 1);
    assert_eq!(sim.agent().pos, Pos::new(2, 3));
    assert!(!driver.is_active());

    assert!(driver.attack_nearest_threat(&sim));
    let result = driver.run(&mut sim, 50);
    assert_eq!(result.stop_reason, RunStopReason::Stopped(StopReason::PathComplete));
    assert!(sim.level().live_hostiles().next().is_none());
}
