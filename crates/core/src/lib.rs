pub mod autoplay;
pub mod config;
pub mod nav;
pub mod policy;
pub mod sim;
pub mod state;
pub mod targets;
pub mod types;

#[cfg(test)]
mod test_support;

pub use autoplay::{AutoPlay, MovementExecutor, WorldView};
pub use config::{ConfigError, EngineConfig};
pub use nav::Path;
pub use policy::{PlanSummary, Planner};
pub use sim::{PoisonCloud, Simulation, Stage};
pub use state::{Agent, Grid, GridError, Level, Snapshot};
pub use types::*;
