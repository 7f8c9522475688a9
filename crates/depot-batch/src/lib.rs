//! Scenario orchestration: one-scenario pipeline and the sequential batch
//! comparison built on top of it.

pub mod inputs;
pub mod pipeline;
pub mod record;
pub mod runner;

pub use inputs::{load_planning_data, resolve_fixed_costs, PlanningData};
pub use pipeline::{run_scenario, PipelineConfig, ScenarioOutcome};
pub use record::{RecordStatus, ScenarioRecord};
pub use runner::{run_scenarios_batch, BatchSummary};
