//! Named what-if scenarios for site selection.
//!
//! A scenario scales demand, applies tax and wage multipliers to freight, and
//! (through [`ScenarioPolicy`]) decides how many new sites may or must open.

pub mod apply;
pub mod policy;
pub mod spec;

pub use apply::{apply_demand_growth, apply_demand_multipliers, apply_scenario_and_recompute_costs};
pub use policy::{NetworkConstraints, ScenarioPolicy};
pub use spec::{
    default_scenarios, find_scenario, load_scenario_set, load_scenarios, resolve_scenarios,
    validate, NamedScenario, ScenarioConfig, ScenarioEntry, ScenarioSet,
};
