//! One scenario end to end: group facilities, grow demand, rebuild costs,
//! derive the network constraints, solve and price the result.

use crate::inputs::PlanningData;
use anyhow::{Context, Result};
use depot_algo::cost_matrix::CostMatrix;
use depot_algo::financials::{compute_financials, FinancialSummary};
use depot_algo::fixed_costs::FixedCostTable;
use depot_algo::location::{
    FacilityLocationSolver, LocationOptions, LocationSolverConfig, SolutionResult,
};
use depot_core::{partition_facilities, AppConfig};
use depot_scenarios::{
    apply_scenario_and_recompute_costs, NamedScenario, NetworkConstraints, ScenarioPolicy,
};
use serde::Serialize;
use tracing::info;

/// Settings shared by every scenario of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub tariff_per_km: f64,
    pub unit_revenue: f64,
    pub policy: ScenarioPolicy,
    pub solver: LocationSolverConfig,
    pub horizon_years: usize,
    pub discount_rate: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let app = AppConfig::default();
        Self {
            tariff_per_km: app.tariff_per_km,
            unit_revenue: app.default_unit_revenue,
            policy: ScenarioPolicy::from_app_config(&app),
            solver: LocationSolverConfig::default(),
            horizon_years: app.horizon_years,
            discount_rate: app.discount_rate,
        }
    }
}

impl PipelineConfig {
    pub fn from_app_config(config: &AppConfig) -> Result<Self> {
        let solver = LocationSolverConfig::from_app_config(config)
            .context("selecting the MILP backend")?;
        Ok(Self {
            tariff_per_km: config.tariff_per_km,
            unit_revenue: config.default_unit_revenue,
            policy: ScenarioPolicy::from_app_config(config),
            solver,
            horizon_years: config.horizon_years,
            discount_rate: config.discount_rate,
        })
    }

    pub fn with_policy(mut self, policy: ScenarioPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_solver(mut self, solver: LocationSolverConfig) -> Self {
        self.solver = solver;
        self
    }

    pub fn with_tariff(mut self, tariff_per_km: f64) -> Self {
        self.tariff_per_km = tariff_per_km;
        self
    }
}

/// Solved scenario with the matrix it was solved against.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioOutcome {
    pub scenario: String,
    pub constraints: NetworkConstraints,
    pub solution: SolutionResult,
    pub financials: FinancialSummary,
    #[serde(skip)]
    pub matrix: CostMatrix,
}

pub fn run_scenario(
    data: &PlanningData,
    scenario: &NamedScenario,
    config: &PipelineConfig,
) -> Result<ScenarioOutcome> {
    let fixed_costs = data.require_fixed_costs()?;
    let matrix = apply_scenario_and_recompute_costs(
        &data.facilities,
        &data.demand_points,
        &scenario.config,
        config.tariff_per_km,
    );
    solve_on_matrix(data, scenario, config, matrix, fixed_costs)
}

pub(crate) fn solve_on_matrix(
    data: &PlanningData,
    scenario: &NamedScenario,
    config: &PipelineConfig,
    matrix: CostMatrix,
    fixed_costs: &FixedCostTable,
) -> Result<ScenarioOutcome> {
    let (existing, candidates) = partition_facilities(&data.facilities);
    let constraints = config
        .policy
        .constraints(&scenario.name, &scenario.config, existing.len());
    let options = constraints.apply_to(
        LocationOptions::new()
            .with_forced_open(existing)
            .with_candidates(candidates)
            .with_facility_capacities(&data.facilities),
    );

    let solution = FacilityLocationSolver::from_config(&config.solver)
        .solve(&matrix, fixed_costs, &options)
        .with_context(|| format!("solving scenario '{}'", scenario.name))?;
    let financials = compute_financials(
        &solution.allocation,
        &matrix,
        config.unit_revenue,
        solution.fixed_cost,
    );

    info!(
        scenario = %scenario.name,
        open = solution.num_open(),
        total_cost = solution.total_cost,
        margin = financials.margin,
        "scenario solved"
    );
    Ok(ScenarioOutcome {
        scenario: scenario.name.clone(),
        constraints,
        solution,
        financials,
        matrix,
    })
}
