use crate::spec::ScenarioConfig;
use depot_algo::cost_matrix::{round_to, CostFactors, CostMatrix, CostMatrixBuilder};
use depot_core::{ClientId, DemandPoint, Facility};
use std::collections::HashMap;
use tracing::info;

/// Scale every client's demand by `1 + growth`.
pub fn apply_demand_growth(points: &[DemandPoint], growth: f64) -> Vec<DemandPoint> {
    let factor = 1.0 + growth;
    points.iter().map(|p| p.scaled(factor)).collect()
}

/// Per-client demand multipliers (missing clients keep multiplier 1.0);
/// the resulting demand is rounded to 2 decimals.
pub fn apply_demand_multipliers(
    points: &[DemandPoint],
    multipliers: &HashMap<ClientId, f64>,
) -> Vec<DemandPoint> {
    let out: Vec<DemandPoint> = points
        .iter()
        .map(|p| {
            let factor = multipliers.get(&p.id).copied().unwrap_or(1.0);
            let mut scaled = p.clone();
            scaled.demand = round_to(p.demand * factor, 2);
            scaled
        })
        .collect();
    info!(clients = out.len(), "demand multipliers applied");
    out
}

/// Grow demand and rebuild the cost matrix with the scenario's tax and wage
/// factors.
pub fn apply_scenario_and_recompute_costs(
    sites: &[Facility],
    points: &[DemandPoint],
    scenario: &ScenarioConfig,
    tariff_per_km: f64,
) -> CostMatrix {
    let grown = apply_demand_growth(points, scenario.demand_growth);
    CostMatrixBuilder::new(tariff_per_km)
        .with_factors(CostFactors::new(scenario.tax_factor, scenario.wage_factor))
        .build(sites, &grown)
}
