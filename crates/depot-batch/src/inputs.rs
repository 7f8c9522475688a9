//! Loading the planning inputs (facilities, clients, fixed costs) from a data
//! directory, estimating fixed costs when no table is supplied.

use anyhow::{anyhow, Context, Result};
use depot_algo::fixed_costs::{estimate_fixed_costs, CostEstimationConfig, FixedCostTable};
use depot_core::{DemandPoint, Facility};
use std::path::Path;
use tracing::info;

pub const FACILITIES_FILE: &str = "facilities.csv";
pub const CLIENTS_FILE: &str = "clients.csv";
pub const FIXED_COSTS_FILE: &str = "fixed_costs.csv";
pub const REGIONAL_COSTS_FILE: &str = "regional_costs.csv";

/// Everything a scenario run reads: sites, clients and (optionally) their
/// fixed costs.
#[derive(Debug, Clone, Default)]
pub struct PlanningData {
    pub facilities: Vec<Facility>,
    pub demand_points: Vec<DemandPoint>,
    /// `None` restricts a batch to cost-matrix aggregates
    pub fixed_costs: Option<FixedCostTable>,
}

impl PlanningData {
    pub fn new(facilities: Vec<Facility>, demand_points: Vec<DemandPoint>) -> Self {
        Self {
            facilities,
            demand_points,
            fixed_costs: None,
        }
    }

    pub fn with_fixed_costs(mut self, table: FixedCostTable) -> Self {
        self.fixed_costs = Some(table);
        self
    }

    pub fn require_fixed_costs(&self) -> Result<&FixedCostTable> {
        self.fixed_costs
            .as_ref()
            .ok_or_else(|| anyhow!("no fixed costs supplied for the facility set"))
    }
}

/// Load `facilities.csv`, `clients.csv` and the fixed costs from `data_dir`.
pub fn load_planning_data(data_dir: &Path, estimation: &CostEstimationConfig) -> Result<PlanningData> {
    let facilities_path = data_dir.join(FACILITIES_FILE);
    let facilities = depot_io::load_facilities(&facilities_path)
        .with_context(|| format!("loading '{}'", facilities_path.display()))?;
    let clients_path = data_dir.join(CLIENTS_FILE);
    let demand_points = depot_io::load_demand_points(&clients_path)
        .with_context(|| format!("loading '{}'", clients_path.display()))?;
    let fixed_costs = resolve_fixed_costs(data_dir, &facilities, estimation)?;

    info!(
        facilities = facilities.len(),
        clients = demand_points.len(),
        "planning data loaded"
    );
    Ok(PlanningData::new(facilities, demand_points).with_fixed_costs(fixed_costs))
}

/// Fixed costs in order of preference: `fixed_costs.csv`, an estimate from
/// `regional_costs.csv`, the facility table's own `fixed_cost` column.
pub fn resolve_fixed_costs(
    data_dir: &Path,
    facilities: &[Facility],
    estimation: &CostEstimationConfig,
) -> Result<FixedCostTable> {
    let explicit = data_dir.join(FIXED_COSTS_FILE);
    if explicit.exists() {
        return depot_io::load_fixed_costs(&explicit)
            .with_context(|| format!("loading '{}'", explicit.display()));
    }

    let regional_path = data_dir.join(REGIONAL_COSTS_FILE);
    if regional_path.exists() {
        let regional = depot_io::load_regional_costs(&regional_path)
            .with_context(|| format!("loading '{}'", regional_path.display()))?;
        let breakdowns = estimate_fixed_costs(facilities, &regional, estimation)
            .context("estimating fixed costs from regional proxies")?;
        return Ok(FixedCostTable::from_breakdowns(&breakdowns));
    }

    FixedCostTable::from_facilities(facilities).with_context(|| {
        format!(
            "provide {} or {} in '{}'",
            FIXED_COSTS_FILE,
            REGIONAL_COSTS_FILE,
            data_dir.display()
        )
    })
}
