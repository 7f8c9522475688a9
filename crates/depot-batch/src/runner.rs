use crate::inputs::PlanningData;
use crate::pipeline::{solve_on_matrix, PipelineConfig};
use crate::record::{RecordStatus, ScenarioRecord};
use chrono::{DateTime, Utc};
use depot_algo::cost_matrix::round_to;
use depot_algo::financials::{financial_indicators, AnnualSavings};
use depot_scenarios::{apply_scenario_and_recompute_costs, NamedScenario};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Comparison of every scenario in a run, in input order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    pub created_at: DateTime<Utc>,
    pub success: usize,
    pub failure: usize,
    pub records: Vec<ScenarioRecord>,
}

impl BatchSummary {
    pub fn record(&self, scenario: &str) -> Option<&ScenarioRecord> {
        self.records.iter().find(|r| r.scenario == scenario)
    }

    /// Solved scenario with the lowest total cost.
    pub fn cheapest(&self) -> Option<&ScenarioRecord> {
        self.records
            .iter()
            .filter_map(|r| r.total_cost.map(|cost| (r, cost)))
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(r, _)| r)
    }
}

/// Run every scenario sequentially. A failing scenario is recorded with
/// status `error` and does not stop the batch.
pub fn run_scenarios_batch(
    data: &PlanningData,
    scenarios: &[NamedScenario],
    config: &PipelineConfig,
) -> BatchSummary {
    let mut records: Vec<ScenarioRecord> = scenarios
        .iter()
        .map(|scenario| run_record(data, scenario, config))
        .collect();
    attach_indicators(&mut records, config);

    let success = records.iter().filter(|record| record.is_ok()).count();
    let failure = records.len() - success;
    info!(scenarios = records.len(), success, failure, "scenario batch finished");
    BatchSummary {
        created_at: Utc::now(),
        success,
        failure,
        records,
    }
}

fn run_record(data: &PlanningData, scenario: &NamedScenario, config: &PipelineConfig) -> ScenarioRecord {
    let matrix = apply_scenario_and_recompute_costs(
        &data.facilities,
        &data.demand_points,
        &scenario.config,
        config.tariff_per_km,
    );
    let mut record = ScenarioRecord::aggregates_only(
        &scenario.name,
        round_to(matrix.total_cost(), 2),
        round_to(matrix.total_demand(), 4),
    );

    let Some(fixed_costs) = data.fixed_costs.as_ref() else {
        return record;
    };
    match solve_on_matrix(data, scenario, config, matrix, fixed_costs) {
        Ok(outcome) => {
            record.fixed_cost = Some(outcome.solution.fixed_cost);
            record.variable_cost = Some(outcome.solution.variable_cost);
            record.total_cost = Some(outcome.solution.total_cost);
            record.margin = Some(outcome.financials.margin);
            record.open_facilities = outcome.solution.open_facilities;
        }
        Err(err) => {
            let message = format!("{err:#}");
            warn!(scenario = %scenario.name, error = %message, "scenario failed");
            record.status = RecordStatus::Error;
            record.error = Some(message);
        }
    }
    record
}

// Investment is the scenario's own fixed cost; yearly savings are measured
// against the baseline total.
fn attach_indicators(records: &mut [ScenarioRecord], config: &PipelineConfig) {
    let Some(baseline_total) = records
        .iter()
        .find(|r| config.policy.is_baseline(&r.scenario))
        .and_then(|r| r.total_cost)
    else {
        debug!(baseline = %config.policy.baseline_name, "no solved baseline, skipping indicators");
        return;
    };

    for record in records.iter_mut() {
        let (Some(fixed_cost), Some(total_cost)) = (record.fixed_cost, record.total_cost) else {
            continue;
        };
        let savings = AnnualSavings::Constant(baseline_total - total_cost);
        match financial_indicators(fixed_cost, &savings, config.horizon_years, config.discount_rate) {
            Ok(indicators) => record.indicators = Some(indicators),
            Err(err) => debug!(scenario = %record.scenario, %err, "indicators unavailable"),
        }
    }
}
