use depot_algo::financials::FinancialIndicators;
use depot_core::FacilityId;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Ok,
    Error,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Ok => "ok",
            RecordStatus::Error => "error",
        }
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the scenario comparison.
///
/// Matrix aggregates are always present; solution fields are `None` when no
/// fixed costs were supplied or the solve failed (see `error`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioRecord {
    pub scenario: String,
    pub status: RecordStatus,
    pub error: Option<String>,
    pub total_freight_cost: f64,
    pub total_demand: f64,
    #[serde(default)]
    pub open_facilities: Vec<FacilityId>,
    pub fixed_cost: Option<f64>,
    pub variable_cost: Option<f64>,
    pub total_cost: Option<f64>,
    pub margin: Option<f64>,
    /// Versus the baseline scenario
    pub indicators: Option<FinancialIndicators>,
}

impl ScenarioRecord {
    pub(crate) fn aggregates_only(scenario: &str, total_freight_cost: f64, total_demand: f64) -> Self {
        Self {
            scenario: scenario.to_string(),
            status: RecordStatus::Ok,
            error: None,
            total_freight_cost,
            total_demand,
            open_facilities: Vec::new(),
            fixed_cost: None,
            variable_cost: None,
            total_cost: None,
            margin: None,
            indicators: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == RecordStatus::Ok
    }

    pub fn is_solved(&self) -> bool {
        self.total_cost.is_some()
    }
}
