//! Fixed operating cost per site.
//!
//! Costs come either from an explicit table or from regional proxies:
//!
//! ```text
//! labor        = labor_cost_index · clamp(occupancy, 0.1, 1.0) · 250 000
//! real_estate  = real_estate_cost_m2 · floor_area_m2
//! utilities    = (labor + real_estate) · utilities_share
//! overhead     = (labor + real_estate) · overhead_share
//! inbound      = inbound_base · transport_factor
//! fixed_cost   = (labor + real_estate + utilities + overhead + inbound) · (1 + tax_factor)
//! ```

use crate::cost_matrix::round_to;
use depot_core::{DepotError, Facility, FacilityId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::info;

/// Labor cost of a site running at full occupancy with index 1.0.
pub const LABOR_COST_BASE: f64 = 250_000.0;
/// Occupancy assumed when a site reports none.
pub const DEFAULT_OCCUPANCY: f64 = 0.75;
pub const MIN_OCCUPANCY: f64 = 0.1;
pub const MAX_OCCUPANCY: f64 = 1.0;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FixedCostError {
    #[error("facility {0} has no region code for cost estimation")]
    MissingRegion(FacilityId),
    #[error("no regional cost parameters for region {region} (facility {facility})")]
    UnknownRegion { facility: FacilityId, region: String },
    #[error("region {0} appears more than once in the regional cost table")]
    DuplicateRegion(String),
    #[error("facility {0} has no fixed cost")]
    MissingFixedCost(FacilityId),
}

impl From<FixedCostError> for DepotError {
    fn from(err: FixedCostError) -> Self {
        DepotError::Config(err.to_string())
    }
}

/// Fixed cost per facility, in table order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FixedCostTable {
    entries: Vec<(FacilityId, f64)>,
}

impl FixedCostTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, F>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (F, f64)>,
        F: Into<FacilityId>,
    {
        Self {
            entries: pairs.into_iter().map(|(id, cost)| (id.into(), cost)).collect(),
        }
    }

    /// Table from the explicit `fixed_cost` of each facility.
    pub fn from_facilities(facilities: &[Facility]) -> Result<Self, FixedCostError> {
        facilities
            .iter()
            .map(|f| {
                f.fixed_cost
                    .map(|cost| (f.id.clone(), cost))
                    .ok_or_else(|| FixedCostError::MissingFixedCost(f.id.clone()))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(|entries| Self { entries })
    }

    pub fn from_breakdowns(breakdowns: &[FixedCostBreakdown]) -> Self {
        Self {
            entries: breakdowns
                .iter()
                .map(|b| (b.facility_id.clone(), b.fixed_cost))
                .collect(),
        }
    }

    pub fn insert(&mut self, facility: impl Into<FacilityId>, cost: f64) {
        self.entries.push((facility.into(), cost));
    }

    pub fn get(&self, facility: &FacilityId) -> Option<f64> {
        self.entries
            .iter()
            .find(|(id, _)| id == facility)
            .map(|(_, cost)| *cost)
    }

    pub fn facility_ids(&self) -> Vec<FacilityId> {
        self.entries.iter().map(|(id, _)| id.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FacilityId, f64)> {
        self.entries.iter().map(|(id, cost)| (id, *cost))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keep only the listed facilities, preserving table order.
    pub fn restricted_to(&self, keep: &[FacilityId]) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .filter(|(id, _)| keep.contains(id))
                .cloned()
                .collect(),
        }
    }
}

/// Regional cost proxies for one region code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionalCostParams {
    pub region: String,
    pub labor_cost_index: f64,
    pub real_estate_cost_m2: f64,
    pub tax_factor: f64,
    pub transport_factor: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostEstimationConfig {
    /// Floor area assumed when a facility reports none
    #[serde(default = "default_floor_area_m2")]
    pub default_floor_area_m2: f64,
    #[serde(default = "default_utilities_share")]
    pub utilities_share: f64,
    #[serde(default = "default_overhead_share")]
    pub overhead_share: f64,
    #[serde(default = "default_inbound_base")]
    pub inbound_base: f64,
}

fn default_floor_area_m2() -> f64 {
    4_000.0
}

fn default_utilities_share() -> f64 {
    0.12
}

fn default_overhead_share() -> f64 {
    0.08
}

fn default_inbound_base() -> f64 {
    80_000.0
}

impl Default for CostEstimationConfig {
    fn default() -> Self {
        Self {
            default_floor_area_m2: default_floor_area_m2(),
            utilities_share: default_utilities_share(),
            overhead_share: default_overhead_share(),
            inbound_base: default_inbound_base(),
        }
    }
}

/// Estimated cost components of one facility (cents-rounded).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedCostBreakdown {
    pub facility_id: FacilityId,
    pub labor_cost: f64,
    pub real_estate_cost: f64,
    pub utilities_cost: f64,
    pub overhead_cost: f64,
    pub inbound_cost: f64,
    pub tax_factor: f64,
    pub fixed_cost: f64,
}

/// Estimate a fixed cost for every facility from its region's proxies.
pub fn estimate_fixed_costs(
    facilities: &[Facility],
    regional: &[RegionalCostParams],
    config: &CostEstimationConfig,
) -> Result<Vec<FixedCostBreakdown>, FixedCostError> {
    let mut by_region: HashMap<&str, &RegionalCostParams> = HashMap::new();
    for params in regional {
        if by_region.insert(params.region.as_str(), params).is_some() {
            return Err(FixedCostError::DuplicateRegion(params.region.clone()));
        }
    }

    let breakdowns = facilities
        .iter()
        .map(|facility| {
            let region = facility
                .region
                .as_deref()
                .ok_or_else(|| FixedCostError::MissingRegion(facility.id.clone()))?;
            let params = by_region
                .get(region)
                .ok_or_else(|| FixedCostError::UnknownRegion {
                    facility: facility.id.clone(),
                    region: region.to_string(),
                })?;
            Ok(estimate_one(facility, params, config))
        })
        .collect::<Result<Vec<_>, FixedCostError>>()?;

    info!(facilities = breakdowns.len(), "fixed costs estimated from regional proxies");
    Ok(breakdowns)
}

fn estimate_one(
    facility: &Facility,
    params: &RegionalCostParams,
    config: &CostEstimationConfig,
) -> FixedCostBreakdown {
    let area = facility
        .floor_area_m2
        .filter(|a| a.is_finite())
        .unwrap_or(config.default_floor_area_m2);
    let occupancy = facility
        .occupancy
        .filter(|o| o.is_finite())
        .unwrap_or(DEFAULT_OCCUPANCY)
        .clamp(MIN_OCCUPANCY, MAX_OCCUPANCY);

    let labor = params.labor_cost_index * occupancy * LABOR_COST_BASE;
    let real_estate = params.real_estate_cost_m2 * area;
    let utilities = (labor + real_estate) * config.utilities_share;
    let overhead = (labor + real_estate) * config.overhead_share;
    let inbound = config.inbound_base * params.transport_factor;
    let operational = labor + real_estate + utilities + overhead + inbound;

    FixedCostBreakdown {
        facility_id: facility.id.clone(),
        labor_cost: round_to(labor, 2),
        real_estate_cost: round_to(real_estate, 2),
        utilities_cost: round_to(utilities, 2),
        overhead_cost: round_to(overhead, 2),
        inbound_cost: round_to(inbound, 2),
        tax_factor: round_to(params.tax_factor, 4),
        fixed_cost: round_to(operational * (1.0 + params.tax_factor), 2),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sp() -> RegionalCostParams {
        RegionalCostParams {
            region: "SP".into(),
            labor_cost_index: 1.0,
            real_estate_cost_m2: 10.0,
            tax_factor: 0.1,
            transport_factor: 1.0,
        }
    }

    #[test]
    fn occupancy_below_floor_is_clamped() {
        let facility = Facility::new("F1").with_region("SP").with_occupancy(0.05);
        let out = estimate_fixed_costs(&[facility], &[sp()], &CostEstimationConfig::default())
            .unwrap();
        assert!((out[0].labor_cost - 0.1 * LABOR_COST_BASE).abs() < 1e-6);
    }

    #[test]
    fn components_add_up_with_defaults() {
        let facility = Facility::new("F1").with_region("SP");
        let out = estimate_fixed_costs(&[facility], &[sp()], &CostEstimationConfig::default())
            .unwrap();
        let b = &out[0];
        // labor 187 500, real estate 40 000, utilities 27 300, overhead 18 200, inbound 80 000
        assert_eq!(b.labor_cost, 187_500.0);
        assert_eq!(b.real_estate_cost, 40_000.0);
        assert_eq!(b.utilities_cost, 27_300.0);
        assert_eq!(b.overhead_cost, 18_200.0);
        assert_eq!(b.inbound_cost, 80_000.0);
        assert!((b.fixed_cost - 353_000.0 * 1.1).abs() < 0.01);
    }

    #[test]
    fn unknown_region_is_an_error() {
        let facility = Facility::new("F1").with_region("RJ");
        let err = estimate_fixed_costs(&[facility], &[sp()], &CostEstimationConfig::default())
            .unwrap_err();
        assert!(matches!(err, FixedCostError::UnknownRegion { .. }));
        let as_depot: DepotError = err.into();
        assert!(matches!(as_depot, DepotError::Config(_)));
    }

    #[test]
    fn duplicate_region_is_rejected() {
        let err = estimate_fixed_costs(&[], &[sp(), sp()], &CostEstimationConfig::default())
            .unwrap_err();
        assert_eq!(err, FixedCostError::DuplicateRegion("SP".into()));
    }

    #[test]
    fn table_from_facilities_requires_costs() {
        let ok = FixedCostTable::from_facilities(&[Facility::new("A").with_fixed_cost(5.0)]).unwrap();
        assert_eq!(ok.get(&FacilityId::new("A")), Some(5.0));

        let err = FixedCostTable::from_facilities(&[Facility::new("B")]).unwrap_err();
        assert_eq!(err, FixedCostError::MissingFixedCost(FacilityId::new("B")));
    }

    #[test]
    fn table_preserves_order() {
        let table = FixedCostTable::from_pairs([("B", 2.0), ("A", 1.0)]);
        assert_eq!(
            table.facility_ids(),
            vec![FacilityId::new("B"), FacilityId::new("A")]
        );
        let restricted = table.restricted_to(&[FacilityId::new("A")]);
        assert_eq!(restricted.len(), 1);
    }
}
