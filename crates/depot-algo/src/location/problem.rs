//! Solver options and input validation.

use super::LocationError;
use crate::cost_matrix::CostMatrix;
use crate::fixed_costs::FixedCostTable;
use depot_core::{ClientId, Facility, FacilityId, DEFAULT_DEMAND};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::debug;

/// Network constraints for one facility-location solve.
///
/// All fields are optional; the default options describe an unconstrained
/// uncapacitated problem over every facility in the fixed-cost table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationOptions {
    /// Cap on openings among the candidate set (forced sites not counted)
    pub max_new_facilities: Option<usize>,
    /// Sites that must be open in every solution
    pub forced_open_facilities: Vec<FacilityId>,
    /// Sites eligible for a new opening; defaults to all non-forced sites
    pub candidate_facilities: Option<Vec<FacilityId>>,
    /// Floor on the total number of open sites
    pub min_total_open_facilities: Option<usize>,
    /// Throughput cap per site, in demand units
    pub capacity_by_facility: Option<HashMap<FacilityId, f64>>,
    /// Demand override per client
    pub demand_by_client: Option<HashMap<ClientId, f64>>,
}

impl LocationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_new_facilities(mut self, max_new: usize) -> Self {
        self.max_new_facilities = Some(max_new);
        self
    }

    pub fn with_forced_open<I, T>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<FacilityId>,
    {
        self.forced_open_facilities = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_candidates<I, T>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<FacilityId>,
    {
        self.candidate_facilities = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_min_total_open(mut self, min_total: usize) -> Self {
        self.min_total_open_facilities = Some(min_total);
        self
    }

    pub fn with_capacities(mut self, capacities: HashMap<FacilityId, f64>) -> Self {
        self.capacity_by_facility = Some(capacities);
        self
    }

    /// Capacities taken from the facilities' own `capacity` field. Left unset
    /// when no facility carries one; a partial column fails at solve time
    /// with [`LocationError::MissingCapacity`].
    pub fn with_facility_capacities(mut self, facilities: &[Facility]) -> Self {
        let capacities: HashMap<FacilityId, f64> = facilities
            .iter()
            .filter_map(|f| f.capacity.map(|cap| (f.id.clone(), cap)))
            .collect();
        if !capacities.is_empty() {
            self.capacity_by_facility = Some(capacities);
        }
        self
    }

    pub fn with_demand(mut self, demand: HashMap<ClientId, f64>) -> Self {
        self.demand_by_client = Some(demand);
        self
    }
}

/// Validated, index-based view of one solve.
#[derive(Debug, Clone)]
pub(crate) struct PreparedProblem {
    pub facilities: Vec<FacilityId>,
    pub fixed_costs: Vec<f64>,
    pub clients: Vec<ClientId>,
    pub demand: Vec<f64>,
    /// `costs[client][facility]`
    pub costs: Vec<Vec<f64>>,
    pub forced: Vec<usize>,
    pub candidates: Vec<usize>,
    pub capacities: Option<Vec<f64>>,
    pub max_new: Option<usize>,
    pub min_total: Option<usize>,
}

impl PreparedProblem {
    pub(crate) fn prepare(
        matrix: &CostMatrix,
        fixed_costs: &FixedCostTable,
        options: &LocationOptions,
    ) -> Result<Self, LocationError> {
        if fixed_costs.is_empty() {
            return Err(LocationError::EmptyFixedCostTable);
        }

        let mut facilities = Vec::with_capacity(fixed_costs.len());
        let mut fixed = Vec::with_capacity(fixed_costs.len());
        let mut index: HashMap<&FacilityId, usize> = HashMap::new();
        for (id, cost) in fixed_costs.iter() {
            if index.insert(id, facilities.len()).is_some() {
                return Err(LocationError::DuplicateFacility(id.clone()));
            }
            facilities.push(id.clone());
            fixed.push(cost);
        }

        let forced_set: BTreeSet<&FacilityId> = options.forced_open_facilities.iter().collect();

        // Forced status wins over candidacy, unless the overlap alone would
        // already exceed the new-site cap.
        let candidate_ids: Vec<&FacilityId> = match &options.candidate_facilities {
            Some(given) => {
                let overlap: BTreeSet<&FacilityId> =
                    given.iter().filter(|id| forced_set.contains(id)).collect();
                if let Some(max_new) = options.max_new_facilities {
                    if overlap.len() > max_new {
                        return Err(LocationError::ForcedCandidateConflict {
                            overlap: overlap.into_iter().cloned().collect(),
                            max_new,
                        });
                    }
                }
                given.iter().filter(|id| !forced_set.contains(id)).collect()
            }
            None => facilities
                .iter()
                .filter(|id| !forced_set.contains(id))
                .collect(),
        };

        let unknown_forced: Vec<FacilityId> = forced_set
            .iter()
            .filter(|id| !index.contains_key(*id))
            .map(|id| (*id).clone())
            .collect();
        if !unknown_forced.is_empty() {
            return Err(LocationError::UnknownForcedFacilities(unknown_forced));
        }

        let unknown_candidates: Vec<FacilityId> = candidate_ids
            .iter()
            .filter(|id| !index.contains_key(*id))
            .map(|id| (*id).clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if !unknown_candidates.is_empty() {
            return Err(LocationError::UnknownCandidateFacilities(unknown_candidates));
        }

        let forced: Vec<usize> = forced_set.iter().map(|id| index[*id]).collect();
        let mut seen = HashSet::new();
        let candidates: Vec<usize> = candidate_ids
            .iter()
            .map(|id| index[*id])
            .filter(|j| seen.insert(*j))
            .collect();

        let clients = matrix.client_ids();
        let inferred = matrix.demand_by_client();
        let demand: Vec<f64> = clients
            .iter()
            .map(|client| {
                options
                    .demand_by_client
                    .as_ref()
                    .and_then(|overrides| overrides.get(client))
                    .or_else(|| inferred.get(client))
                    .copied()
                    .unwrap_or(DEFAULT_DEMAND)
            })
            .collect();

        let lookup = matrix.cost_index();
        let mut costs = Vec::with_capacity(clients.len());
        for client in &clients {
            let mut row = Vec::with_capacity(facilities.len());
            for facility in &facilities {
                let cost = lookup.get(&(facility, client)).copied().ok_or_else(|| {
                    LocationError::MissingCost {
                        facility: facility.clone(),
                        client: client.clone(),
                    }
                })?;
                row.push(cost);
            }
            costs.push(row);
        }

        let capacities = match &options.capacity_by_facility {
            Some(by_facility) => Some(
                facilities
                    .iter()
                    .map(|f| {
                        by_facility
                            .get(f)
                            .copied()
                            .ok_or_else(|| LocationError::MissingCapacity(f.clone()))
                    })
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            None => None,
        };

        debug!(
            facilities = facilities.len(),
            clients = clients.len(),
            forced = forced.len(),
            candidates = candidates.len(),
            "location problem validated"
        );

        Ok(Self {
            facilities,
            fixed_costs: fixed,
            clients,
            demand,
            costs,
            forced,
            candidates,
            capacities,
            max_new: options.max_new_facilities,
            min_total: options.min_total_open_facilities,
        })
    }
}
