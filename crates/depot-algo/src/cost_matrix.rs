//! Transportation cost matrix between sites and demand points.
//!
//! For every (site, demand point) pair the builder computes the great-circle
//! distance and the freight cost
//!
//! ```text
//! cost = demand · distance_km · tariff_per_km · (1 + tax_factor) · wage_factor
//! ```
//!
//! rounded to cents, with the distance rounded to meters. Pairs where either
//! endpoint has no coordinates are kept as undefined edges; the location
//! solver rejects them later if the pair is required.

use depot_core::{ClientId, DemandPoint, DepotError, DepotResult, Facility, FacilityId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{debug, info};

/// Scenario multipliers applied on top of the distance-based freight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostFactors {
    /// Additional tax share (0.15 = +15 %)
    pub tax_factor: f64,
    /// Logistics wage multiplier
    pub wage_factor: f64,
}

impl Default for CostFactors {
    fn default() -> Self {
        Self {
            tax_factor: 0.0,
            wage_factor: 1.0,
        }
    }
}

impl CostFactors {
    pub fn new(tax_factor: f64, wage_factor: f64) -> Self {
        Self {
            tax_factor,
            wage_factor,
        }
    }

    /// Combined multiplier `(1 + tax) · wage`.
    pub fn multiplier(&self) -> f64 {
        (1.0 + self.tax_factor) * self.wage_factor
    }
}

/// One (facility, client) entry of the matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostEdge {
    pub facility_id: FacilityId,
    pub client_id: ClientId,
    /// Demand quantity the cost was computed with
    pub demand: f64,
    pub distance_km: Option<f64>,
    pub cost: Option<f64>,
    pub tax_factor: f64,
    pub wage_factor: f64,
}

impl CostEdge {
    /// Edge with a known cost and unit demand, for matrices assembled by hand.
    pub fn with_cost(
        facility_id: impl Into<FacilityId>,
        client_id: impl Into<ClientId>,
        cost: f64,
    ) -> Self {
        let factors = CostFactors::default();
        Self {
            facility_id: facility_id.into(),
            client_id: client_id.into(),
            demand: depot_core::DEFAULT_DEMAND,
            distance_km: None,
            cost: Some(cost),
            tax_factor: factors.tax_factor,
            wage_factor: factors.wage_factor,
        }
    }

    pub fn with_demand(mut self, demand: f64) -> Self {
        self.demand = demand;
        self
    }

    pub fn is_defined(&self) -> bool {
        self.cost.is_some()
    }
}

/// Dense set of cost edges in site-major order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostMatrix {
    edges: Vec<CostEdge>,
}

impl CostMatrix {
    pub fn from_edges(edges: Vec<CostEdge>) -> Self {
        Self { edges }
    }

    pub fn edges(&self) -> &[CostEdge] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Defined cost of a single pair. Linear scan; use [`CostMatrix::cost_index`]
    /// for repeated lookups.
    pub fn cost(&self, facility: &FacilityId, client: &ClientId) -> Option<f64> {
        self.edges
            .iter()
            .find(|e| &e.facility_id == facility && &e.client_id == client)
            .and_then(|e| e.cost)
    }

    /// Lookup table of all defined costs. When a pair appears more than once
    /// the last defined value wins.
    pub fn cost_index(&self) -> HashMap<(&FacilityId, &ClientId), f64> {
        self.edges
            .iter()
            .filter_map(|e| e.cost.map(|cost| ((&e.facility_id, &e.client_id), cost)))
            .collect()
    }

    /// Distinct client ids in sorted order.
    pub fn client_ids(&self) -> Vec<ClientId> {
        self.edges
            .iter()
            .map(|e| e.client_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Distinct facility ids in first-seen order.
    pub fn facility_ids(&self) -> Vec<FacilityId> {
        let mut seen = HashSet::new();
        self.edges
            .iter()
            .filter(|e| seen.insert(&e.facility_id))
            .map(|e| e.facility_id.clone())
            .collect()
    }

    /// Demand per client, taken from the first edge that mentions it.
    pub fn demand_by_client(&self) -> HashMap<ClientId, f64> {
        let mut demand = HashMap::new();
        for edge in &self.edges {
            demand
                .entry(edge.client_id.clone())
                .or_insert(edge.demand);
        }
        demand
    }

    /// Pairs whose cost is undefined (missing coordinates).
    pub fn missing_pairs(&self) -> Vec<(FacilityId, ClientId)> {
        self.edges
            .iter()
            .filter(|e| !e.is_defined())
            .map(|e| (e.facility_id.clone(), e.client_id.clone()))
            .collect()
    }

    /// Fail if any edge is undefined.
    pub fn ensure_complete(&self) -> DepotResult<()> {
        let missing = self.missing_pairs();
        if missing.is_empty() {
            return Ok(());
        }
        let listed: Vec<String> = missing
            .iter()
            .take(10)
            .map(|(f, c)| format!("({f}, {c})"))
            .collect();
        Err(DepotError::Validation(format!(
            "{} cost edge(s) undefined because of missing coordinates: {}{}",
            missing.len(),
            listed.join(", "),
            if missing.len() > listed.len() { ", ..." } else { "" }
        )))
    }

    /// Sum of all defined edge costs.
    pub fn total_cost(&self) -> f64 {
        self.edges.iter().filter_map(|e| e.cost).sum()
    }

    /// Sum of the demand column over every edge (each client counted once
    /// per site).
    pub fn total_demand(&self) -> f64 {
        self.edges.iter().map(|e| e.demand).sum()
    }

    /// Client-by-facility view of the costs.
    pub fn pivot(&self) -> CostTable {
        let clients = self.client_ids();
        let facilities = self.facility_ids();
        let client_pos: HashMap<&ClientId, usize> =
            clients.iter().enumerate().map(|(i, c)| (c, i)).collect();
        let facility_pos: HashMap<&FacilityId, usize> =
            facilities.iter().enumerate().map(|(j, f)| (f, j)).collect();

        let mut values = vec![vec![None; facilities.len()]; clients.len()];
        for edge in &self.edges {
            let i = client_pos[&edge.client_id];
            let j = facility_pos[&edge.facility_id];
            values[i][j] = edge.cost;
        }
        CostTable {
            clients,
            facilities,
            values,
        }
    }
}

/// Client-by-facility cost table (rows = clients, columns = facilities).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostTable {
    pub clients: Vec<ClientId>,
    pub facilities: Vec<FacilityId>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CostTable {
    pub fn get(&self, client: &ClientId, facility: &FacilityId) -> Option<f64> {
        let i = self.clients.iter().position(|c| c == client)?;
        let j = self.facilities.iter().position(|f| f == facility)?;
        self.values[i][j]
    }
}

/// Freight cost of serving `demand` over `distance_km`.
pub fn freight_cost(demand: f64, distance_km: f64, tariff_per_km: f64, factors: CostFactors) -> f64 {
    demand * distance_km * tariff_per_km * factors.multiplier()
}

/// Round to `decimals` places using the exact binary value of `value`, with
/// exact ties going to the even digit (`0.125` becomes `0.12`, `2.675` becomes
/// `2.67` because it is stored just below the tie).
pub fn round_to(value: f64, decimals: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{value:.prec$}", prec = decimals as usize)
        .parse()
        .unwrap_or(value)
}

/// Builds the dense site × demand-point cost matrix.
#[derive(Debug, Clone)]
pub struct CostMatrixBuilder {
    tariff_per_km: f64,
    factors: CostFactors,
}

impl Default for CostMatrixBuilder {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TARIFF_PER_KM)
    }
}

impl CostMatrixBuilder {
    pub const DEFAULT_TARIFF_PER_KM: f64 = 1.2;

    pub fn new(tariff_per_km: f64) -> Self {
        Self {
            tariff_per_km,
            factors: CostFactors::default(),
        }
    }

    pub fn with_factors(mut self, factors: CostFactors) -> Self {
        self.factors = factors;
        self
    }

    pub fn with_tax_factor(mut self, tax_factor: f64) -> Self {
        self.factors.tax_factor = tax_factor;
        self
    }

    pub fn with_wage_factor(mut self, wage_factor: f64) -> Self {
        self.factors.wage_factor = wage_factor;
        self
    }

    pub fn tariff_per_km(&self) -> f64 {
        self.tariff_per_km
    }

    pub fn factors(&self) -> CostFactors {
        self.factors
    }

    pub fn build(&self, sites: &[Facility], demand_points: &[DemandPoint]) -> CostMatrix {
        let mut edges = Vec::with_capacity(sites.len() * demand_points.len());
        let mut undefined = 0usize;

        for site in sites {
            for point in demand_points {
                let distance = match (&site.location, &point.location) {
                    (Some(a), Some(b)) => Some(a.distance_km(b)),
                    _ => None,
                };
                let (distance_km, cost) = match distance {
                    Some(km) => (
                        Some(round_to(km, 3)),
                        Some(round_to(
                            freight_cost(point.demand, km, self.tariff_per_km, self.factors),
                            2,
                        )),
                    ),
                    None => {
                        undefined += 1;
                        (None, None)
                    }
                };
                edges.push(CostEdge {
                    facility_id: site.id.clone(),
                    client_id: point.id.clone(),
                    demand: point.demand,
                    distance_km,
                    cost,
                    tax_factor: self.factors.tax_factor,
                    wage_factor: self.factors.wage_factor,
                });
            }
        }

        if undefined > 0 {
            debug!(undefined, "cost edges left undefined for missing coordinates");
        }
        info!(edges = edges.len(), "cost matrix built");
        CostMatrix { edges }
    }
}
