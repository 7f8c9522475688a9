//! Facility-location solution data structures

use depot_core::{ClientId, FacilityId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Optimal open/assign decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionResult {
    /// Open sites, in fixed-cost table order
    pub open_facilities: Vec<FacilityId>,
    /// Serving site of every client
    pub allocation: BTreeMap<ClientId, FacilityId>,
    /// Demand the model used for each client
    #[serde(default)]
    pub demand: BTreeMap<ClientId, f64>,
    /// Σ fixed cost over open sites
    pub fixed_cost: f64,
    /// Σ edge cost over the allocation
    pub variable_cost: f64,
    /// Objective value reported by the backend
    pub total_cost: f64,
    /// Backend that produced the answer
    pub backend: String,
    pub solve_time: Duration,
}

impl SolutionResult {
    pub fn num_open(&self) -> usize {
        self.open_facilities.len()
    }

    pub fn is_open(&self, facility: &FacilityId) -> bool {
        self.open_facilities.contains(facility)
    }

    /// Clients served by `facility`, sorted.
    pub fn clients_served_by(&self, facility: &FacilityId) -> Vec<ClientId> {
        self.allocation
            .iter()
            .filter(|(_, f)| *f == facility)
            .map(|(c, _)| c.clone())
            .collect()
    }

    /// Demand served by each open site.
    pub fn facility_loads(&self) -> BTreeMap<FacilityId, f64> {
        let mut loads: BTreeMap<FacilityId, f64> = self
            .open_facilities
            .iter()
            .map(|f| (f.clone(), 0.0))
            .collect();
        for (client, facility) in &self.allocation {
            let served = self.demand.get(client).copied().unwrap_or(0.0);
            *loads.entry(facility.clone()).or_insert(0.0) += served;
        }
        loads
    }

    /// Number of clients assigned to each open site.
    pub fn client_counts(&self) -> BTreeMap<FacilityId, usize> {
        let mut counts: BTreeMap<FacilityId, usize> = self
            .open_facilities
            .iter()
            .map(|f| (f.clone(), 0))
            .collect();
        for facility in self.allocation.values() {
            *counts.entry(facility.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Human-readable summary
    pub fn summary(&self) -> String {
        let mut s = String::new();
        s.push_str(&format!(
            "Facility location solution ({} open, {} clients, backend {})\n",
            self.num_open(),
            self.allocation.len(),
            self.backend
        ));
        s.push_str(&format!("  Fixed cost:    {:>14.2}\n", self.fixed_cost));
        s.push_str(&format!("  Variable cost: {:>14.2}\n", self.variable_cost));
        s.push_str(&format!("  Total cost:    {:>14.2}\n", self.total_cost));
        s.push_str(&format!("  Solve time:    {:.3}s\n", self.solve_time.as_secs_f64()));
        let loads = self.facility_loads();
        for (facility, clients) in self.client_counts() {
            let served = loads.get(&facility).copied().unwrap_or(0.0);
            s.push_str(&format!("  {facility}: {clients} client(s), demand {served:.2}\n"));
        }
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SolutionResult {
        let mut allocation = BTreeMap::new();
        allocation.insert(ClientId::new("C1"), FacilityId::new("F1"));
        allocation.insert(ClientId::new("C2"), FacilityId::new("F1"));
        let mut demand = BTreeMap::new();
        demand.insert(ClientId::new("C1"), 2.5);
        demand.insert(ClientId::new("C2"), 4.0);
        SolutionResult {
            open_facilities: vec![FacilityId::new("F1"), FacilityId::new("F2")],
            allocation,
            demand,
            fixed_cost: 11.0,
            variable_cost: 6.0,
            total_cost: 17.0,
            backend: "microlp".into(),
            solve_time: Duration::from_millis(3),
        }
    }

    #[test]
    fn loads_sum_served_demand() {
        let loads = sample().facility_loads();
        assert_eq!(loads[&FacilityId::new("F1")], 6.5);
        assert_eq!(loads[&FacilityId::new("F2")], 0.0);
    }

    #[test]
    fn counts_include_idle_open_sites() {
        let counts = sample().client_counts();
        assert_eq!(counts[&FacilityId::new("F1")], 2);
        assert_eq!(counts[&FacilityId::new("F2")], 0);
    }

    #[test]
    fn clients_by_facility() {
        let s = sample();
        assert_eq!(s.clients_served_by(&FacilityId::new("F1")).len(), 2);
        assert!(s.is_open(&FacilityId::new("F2")));
        assert!(s.summary().contains("Total cost"));
    }
}
