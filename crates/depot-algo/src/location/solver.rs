//! Facility-location MILP solver
//!
//! Builds the uncapacitated / capacitated single-assignment model from a
//! validated problem and dispatches it to an exact backend.

use super::problem::{LocationOptions, PreparedProblem};
use super::solution::SolutionResult;
use crate::cost_matrix::CostMatrix;
use crate::fixed_costs::FixedCostTable;
use crate::milp::{
    ColumnId, GoodLpBackend, MilpBackend, MilpModel, MilpOutcome, MilpSolverKind, RowSense,
    SolutionStatus,
};
use depot_core::{AppConfig, ClientId, DepotError, DepotResult, FacilityId};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};
use web_time::Instant;

/// A binary value is read as 1 above this threshold.
const BINARY_THRESHOLD: f64 = 0.5;
/// Relative tolerance for objective vs. recomputed cost agreement.
const COST_TOLERANCE: f64 = 1e-6;

/// Facility-location errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LocationError {
    #[error("fixed-cost table is empty")]
    EmptyFixedCostTable,
    #[error("facility {0} appears more than once in the fixed-cost table")]
    DuplicateFacility(FacilityId),
    #[error("forced-open facilities missing from fixed costs: {}", join_ids(.0))]
    UnknownForcedFacilities(Vec<FacilityId>),
    #[error("candidate facilities missing from fixed costs: {}", join_ids(.0))]
    UnknownCandidateFacilities(Vec<FacilityId>),
    #[error(
        "forced-open and candidate sets overlap in {} facilities ({}), more than max_new_facilities = {max_new}",
        .overlap.len(),
        join_ids(.overlap)
    )]
    ForcedCandidateConflict {
        overlap: Vec<FacilityId>,
        max_new: usize,
    },
    #[error("missing cost for facility_id={facility}, client_id={client}")]
    MissingCost {
        facility: FacilityId,
        client: ClientId,
    },
    #[error("no capacity given for facility {0}")]
    MissingCapacity(FacilityId),
    #[error("solver did not reach an optimal solution (status: {status}){}", message_suffix(.message))]
    SolverFailed {
        status: SolutionStatus,
        message: Option<String>,
    },
    #[error("inconsistent solution: {0}")]
    InconsistentSolution(String),
}

fn join_ids(ids: &[FacilityId]) -> String {
    ids.iter()
        .map(FacilityId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn message_suffix(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(": {m}"))
        .unwrap_or_default()
}

impl LocationError {
    /// True for errors detected before the backend was invoked.
    pub fn is_configuration(&self) -> bool {
        !matches!(
            self,
            LocationError::SolverFailed { .. } | LocationError::InconsistentSolution(_)
        )
    }
}

impl From<LocationError> for DepotError {
    fn from(err: LocationError) -> Self {
        if err.is_configuration() {
            DepotError::Config(err.to_string())
        } else {
            DepotError::Solver(err.to_string())
        }
    }
}

/// Solver configuration
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LocationSolverConfig {
    pub solver: MilpSolverKind,
    /// Wall-clock limit; expiry is reported as a solver failure
    pub time_limit: Option<Duration>,
}

impl LocationSolverConfig {
    pub fn from_app_config(config: &AppConfig) -> DepotResult<Self> {
        let solver = config
            .solver
            .parse::<MilpSolverKind>()
            .map_err(|err| DepotError::Config(err.to_string()))?;
        Ok(Self {
            solver,
            time_limit: config.time_limit_seconds.map(Duration::from_secs),
        })
    }
}

/// Exact facility-location solver over a pluggable MILP backend.
#[derive(Clone)]
pub struct FacilityLocationSolver {
    backend: Arc<dyn MilpBackend>,
}

impl Default for FacilityLocationSolver {
    fn default() -> Self {
        Self::from_config(&LocationSolverConfig::default())
    }
}

impl FacilityLocationSolver {
    pub fn new(backend: Arc<dyn MilpBackend>) -> Self {
        Self { backend }
    }

    pub fn from_config(config: &LocationSolverConfig) -> Self {
        let backend = GoodLpBackend::new(config.solver);
        match config.time_limit {
            Some(limit) => Self::new(Arc::new(backend.with_time_limit(limit))),
            None => Self::new(Arc::new(backend)),
        }
    }

    pub fn backend_id(&self) -> &str {
        self.backend.id()
    }

    /// Solve to global optimality or fail.
    ///
    /// # Example
    ///
    /// ```
    /// use depot_algo::cost_matrix::{CostEdge, CostMatrix};
    /// use depot_algo::fixed_costs::FixedCostTable;
    /// use depot_algo::location::{FacilityLocationSolver, LocationOptions};
    ///
    /// let matrix = CostMatrix::from_edges(vec![
    ///     CostEdge::with_cost("F1", "C1", 1.0),
    ///     CostEdge::with_cost("F2", "C1", 5.0),
    /// ]);
    /// let fixed = FixedCostTable::from_pairs([("F1", 1.0), ("F2", 10.0)]);
    /// let solution = FacilityLocationSolver::default()
    ///     .solve(&matrix, &fixed, &LocationOptions::new())?;
    /// assert_eq!(solution.open_facilities[0].as_str(), "F1");
    /// # Ok::<(), depot_algo::location::LocationError>(())
    /// ```
    pub fn solve(
        &self,
        matrix: &CostMatrix,
        fixed_costs: &FixedCostTable,
        options: &LocationOptions,
    ) -> Result<SolutionResult, LocationError> {
        let start = Instant::now();
        let problem = PreparedProblem::prepare(matrix, fixed_costs, options)?;
        let (model, columns) = build_model(&problem);

        let outcome = self.backend.solve(&model);
        if !outcome.status.is_success() {
            warn!(
                backend = self.backend.id(),
                status = %outcome.status,
                "facility location solve failed"
            );
            return Err(LocationError::SolverFailed {
                status: outcome.status,
                message: outcome.message,
            });
        }

        let mut result = extract_solution(&problem, &columns, &outcome)?;
        result.backend = self.backend.id().to_string();
        result.solve_time = start.elapsed();

        info!(
            open = result.num_open(),
            clients = result.allocation.len(),
            total_cost = result.total_cost,
            "facility location solved"
        );
        Ok(result)
    }
}

/// Solve with the default backend.
pub fn solve_facility_location(
    matrix: &CostMatrix,
    fixed_costs: &FixedCostTable,
    options: &LocationOptions,
) -> Result<SolutionResult, LocationError> {
    FacilityLocationSolver::default().solve(matrix, fixed_costs, options)
}

struct ModelColumns {
    open: Vec<ColumnId>,
    /// `assign[client][facility]`
    assign: Vec<Vec<ColumnId>>,
}

// minimize   Σ_c Σ_f cost[c][f]·assign[c][f] + Σ_f fixed[f]·open[f]
// s.t.       Σ_f assign[c][f] = 1                       ∀c
//            assign[c][f] - open[f] ≤ 0                  ∀c,f
//            open[f] = 1                                 ∀f forced
//            Σ_c demand[c]·assign[c][f] ≤ capacity[f]    ∀f (if capacitated)
//            Σ_{f∈candidates} open[f] ≤ max_new          (if capped)
//            Σ_f open[f] ≥ min_total                     (if floored)
fn build_model(problem: &PreparedProblem) -> (MilpModel, ModelColumns) {
    let mut model = MilpModel::new();

    let open: Vec<ColumnId> = problem
        .facilities
        .iter()
        .zip(&problem.fixed_costs)
        .map(|(facility, fixed)| model.add_binary(format!("open[{facility}]"), *fixed))
        .collect();

    let assign: Vec<Vec<ColumnId>> = problem
        .clients
        .iter()
        .zip(&problem.costs)
        .map(|(client, row)| {
            problem
                .facilities
                .iter()
                .zip(row)
                .map(|(facility, cost)| {
                    model.add_binary(format!("assign[{client}][{facility}]"), *cost)
                })
                .collect()
        })
        .collect();

    for row in &assign {
        model.add_row(row.iter().map(|&x| (x, 1.0)).collect(), RowSense::Equal, 1.0);
    }

    for row in &assign {
        for (&x, &y) in row.iter().zip(&open) {
            model.add_row(vec![(x, 1.0), (y, -1.0)], RowSense::LessEq, 0.0);
        }
    }

    for &f in &problem.forced {
        model.add_row(vec![(open[f], 1.0)], RowSense::Equal, 1.0);
    }

    if let Some(capacities) = &problem.capacities {
        for (f, capacity) in capacities.iter().enumerate() {
            let terms = assign
                .iter()
                .zip(&problem.demand)
                .map(|(row, demand)| (row[f], *demand))
                .collect();
            model.add_row(terms, RowSense::LessEq, *capacity);
        }
    }

    if let Some(max_new) = problem.max_new {
        if !problem.candidates.is_empty() {
            let terms = problem.candidates.iter().map(|&f| (open[f], 1.0)).collect();
            model.add_row(terms, RowSense::LessEq, max_new as f64);
        }
    }

    if let Some(min_total) = problem.min_total {
        let terms = open.iter().map(|&y| (y, 1.0)).collect();
        model.add_row(terms, RowSense::GreaterEq, min_total as f64);
    }

    (model, ModelColumns { open, assign })
}

fn extract_solution(
    problem: &PreparedProblem,
    columns: &ModelColumns,
    outcome: &MilpOutcome,
) -> Result<SolutionResult, LocationError> {
    let is_open: Vec<bool> = columns
        .open
        .iter()
        .map(|&y| outcome.value(y) > BINARY_THRESHOLD)
        .collect();

    let open_facilities: Vec<FacilityId> = problem
        .facilities
        .iter()
        .zip(&is_open)
        .filter(|(_, open)| **open)
        .map(|(f, _)| f.clone())
        .collect();

    let mut allocation = BTreeMap::new();
    let mut demand = BTreeMap::new();
    let mut variable_cost = 0.0;
    for (c, client) in problem.clients.iter().enumerate() {
        let chosen: Vec<usize> = columns.assign[c]
            .iter()
            .enumerate()
            .filter(|&(_, &x)| outcome.value(x) > BINARY_THRESHOLD)
            .map(|(f, _)| f)
            .collect();
        let f = match chosen.as_slice() {
            [f] => *f,
            _ => {
                return Err(LocationError::InconsistentSolution(format!(
                    "client {client} assigned to {} facilities",
                    chosen.len()
                )))
            }
        };
        if !is_open[f] {
            return Err(LocationError::InconsistentSolution(format!(
                "client {client} assigned to closed facility {}",
                problem.facilities[f]
            )));
        }
        variable_cost += problem.costs[c][f];
        allocation.insert(client.clone(), problem.facilities[f].clone());
        demand.insert(client.clone(), problem.demand[c]);
    }

    let fixed_cost: f64 = problem
        .fixed_costs
        .iter()
        .zip(&is_open)
        .filter(|(_, open)| **open)
        .map(|(cost, _)| *cost)
        .sum();

    let total_cost = outcome.objective;
    let gap = (fixed_cost + variable_cost - total_cost).abs();
    if gap > COST_TOLERANCE * total_cost.abs().max(1.0) {
        return Err(LocationError::InconsistentSolution(format!(
            "objective {total_cost} differs from fixed {fixed_cost} + variable {variable_cost}"
        )));
    }

    Ok(SolutionResult {
        open_facilities,
        allocation,
        demand,
        fixed_cost,
        variable_cost,
        total_cost,
        backend: String::new(),
        solve_time: Duration::ZERO,
    })
}
