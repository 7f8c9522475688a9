//! Facility location (distribution-center site selection)
//!
//! Decides which sites to open and which open site serves each client,
//! minimizing fixed plus transportation cost under network constraints.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  SINGLE-ASSIGNMENT FACILITY LOCATION                             │
//! │                                                                  │
//! │  Given:   fixed cost per site, cost per (site, client) edge,     │
//! │           forced-open sites, candidate sites, optional caps      │
//! │  Decide:  open[f] ∈ {0,1},  assign[c][f] ∈ {0,1}                 │
//! │  Minimize Σ cost·assign + Σ fixed·open                           │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The model is always solved to a certified optimum. Any other backend
//! status, or an answer that does not reproduce its own objective, is
//! returned as a [`LocationError`].

mod problem;
mod solution;
mod solver;

pub use problem::LocationOptions;
pub use solution::SolutionResult;
pub use solver::{
    solve_facility_location, FacilityLocationSolver, LocationError, LocationSolverConfig,
};
