//! # depot-algo: Site Selection Algorithms
//!
//! - [`cost_matrix`] - Site × client transportation costs
//! - [`fixed_costs`] - Explicit or regionally estimated fixed costs
//! - [`milp`] - Backend-neutral exact MILP solving
//! - [`location`] - Facility-location model and solver
//! - [`financials`] - Operating summary, NPV, payback, ROI

pub mod cost_matrix;
pub mod financials;
pub mod fixed_costs;
pub mod location;
pub mod milp;

pub use cost_matrix::{round_to, CostEdge, CostFactors, CostMatrix, CostMatrixBuilder, CostTable};
pub use financials::{
    compute_financials, financial_indicators, AnnualSavings, FinancialError, FinancialIndicators,
    FinancialSummary,
};
pub use fixed_costs::{
    estimate_fixed_costs, CostEstimationConfig, FixedCostBreakdown, FixedCostError,
    FixedCostTable, RegionalCostParams,
};
pub use location::{
    solve_facility_location, FacilityLocationSolver, LocationError, LocationOptions,
    LocationSolverConfig, SolutionResult,
};
pub use milp::{MilpBackend, MilpSolverKind, SolutionStatus};
