//! Exact MILP solving behind a backend-neutral interface.
//!
//! Callers assemble a [`MilpModel`] (columns, rows, minimization objective)
//! and hand it to any [`MilpBackend`]. The shipped backend lowers the model
//! onto `good_lp`; the pure-Rust `microlp` solver is always available and
//! HiGHS / CBC are enabled with the `solver-highs` / `solver-coin_cbc`
//! features. A time limit is passed to the solver itself and an exhausted
//! budget is reported as [`SolutionStatus::Timeout`].

mod backend;
mod model;

pub use backend::{GoodLpBackend, MilpBackend, MilpSolverKind};
pub use model::{Column, ColumnId, MilpModel, MilpOutcome, Row, RowSense, SolutionStatus};
