//! `good_lp` adapter and backend selection.

use super::model::{MilpModel, MilpOutcome, RowSense, SolutionStatus};
use anyhow::anyhow;
#[cfg(feature = "solver-coin_cbc")]
use good_lp::solvers::coin_cbc::coin_cbc as coin_cbc_solver;
#[cfg(feature = "solver-highs")]
use good_lp::solvers::highs::highs as highs_solver;
use good_lp::solvers::microlp::microlp as microlp_solver;
#[cfg(feature = "solver-highs")]
use good_lp::WithMipGap;
use good_lp::{
    constraint, variable, variables, Constraint, Expression, ProblemVariables, ResolutionError,
    Solution, SolutionStatus as LpStatus, SolverModel, Variable, WithTimeLimit,
};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// An exact MILP backend: `solve(objective, constraints) -> (status, values)`.
///
/// Implementations must either prove optimality or report a non-optimal
/// status; returning a merely feasible point as `Optimal` is a bug.
pub trait MilpBackend: Send + Sync {
    /// Short identifier used in logs and results.
    fn id(&self) -> &str;

    fn solve(&self, model: &MilpModel) -> MilpOutcome;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MilpSolverKind {
    /// Pure-Rust branch-and-bound, always compiled in
    #[default]
    Microlp,
    #[cfg(feature = "solver-coin_cbc")]
    CoinCbc,
    #[cfg(feature = "solver-highs")]
    Highs,
}

impl MilpSolverKind {
    pub fn available() -> &'static [&'static str] {
        AVAILABLE_MILP_SOLVERS
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MilpSolverKind::Microlp => "microlp",
            #[cfg(feature = "solver-coin_cbc")]
            MilpSolverKind::CoinCbc => "coin_cbc",
            #[cfg(feature = "solver-highs")]
            MilpSolverKind::Highs => "highs",
        }
    }

    pub fn build_backend(&self) -> Arc<dyn MilpBackend> {
        Arc::new(GoodLpBackend::new(*self))
    }
}

impl fmt::Display for MilpSolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const AVAILABLE_MILP_SOLVERS: &[&str] = &[
    "microlp",
    #[cfg(feature = "solver-coin_cbc")]
    "coin_cbc",
    #[cfg(feature = "solver-highs")]
    "highs",
];

fn unknown_solver_error(label: &str) -> anyhow::Error {
    anyhow!(
        "unknown milp solver '{}'; supported values: {}",
        label,
        MilpSolverKind::available().join(", ")
    )
}

impl FromStr for MilpSolverKind {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "microlp" | "default" => Ok(MilpSolverKind::Microlp),
            "coin_cbc" | "cbc" => {
                #[cfg(feature = "solver-coin_cbc")]
                {
                    Ok(MilpSolverKind::CoinCbc)
                }
                #[cfg(not(feature = "solver-coin_cbc"))]
                {
                    Err(unknown_solver_error(&normalized))
                }
            }
            "highs" => {
                #[cfg(feature = "solver-highs")]
                {
                    Ok(MilpSolverKind::Highs)
                }
                #[cfg(not(feature = "solver-highs"))]
                {
                    Err(unknown_solver_error(&normalized))
                }
            }
            other => Err(unknown_solver_error(other)),
        }
    }
}

/// Backend that lowers a [`MilpModel`] onto a `good_lp` solver.
///
/// Only answers the solver proves optimal are reported as
/// [`SolutionStatus::Optimal`]; gap-limited answers are errors and an
/// exhausted time limit is [`SolutionStatus::Timeout`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GoodLpBackend {
    kind: MilpSolverKind,
    time_limit: Option<Duration>,
}

impl GoodLpBackend {
    pub fn new(kind: MilpSolverKind) -> Self {
        Self {
            kind,
            time_limit: None,
        }
    }

    /// Wall-clock budget handed to the solver itself.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    pub fn kind(&self) -> MilpSolverKind {
        self.kind
    }

    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit
    }
}

impl MilpBackend for GoodLpBackend {
    fn id(&self) -> &str {
        self.kind.as_str()
    }

    fn solve(&self, model: &MilpModel) -> MilpOutcome {
        let lowered = lower(model);
        debug!(
            backend = self.id(),
            columns = lowered.columns.len(),
            rows = lowered.constraints.len(),
            time_limit_secs = self.time_limit.map(|l| l.as_secs_f64()),
            "dispatching model"
        );

        let Lowered {
            vars,
            objective,
            constraints,
            columns,
        } = lowered;
        let unsolved = vars.minimise(objective);
        match self.kind {
            MilpSolverKind::Microlp => {
                let problem = limited(unsolved.using(microlp_solver), self.time_limit);
                solve_with(problem, constraints, &columns, model)
            }
            #[cfg(feature = "solver-coin_cbc")]
            MilpSolverKind::CoinCbc => {
                let mut problem = unsolved.using(coin_cbc_solver);
                problem.set_parameter("log", "0");
                let problem = limited(problem, self.time_limit);
                solve_with(problem, constraints, &columns, model)
            }
            #[cfg(feature = "solver-highs")]
            MilpSolverKind::Highs => {
                // HiGHS stops at a 1e-4 relative gap unless told otherwise
                let mut problem = match unsolved.using(highs_solver).with_mip_gap(0.0) {
                    Ok(problem) => problem,
                    Err(err) => return MilpOutcome::failed(SolutionStatus::Error, err.to_string()),
                };
                problem.set_verbose(false);
                let problem = limited(problem, self.time_limit);
                solve_with(problem, constraints, &columns, model)
            }
        }
    }
}

struct Lowered {
    vars: ProblemVariables,
    objective: Expression,
    constraints: Vec<Constraint>,
    columns: Vec<Variable>,
}

fn lower(model: &MilpModel) -> Lowered {
    let mut vars = variables!();
    let columns: Vec<Variable> = model
        .columns()
        .iter()
        .map(|column| {
            let definition = variable()
                .name(column.name.clone())
                .min(column.lower)
                .max(column.upper);
            if column.integer {
                vars.add(definition.integer())
            } else {
                vars.add(definition)
            }
        })
        .collect();

    let mut objective = Expression::from(0.0);
    for (column, var) in model.columns().iter().zip(&columns) {
        if column.cost != 0.0 {
            objective += column.cost * *var;
        }
    }

    let constraints: Vec<Constraint> = model
        .rows()
        .iter()
        .map(|row| {
            let mut lhs = Expression::from(0.0);
            for (column, coef) in &row.terms {
                lhs += *coef * columns[column.index()];
            }
            let rhs = row.rhs;
            match row.sense {
                RowSense::LessEq => constraint!(lhs <= rhs),
                RowSense::GreaterEq => constraint!(lhs >= rhs),
                RowSense::Equal => constraint!(lhs == rhs),
            }
        })
        .collect();

    Lowered {
        vars,
        objective,
        constraints,
        columns,
    }
}

fn limited<P: WithTimeLimit>(problem: P, limit: Option<Duration>) -> P {
    match limit {
        Some(limit) => problem.with_time_limit(limit.as_secs_f64()),
        None => problem,
    }
}

const INTEGRALITY_TOLERANCE: f64 = 1e-6;

// microlp reports an expired budget without any incumbent as this error
const MICROLP_TIME_LIMIT_MESSAGE: &str = "Time limit reached";

fn solve_with<M>(
    mut problem: M,
    constraints: Vec<Constraint>,
    columns: &[Variable],
    model: &MilpModel,
) -> MilpOutcome
where
    M: SolverModel<Error = ResolutionError>,
{
    for c in constraints {
        problem.add_constraint(c);
    }
    match problem.solve() {
        Ok(solution) => match solution.status() {
            LpStatus::Optimal => {
                let raw: Vec<f64> = columns.iter().map(|var| solution.value(*var)).collect();
                // objective from the solver's own values; extraction reads the snapped ones
                let objective = model.objective_value(&raw);
                let values = raw
                    .into_iter()
                    .zip(model.columns())
                    .map(|(value, column)| {
                        if column.integer
                            && (value - value.round()).abs() < INTEGRALITY_TOLERANCE
                        {
                            value.round()
                        } else {
                            value
                        }
                    })
                    .collect();
                MilpOutcome::optimal(objective, values)
            }
            LpStatus::TimeLimit => {
                warn!("solver stopped at its time limit before proving optimality");
                MilpOutcome::failed(
                    SolutionStatus::Timeout,
                    "time limit reached before optimality was proven",
                )
            }
            LpStatus::GapLimit => MilpOutcome::failed(
                SolutionStatus::Error,
                "solver stopped at its MIP gap limit without proving optimality",
            ),
        },
        Err(ResolutionError::Infeasible) => {
            MilpOutcome::failed(SolutionStatus::Infeasible, "problem is infeasible")
        }
        Err(ResolutionError::Unbounded) => {
            MilpOutcome::failed(SolutionStatus::Unbounded, "problem is unbounded")
        }
        Err(ResolutionError::Other(message)) if message.starts_with(MICROLP_TIME_LIMIT_MESSAGE) => {
            warn!("solver time limit expired before any feasible solution");
            MilpOutcome::failed(SolutionStatus::Timeout, message)
        }
        Err(other) => MilpOutcome::failed(SolutionStatus::Error, other.to_string()),
    }
}
