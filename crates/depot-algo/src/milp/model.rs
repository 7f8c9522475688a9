//! Solver-independent representation of a mixed-integer linear program.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a decision variable inside a [`MilpModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnId(usize);

impl ColumnId {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    /// Objective coefficient
    pub cost: f64,
    pub lower: f64,
    pub upper: f64,
    pub integer: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowSense {
    LessEq,
    GreaterEq,
    Equal,
}

/// Linear row `Σ coef · x  {<=, >=, ==}  rhs`.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub terms: Vec<(ColumnId, f64)>,
    pub sense: RowSense,
    pub rhs: f64,
}

/// Minimization model handed to a [`super::MilpBackend`].
#[derive(Debug, Clone, Default)]
pub struct MilpModel {
    columns: Vec<Column>,
    rows: Vec<Row>,
}

impl MilpModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_column(&mut self, column: Column) -> ColumnId {
        self.columns.push(column);
        ColumnId(self.columns.len() - 1)
    }

    /// Add a {0,1} variable with the given objective coefficient.
    pub fn add_binary(&mut self, name: impl Into<String>, cost: f64) -> ColumnId {
        self.add_column(Column {
            name: name.into(),
            cost,
            lower: 0.0,
            upper: 1.0,
            integer: true,
        })
    }

    pub fn add_row(&mut self, terms: Vec<(ColumnId, f64)>, sense: RowSense, rhs: f64) {
        self.rows.push(Row { terms, sense, rhs });
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn num_integer(&self) -> usize {
        self.columns.iter().filter(|c| c.integer).count()
    }

    /// Objective evaluated at `values` (indexed by column).
    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.columns
            .iter()
            .zip(values)
            .map(|(column, value)| column.cost * value)
            .sum()
    }
}

/// Termination status reported by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolutionStatus {
    Optimal,
    Infeasible,
    Unbounded,
    Timeout,
    Error,
}

impl SolutionStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, SolutionStatus::Optimal)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SolutionStatus::Optimal => "optimal",
            SolutionStatus::Infeasible => "infeasible",
            SolutionStatus::Unbounded => "unbounded",
            SolutionStatus::Timeout => "timeout",
            SolutionStatus::Error => "error",
        }
    }
}

impl fmt::Display for SolutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one backend invocation. `values` is empty unless the status is
/// [`SolutionStatus::Optimal`].
#[derive(Debug, Clone)]
pub struct MilpOutcome {
    pub status: SolutionStatus,
    pub objective: f64,
    pub values: Vec<f64>,
    pub message: Option<String>,
}

impl MilpOutcome {
    pub fn optimal(objective: f64, values: Vec<f64>) -> Self {
        Self {
            status: SolutionStatus::Optimal,
            objective,
            values,
            message: None,
        }
    }

    pub fn failed(status: SolutionStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            objective: f64::NAN,
            values: Vec::new(),
            message: Some(message.into()),
        }
    }

    pub fn value(&self, column: ColumnId) -> f64 {
        self.values.get(column.index()).copied().unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn objective_uses_column_costs() {
        let mut model = MilpModel::new();
        let a = model.add_binary("a", 3.0);
        let b = model.add_binary("b", 5.0);
        model.add_row(vec![(a, 1.0), (b, 1.0)], RowSense::Equal, 1.0);

        assert_eq!(model.columns().len(), 2);
        assert_eq!(model.rows().len(), 1);
        assert_eq!(model.num_integer(), 2);
        assert_eq!(model.objective_value(&[1.0, 0.0]), 3.0);
        assert_eq!(b.index(), 1);
    }

    #[test]
    fn failed_outcome_has_no_values() {
        let outcome = MilpOutcome::failed(SolutionStatus::Infeasible, "no feasible point");
        assert!(!outcome.status.is_success());
        assert!(outcome.values.is_empty());
        assert_eq!(outcome.status.to_string(), "infeasible");
    }
}
