//! Unified error type for the depot workspace
//!
//! Domain-specific errors (solver, estimator, loaders) convert into
//! [`DepotError`] so callers can handle failures uniformly at API boundaries.
//!
//! # Example
//!
//! ```ignore
//! use depot_core::{DepotError, DepotResult};
//!
//! fn plan(dir: &Path) -> DepotResult<()> {
//!     let facilities = load_facilities(&dir.join("facilities.csv"))?;
//!     solve_facility_location(&matrix, &fixed_costs, &options)?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Unified error type for all depot operations.
///
/// Configuration errors are raised before any solve attempt; solver errors
/// carry the status the MILP backend reported.
#[derive(Error, Debug)]
pub enum DepotError {
    /// I/O errors (file access)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parsing/deserialization errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// Input table problems (missing columns, malformed rows)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Invalid model configuration detected before solving
    #[error("Configuration error: {0}")]
    Config(String),

    /// Non-optimal or failed solve
    #[error("Solver error: {0}")]
    Solver(String),

    /// Generic errors (for wrapping external errors)
    #[error("{0}")]
    Other(String),
}

/// Convenience type alias for Results using DepotError.
pub type DepotResult<T> = Result<T, DepotError>;

impl From<anyhow::Error> for DepotError {
    fn from(err: anyhow::Error) -> Self {
        DepotError::Other(err.to_string())
    }
}

impl From<String> for DepotError {
    fn from(s: String) -> Self {
        DepotError::Other(s)
    }
}

impl From<&str> for DepotError {
    fn from(s: &str) -> Self {
        DepotError::Other(s.to_string())
    }
}

impl From<serde_json::Error> for DepotError {
    fn from(err: serde_json::Error) -> Self {
        DepotError::Parse(err.to_string())
    }
}

impl From<toml::de::Error> for DepotError {
    fn from(err: toml::de::Error) -> Self {
        DepotError::Parse(err.to_string())
    }
}
