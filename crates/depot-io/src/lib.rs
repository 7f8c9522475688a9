//! # depot-io: Input Tables
//!
//! CSV loaders for the facility, demand, fixed-cost and regional-cost tables.
//! Header names are normalized here (trimmed, lowercased, Portuguese aliases
//! mapped to their canonical names) so the data model only ever sees one
//! field name per concept.
//!
//! | Table | Required columns | Optional columns |
//! |-------|------------------|------------------|
//! | facilities | `facility_id` | `lat`, `lon`, `capacity`, `fixed_cost`, `is_existing`, `uf`, `ocupacao`, `capacidade_m2` |
//! | demand | `client_id` | `lat`, `lon`, `demand` / `demanda` |
//! | fixed costs | `facility_id`, `fixed_cost` | |
//! | regional costs | `uf`, `labor_cost_index`, `real_estate_cost_m2`, `tax_factor`, `transport_factor` | |

use depot_core::{DepotError, DepotResult};

pub mod tables;

pub use tables::{
    load_demand_points, load_facilities, load_fixed_costs, load_regional_costs,
    read_demand_points, read_facilities, read_fixed_costs, read_regional_costs,
};

/// Values (case-insensitive) that mark a facility as already operating.
pub const EXISTING_FLAG_VALUES: &[&str] = &["1", "true", "yes", "sim"];

/// Interpret an `is_existing` cell; unrecognized or missing values are false.
pub fn parse_existing_flag(value: Option<&str>) -> bool {
    value
        .map(|v| {
            let v = v.trim();
            EXISTING_FLAG_VALUES
                .iter()
                .any(|flag| flag.eq_ignore_ascii_case(v))
        })
        .unwrap_or(false)
}

/// Fail with the sorted list of `required` columns absent from `headers`.
pub fn require_columns(table: &str, headers: &[String], required: &[&str]) -> DepotResult<()> {
    let mut missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h == col))
        .collect();
    if missing.is_empty() {
        return Ok(());
    }
    missing.sort_unstable();
    Err(DepotError::Validation(format!(
        "{table} table is missing required columns: {}",
        missing.join(", ")
    )))
}
