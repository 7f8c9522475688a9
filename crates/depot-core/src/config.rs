//! Application configuration.
//!
//! Every field has a default so a TOML file only needs to list overrides:
//!
//! ```toml
//! data_dir = "data"
//! default_facility_limit = 3
//! solver = "highs"
//! time_limit_seconds = 120
//! ```

use crate::error::{DepotError, DepotResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// New-site cap used when a scenario names no limit and no network exists
    #[serde(default = "default_facility_limit")]
    pub default_facility_limit: usize,
    /// Revenue per served client, for the financial summary
    #[serde(default = "default_unit_revenue")]
    pub default_unit_revenue: f64,
    #[serde(default = "default_tariff_per_km")]
    pub tariff_per_km: f64,
    #[serde(default = "default_baseline_scenario")]
    pub baseline_scenario: String,
    #[serde(default = "default_horizon_years")]
    pub horizon_years: usize,
    #[serde(default = "default_discount_rate")]
    pub discount_rate: f64,
    /// MILP backend name (`microlp`, `highs`, `coin_cbc`)
    #[serde(default = "default_solver")]
    pub solver: String,
    #[serde(default)]
    pub time_limit_seconds: Option<u64>,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("outputs")
}

fn default_facility_limit() -> usize {
    2
}

fn default_unit_revenue() -> f64 {
    150.0
}

fn default_tariff_per_km() -> f64 {
    1.2
}

fn default_baseline_scenario() -> String {
    "base".to_string()
}

fn default_horizon_years() -> usize {
    5
}

fn default_discount_rate() -> f64 {
    0.12
}

fn default_solver() -> String {
    "microlp".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            output_dir: default_output_dir(),
            default_facility_limit: default_facility_limit(),
            default_unit_revenue: default_unit_revenue(),
            tariff_per_km: default_tariff_per_km(),
            baseline_scenario: default_baseline_scenario(),
            horizon_years: default_horizon_years(),
            discount_rate: default_discount_rate(),
            solver: default_solver(),
            time_limit_seconds: None,
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(text: &str) -> DepotResult<Self> {
        let config: AppConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> DepotResult<()> {
        if !(self.tariff_per_km.is_finite() && self.tariff_per_km >= 0.0) {
            return Err(DepotError::Config(format!(
                "tariff_per_km must be a non-negative number, got {}",
                self.tariff_per_km
            )));
        }
        if self.horizon_years == 0 {
            return Err(DepotError::Config("horizon_years must be at least 1".into()));
        }
        if self.baseline_scenario.trim().is_empty() {
            return Err(DepotError::Config("baseline_scenario cannot be empty".into()));
        }
        Ok(())
    }
}

/// Load configuration from a TOML file.
pub fn load_config(path: &Path) -> DepotResult<AppConfig> {
    let text = fs::read_to_string(path)?;
    AppConfig::from_toml_str(&text)
        .map_err(|err| DepotError::Config(format!("{}: {err}", path.display())))
}
