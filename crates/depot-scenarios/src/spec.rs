//! Scenario definitions: the parameter overrides one what-if run applies to
//! the base planning data, and loading scenario sets from YAML or JSON.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Parameters of one what-if scenario.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// Relative demand growth applied to every client (0.1 = +10 %)
    #[serde(default)]
    pub demand_growth: f64,
    #[serde(default)]
    pub tax_factor: f64,
    #[serde(default = "default_wage_factor")]
    pub wage_factor: f64,
    /// Number of new sites to open; `None` falls back to the policy default
    #[serde(default)]
    pub new_site_limit: Option<usize>,
}

fn default_wage_factor() -> f64 {
    1.0
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            demand_growth: 0.0,
            tax_factor: 0.0,
            wage_factor: default_wage_factor(),
            new_site_limit: None,
        }
    }
}

impl ScenarioConfig {
    pub fn with_demand_growth(mut self, growth: f64) -> Self {
        self.demand_growth = growth;
        self
    }

    pub fn with_tax_factor(mut self, tax_factor: f64) -> Self {
        self.tax_factor = tax_factor;
        self
    }

    pub fn with_wage_factor(mut self, wage_factor: f64) -> Self {
        self.wage_factor = wage_factor;
        self
    }

    pub fn with_new_site_limit(mut self, limit: usize) -> Self {
        self.new_site_limit = Some(limit);
        self
    }

    /// Demand multiplier `1 + growth`.
    pub fn demand_multiplier(&self) -> f64 {
        1.0 + self.demand_growth
    }

    pub fn validate(&self) -> Result<()> {
        if !self.demand_growth.is_finite() || self.demand_growth <= -1.0 {
            return Err(anyhow!(
                "demand_growth must be greater than -1, got {}",
                self.demand_growth
            ));
        }
        if !self.tax_factor.is_finite() || self.tax_factor <= -1.0 {
            return Err(anyhow!(
                "tax_factor must be greater than -1, got {}",
                self.tax_factor
            ));
        }
        if !self.wage_factor.is_finite() || self.wage_factor < 0.0 {
            return Err(anyhow!(
                "wage_factor must be non-negative, got {}",
                self.wage_factor
            ));
        }
        Ok(())
    }
}

/// A scenario with its resolved parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedScenario {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub config: ScenarioConfig,
}

impl NamedScenario {
    pub fn new(name: impl Into<String>, config: ScenarioConfig) -> Self {
        Self {
            name: name.into(),
            description: None,
            config,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Scenario file contents: shared defaults plus per-scenario overrides.
///
/// ```yaml
/// defaults:
///   tax_factor: 0.02
/// scenarios:
///   - name: base
///   - name: growth_20
///     demand_growth: 0.2
///     new_site_limit: 1
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSet {
    pub version: Option<u32>,
    #[serde(default)]
    pub defaults: ScenarioConfig,
    #[serde(default)]
    pub scenarios: Vec<ScenarioEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioEntry {
    pub name: String,
    pub description: Option<String>,
    pub demand_growth: Option<f64>,
    pub tax_factor: Option<f64>,
    pub wage_factor: Option<f64>,
    pub new_site_limit: Option<usize>,
}

pub fn load_scenario_set(path: &Path) -> Result<ScenarioSet> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading scenario set '{}'", path.display()))?;
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
            serde_yaml::from_str(&data).context("parsing scenario set yaml")
        }
        Some(ext) if ext.eq_ignore_ascii_case("json") => {
            serde_json::from_str(&data).context("parsing scenario set json")
        }
        _ => serde_yaml::from_str(&data)
            .or_else(|_| serde_json::from_str(&data))
            .context("parsing scenario set"),
    }
}

/// Merge each entry with the set defaults, rejecting empty or repeated names.
pub fn resolve_scenarios(set: &ScenarioSet) -> Result<Vec<NamedScenario>> {
    if set.scenarios.is_empty() {
        return Err(anyhow!("scenario set contains no scenarios"));
    }
    let defaults = set.defaults;
    let mut seen = HashSet::new();
    let mut resolved = Vec::with_capacity(set.scenarios.len());
    for entry in &set.scenarios {
        let name = entry.name.trim();
        if name.is_empty() {
            return Err(anyhow!("scenario name cannot be empty"));
        }
        if !seen.insert(name.to_string()) {
            return Err(anyhow!("duplicate scenario name '{}' in set", name));
        }
        let config = ScenarioConfig {
            demand_growth: entry.demand_growth.unwrap_or(defaults.demand_growth),
            tax_factor: entry.tax_factor.unwrap_or(defaults.tax_factor),
            wage_factor: entry.wage_factor.unwrap_or(defaults.wage_factor),
            new_site_limit: entry.new_site_limit.or(defaults.new_site_limit),
        };
        config
            .validate()
            .with_context(|| format!("invalid parameters for scenario '{}'", name))?;
        resolved.push(NamedScenario {
            name: name.to_string(),
            description: entry.description.clone(),
            config,
        });
    }
    Ok(resolved)
}

/// Load and resolve a scenario file in one step.
pub fn load_scenarios(path: &Path) -> Result<Vec<NamedScenario>> {
    let set = load_scenario_set(path)?;
    resolve_scenarios(&set).with_context(|| format!("resolving '{}'", path.display()))
}

pub fn validate(set: &ScenarioSet) -> Result<()> {
    resolve_scenarios(set).map(|_| ())
}

/// Built-in catalogue: current network, one or two new sites, +5 % tax,
/// +10 % logistics wages.
pub fn default_scenarios() -> Vec<NamedScenario> {
    vec![
        NamedScenario::new("base", ScenarioConfig::default())
            .with_description("current network, reassignment only"),
        NamedScenario::new("one_new_site", ScenarioConfig::default().with_new_site_limit(1))
            .with_description("open exactly one new site"),
        NamedScenario::new("two_new_sites", ScenarioConfig::default().with_new_site_limit(2))
            .with_description("open exactly two new sites"),
        NamedScenario::new("tax_5", ScenarioConfig::default().with_tax_factor(0.05))
            .with_description("5% additional tax on freight"),
        NamedScenario::new("wage_10", ScenarioConfig::default().with_wage_factor(1.10))
            .with_description("10% higher logistics wages"),
    ]
}

/// Look up a catalogue scenario by name.
pub fn find_scenario<'a>(scenarios: &'a [NamedScenario], name: &str) -> Option<&'a NamedScenario> {
    scenarios.iter().find(|s| s.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn defaults_fill_missing_fields() {
        let set: ScenarioSet = serde_yaml::from_str(
            "defaults:\n  tax_factor: 0.02\nscenarios:\n  - name: base\n  - name: growth\n    demand_growth: 0.2\n    new_site_limit: 1\n",
        )
        .unwrap();
        let resolved = resolve_scenarios(&set).unwrap();
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].config.tax_factor, 0.02);
        assert_eq!(resolved[0].config.wage_factor, 1.0);
        assert_eq!(resolved[1].config.demand_growth, 0.2);
        assert_eq!(resolved[1].config.new_site_limit, Some(1));
    }

    #[test]
    fn duplicate_names_rejected() {
        let set: ScenarioSet =
            serde_yaml::from_str("scenarios:\n  - name: a\n  - name: a\n").unwrap();
        let err = resolve_scenarios(&set).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn empty_set_rejected() {
        let set: ScenarioSet = serde_yaml::from_str("version: 1\n").unwrap();
        assert!(validate(&set).is_err());
    }

    #[test]
    fn invalid_growth_rejected() {
        let set: ScenarioSet =
            serde_yaml::from_str("scenarios:\n  - name: crash\n    demand_growth: -1.5\n").unwrap();
        assert!(resolve_scenarios(&set).is_err());
    }

    #[test]
    fn loads_json_by_extension() {
        let mut file = Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"scenarios": [{{"name": "tax_10", "tax_factor": 0.1}}]}}"#
        )
        .unwrap();
        let scenarios = load_scenarios(file.path()).unwrap();
        assert_eq!(scenarios[0].name, "tax_10");
        assert_eq!(scenarios[0].config.tax_factor, 0.1);
    }

    #[test]
    fn default_catalogue() {
        let catalogue = default_scenarios();
        let names: Vec<&str> = catalogue.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["base", "one_new_site", "two_new_sites", "tax_5", "wage_10"]
        );
        assert_eq!(
            find_scenario(&catalogue, "two_new_sites").unwrap().config.new_site_limit,
            Some(2)
        );
    }
}
