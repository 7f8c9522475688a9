//! Scenario → solver constraint translation.
//!
//! | scenario | existing network | max new | min total open |
//! |----------|------------------|---------|----------------|
//! | baseline | yes | 0 | \|existing\| |
//! | limit `k` | yes | k | \|existing\| + k |
//! | limit `k` | no | k | none |
//! | no limit | any (non-baseline) | default limit | none |
//! | baseline | no | limit or default | none |

use crate::spec::{NamedScenario, ScenarioConfig};
use depot_algo::location::LocationOptions;
use depot_core::{AppConfig, FacilityId};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Opening bounds derived for one scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConstraints {
    pub max_new_facilities: usize,
    pub min_total_open_facilities: Option<usize>,
}

impl NetworkConstraints {
    /// Copy these bounds onto `options`, leaving its other fields intact.
    pub fn apply_to(&self, mut options: LocationOptions) -> LocationOptions {
        options.max_new_facilities = Some(self.max_new_facilities);
        options.min_total_open_facilities = self.min_total_open_facilities;
        options
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioPolicy {
    /// Name of the scenario that freezes the existing network
    pub baseline_name: String,
    /// New-site cap when a scenario names none
    pub default_facility_limit: usize,
}

impl Default for ScenarioPolicy {
    fn default() -> Self {
        Self::from_app_config(&AppConfig::default())
    }
}

impl ScenarioPolicy {
    pub fn new(baseline_name: impl Into<String>, default_facility_limit: usize) -> Self {
        Self {
            baseline_name: baseline_name.into(),
            default_facility_limit,
        }
    }

    pub fn from_app_config(config: &AppConfig) -> Self {
        Self::new(config.baseline_scenario.clone(), config.default_facility_limit)
    }

    pub fn is_baseline(&self, scenario_name: &str) -> bool {
        scenario_name == self.baseline_name
    }

    pub fn constraints(
        &self,
        scenario_name: &str,
        config: &ScenarioConfig,
        existing_count: usize,
    ) -> NetworkConstraints {
        let has_network = existing_count > 0;
        let constraints = match config.new_site_limit {
            _ if has_network && self.is_baseline(scenario_name) => NetworkConstraints {
                max_new_facilities: 0,
                min_total_open_facilities: Some(existing_count),
            },
            Some(limit) if has_network => NetworkConstraints {
                max_new_facilities: limit,
                min_total_open_facilities: Some(existing_count + limit),
            },
            limit => NetworkConstraints {
                max_new_facilities: limit.unwrap_or(self.default_facility_limit),
                min_total_open_facilities: None,
            },
        };
        debug!(
            scenario = scenario_name,
            existing = existing_count,
            max_new = constraints.max_new_facilities,
            min_total = ?constraints.min_total_open_facilities,
            "scenario constraints derived"
        );
        constraints
    }

    /// Full solver options: existing sites forced open, the rest candidates,
    /// bounds from [`ScenarioPolicy::constraints`].
    pub fn location_options(
        &self,
        scenario: &NamedScenario,
        existing: &[FacilityId],
        candidates: &[FacilityId],
    ) -> LocationOptions {
        self.constraints(&scenario.name, &scenario.config, existing.len())
            .apply_to(
                LocationOptions::new()
                    .with_forced_open(existing.iter().cloned())
                    .with_candidates(candidates.iter().cloned()),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> ScenarioPolicy {
        ScenarioPolicy::new("base", 2)
    }

    #[test]
    fn baseline_freezes_existing_network() {
        let c = policy().constraints("base", &ScenarioConfig::default().with_new_site_limit(3), 4);
        assert_eq!(c.max_new_facilities, 0);
        assert_eq!(c.min_total_open_facilities, Some(4));
    }

    #[test]
    fn explicit_limit_forces_exact_count() {
        let c = policy().constraints("one", &ScenarioConfig::default().with_new_site_limit(1), 3);
        assert_eq!(c.max_new_facilities, 1);
        assert_eq!(c.min_total_open_facilities, Some(4));
    }

    #[test]
    fn greenfield_uses_limit_as_cap() {
        let c = policy().constraints("one", &ScenarioConfig::default().with_new_site_limit(1), 0);
        assert_eq!(c.max_new_facilities, 1);
        assert_eq!(c.min_total_open_facilities, None);
    }

    #[test]
    fn zero_limit_is_kept() {
        let c = policy().constraints("none", &ScenarioConfig::default().with_new_site_limit(0), 0);
        assert_eq!(c.max_new_facilities, 0);
    }

    #[test]
    fn default_limit_applies_without_override() {
        let c = policy().constraints("tax_5", &ScenarioConfig::default(), 2);
        assert_eq!(c.max_new_facilities, 2);
        assert_eq!(c.min_total_open_facilities, None);

        let greenfield_base = policy().constraints("base", &ScenarioConfig::default(), 0);
        assert_eq!(greenfield_base.max_new_facilities, 2);
    }

    #[test]
    fn options_carry_network_groups() {
        let scenario = NamedScenario::new("one", ScenarioConfig::default().with_new_site_limit(1));
        let options = policy().location_options(
            &scenario,
            &[FacilityId::new("SP")],
            &[FacilityId::new("RJ"), FacilityId::new("BH")],
        );
        assert_eq!(options.forced_open_facilities, vec![FacilityId::new("SP")]);
        assert_eq!(options.candidate_facilities.as_ref().map(Vec::len), Some(2));
        assert_eq!(options.max_new_facilities, Some(1));
        assert_eq!(options.min_total_open_facilities, Some(2));
    }
}
