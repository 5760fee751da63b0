//! Planner settings read from `TABPLAN_*` environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{PlanningError, Result};
use crate::planners::deterministic::SearchConfig;
use crate::planners::value_function::{RtdpConfig, ValueIterationConfig};

pub const GAMMA: &str = "TABPLAN_GAMMA";
pub const MAX_DELTA: &str = "TABPLAN_MAX_DELTA";
pub const MAX_ITERATIONS: &str = "TABPLAN_MAX_ITERATIONS";
pub const TIME_BUDGET_MS: &str = "TABPLAN_TIME_BUDGET_MS";
pub const MAX_EXPANSIONS: &str = "TABPLAN_MAX_EXPANSIONS";
pub const RTDP_ROLLOUTS: &str = "TABPLAN_RTDP_ROLLOUTS";
pub const SEED: &str = "TABPLAN_SEED";

#[derive(Debug, Clone, Copy)]
pub struct PlannerSettings {
    pub gamma: f64,
    pub value_iteration: ValueIterationConfig,
    pub rtdp: RtdpConfig,
    pub search: SearchConfig,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            gamma: 0.99,
            value_iteration: ValueIterationConfig::default(),
            rtdp: RtdpConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

impl PlannerSettings {
    /// Defaults overridden by whichever `TABPLAN_*` variables are set.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Like [`PlannerSettings::from_env`] but reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut settings = Self::default();

        if let Some(gamma) = parse_var::<f64>(&lookup, GAMMA)? {
            if !(0.0..=1.0).contains(&gamma) {
                return Err(PlanningError::InvalidParameter(format!(
                    "{} must lie in [0, 1], got {}",
                    GAMMA, gamma
                )));
            }
            settings.gamma = gamma;
        }
        if let Some(max_delta) = parse_var::<f64>(&lookup, MAX_DELTA)? {
            settings.value_iteration.max_delta = max_delta;
            settings.rtdp.max_delta = max_delta;
        }
        if let Some(iterations) = parse_var::<usize>(&lookup, MAX_ITERATIONS)? {
            settings.value_iteration.max_iterations = iterations;
        }
        if let Some(ms) = parse_var::<u64>(&lookup, TIME_BUDGET_MS)? {
            let budget = Some(Duration::from_millis(ms));
            settings.value_iteration.time_budget = budget;
            settings.rtdp.time_budget = budget;
        }
        if let Some(expansions) = parse_var::<usize>(&lookup, MAX_EXPANSIONS)? {
            settings.search.max_expansions = Some(expansions);
        }
        if let Some(rollouts) = parse_var::<usize>(&lookup, RTDP_ROLLOUTS)? {
            settings.rtdp.num_rollouts = rollouts;
        }
        if let Some(seed) = parse_var::<u64>(&lookup, SEED)? {
            settings.rtdp.seed = seed;
        }

        Ok(settings)
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| {
            PlanningError::InvalidParameter(format!("{} has unparsable value {:?}", key, raw))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Result<PlannerSettings> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        PlannerSettings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_without_variables() {
        let s = settings(&[]).unwrap();
        assert_eq!(s.gamma, 0.99);
        assert_eq!(s.search.max_expansions, None);
        assert_eq!(s.value_iteration.time_budget, None);
    }

    #[test]
    fn test_overrides_apply() {
        let s = settings(&[
            (GAMMA, "0.5"),
            (MAX_ITERATIONS, "12"),
            (TIME_BUDGET_MS, "250"),
            (MAX_EXPANSIONS, " 40 "),
            (SEED, "9"),
        ])
        .unwrap();
        assert_eq!(s.gamma, 0.5);
        assert_eq!(s.value_iteration.max_iterations, 12);
        assert_eq!(s.rtdp.time_budget, Some(Duration::from_millis(250)));
        assert_eq!(s.search.max_expansions, Some(40));
        assert_eq!(s.rtdp.seed, 9);
    }

    #[test]
    fn test_bad_values_rejected() {
        assert!(matches!(
            settings(&[(MAX_ITERATIONS, "many")]),
            Err(PlanningError::InvalidParameter(_))
        ));
        assert!(settings(&[(GAMMA, "1.2")]).is_err());
    }
}
