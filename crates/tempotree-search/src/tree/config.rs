use std::{fs, path::Path, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tree::{
    rollout::{ReturnType, RolloutParams},
    stats::SelectionType,
};

const BUNDLED_YAML: &str = include_str!("../../config/search.default.yaml");

/// Budget and scoring knobs of one MCTS decision.
///
/// Missing YAML keys fall back to [`SearchConfig::default`]. Every constructor
/// that reads YAML also runs [`SearchConfig::validate`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Upper bound on iterations.
    pub iterations: usize,
    /// Wall-clock budget in seconds; the run stops at whichever limit hits first.
    pub time_budget_secs: Option<f64>,
    /// UCB exploration constant.
    pub c: f64,
    pub gamma: f64,
    /// Steps from the root, tree descent and rollout combined.
    pub max_depth: usize,
    pub return_type: ReturnType,
    pub fixed_horizon_steps: usize,
    pub selection: SelectionType,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            iterations: 256,
            time_budget_secs: None,
            c: 1.4,
            gamma: 1.0,
            max_depth: 128,
            return_type: ReturnType::Discounted,
            fixed_horizon_steps: 32,
            selection: SelectionType::Avg,
        }
    }
}

#[derive(Debug, Error)]
pub enum SearchConfigError {
    #[error("failed to read search config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse search config YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid search config: {0}")]
    Invalid(String),
}

fn non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

impl SearchConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, SearchConfigError> {
        let config: SearchConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_path(path: impl AsRef<Path>) -> Result<Self, SearchConfigError> {
        Self::from_yaml_str(&fs::read_to_string(path)?)
    }

    /// YAML text of the config bundled with this crate.
    pub fn default_yaml() -> &'static str {
        BUNDLED_YAML
    }

    pub fn from_default_yaml() -> Result<Self, SearchConfigError> {
        Self::from_yaml_str(BUNDLED_YAML)
    }

    pub fn validate(&self) -> Result<(), SearchConfigError> {
        let budget_ok = self
            .time_budget_secs
            .is_none_or(|secs| secs.is_finite() && secs > 0.0);
        let checks = [
            (self.iterations > 0, "iterations must be greater than 0"),
            (budget_ok, "time_budget_secs must be finite and > 0"),
            (non_negative(self.c), "c must be finite and >= 0"),
            (non_negative(self.gamma), "gamma must be finite and >= 0"),
            (self.max_depth > 0, "max_depth must be greater than 0"),
            (
                self.fixed_horizon_steps > 0,
                "fixed_horizon_steps must be greater than 0",
            ),
        ];
        match checks.into_iter().find(|(ok, _)| !ok) {
            Some((_, reason)) => Err(SearchConfigError::Invalid(reason.to_string())),
            None => Ok(()),
        }
    }

    pub fn time_budget(&self) -> Option<Duration> {
        self.time_budget_secs.map(Duration::from_secs_f64)
    }

    /// Rollout params for a leaf at `leaf_depth`; the rollout gets whatever depth is left.
    pub(crate) fn rollout_params(&self, leaf_depth: u64) -> RolloutParams {
        RolloutParams {
            return_type: self.return_type,
            gamma: self.gamma,
            max_steps: (self.max_depth as u64).saturating_sub(leaf_depth) as usize,
            fixed_horizon_steps: self.fixed_horizon_steps,
        }
    }
}
