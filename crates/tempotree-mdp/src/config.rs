use std::{
    fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use tempotree_search::SelectionType;

use crate::{DomainKind, MdpError, PlanParams};

/// Planner used for the evaluation episodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Solver {
    /// Monte-Carlo tree search over the compiled MDP.
    #[default]
    Mcts,
}

impl fmt::Display for Solver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Solver::Mcts => f.write_str("mcts"),
        }
    }
}

impl FromStr for Solver {
    type Err = MdpError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "mcts" => Ok(Solver::Mcts),
            other => Err(MdpError::InvalidConfig(format!(
                "unsupported solver '{other}', expected mcts"
            ))),
        }
    }
}

/// Settings of one experiment run, loadable from YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub domain: String,
    pub domain_type: DomainKind,
    pub deadline: u32,
    pub object_amount: u32,
    pub garbage_amount: u32,
    pub runs: usize,
    pub solver: Solver,
    /// Wall-clock limit of one episode.
    pub horizon_secs: f64,
    /// Search time per decision.
    pub search_time_secs: f64,
    pub search_depth: usize,
    pub exploration_constant: f64,
    pub selection: SelectionType,
    /// Rollout candidates sampled per step.
    pub k: usize,
    pub max_iterations: usize,
    pub seed: u64,
    pub discount: f64,
    pub cache_dir: PathBuf,
}

impl Default for RunConfig {
    fn default() -> Self {
        let plan = PlanParams::default();
        RunConfig {
            domain: "full_conc".to_string(),
            domain_type: DomainKind::Regular,
            deadline: 20,
            object_amount: 1,
            garbage_amount: 0,
            runs: 1,
            solver: Solver::Mcts,
            horizon_secs: plan.horizon_secs,
            search_time_secs: plan.search_time_secs,
            search_depth: plan.search_depth,
            exploration_constant: plan.exploration_constant,
            selection: plan.selection,
            k: plan.k,
            max_iterations: plan.max_iterations,
            seed: plan.seed,
            discount: 0.95,
            cache_dir: PathBuf::from("cache_domains"),
        }
    }
}

impl RunConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, MdpError> {
        let config: RunConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_path(path: impl AsRef<Path>) -> Result<Self, MdpError> {
        let yaml = fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    pub fn validate(&self) -> Result<(), MdpError> {
        if !self.discount.is_finite() || !(0.0..=1.0).contains(&self.discount) {
            return Err(MdpError::InvalidDiscount {
                value: self.discount,
            });
        }
        if self.runs == 0 {
            return Err(MdpError::InvalidConfig("runs must be greater than 0".to_string()));
        }
        if self.object_amount == 0 {
            return Err(MdpError::InvalidConfig(
                "object_amount must be greater than 0".to_string(),
            ));
        }
        if !self.horizon_secs.is_finite() || self.horizon_secs <= 0.0 {
            return Err(MdpError::InvalidConfig(
                "horizon_secs must be finite and > 0".to_string(),
            ));
        }
        if !self.search_time_secs.is_finite() || self.search_time_secs <= 0.0 {
            return Err(MdpError::InvalidConfig(
                "search_time_secs must be finite and > 0".to_string(),
            ));
        }
        if self.search_depth == 0 {
            return Err(MdpError::InvalidConfig(
                "search_depth must be greater than 0".to_string(),
            ));
        }
        if !self.exploration_constant.is_finite() || self.exploration_constant < 0.0 {
            return Err(MdpError::InvalidConfig(
                "exploration_constant must be finite and >= 0".to_string(),
            ));
        }
        if self.k == 0 {
            return Err(MdpError::InvalidConfig("k must be greater than 0".to_string()));
        }
        if self.max_iterations == 0 {
            return Err(MdpError::InvalidConfig(
                "max_iterations must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Planner parameters of this run.
    pub fn plan_params(&self) -> PlanParams {
        PlanParams {
            horizon_secs: self.horizon_secs,
            search_time_secs: self.search_time_secs,
            search_depth: self.search_depth,
            exploration_constant: self.exploration_constant,
            selection: self.selection,
            k: self.k,
            seed: self.seed,
            max_iterations: self.max_iterations,
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }
}
