use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use tempotree_mdp::{DomainKind, RunConfig, Solver};
use tempotree_search::SelectionType;

/// Flags that override values from the YAML run configuration.
#[derive(Args, Debug, Clone, Default)]
pub struct Overrides {
    /// Reference domain to compile (see `tempotree domains`)
    #[arg(long, short = 'd')]
    pub domain: Option<String>,

    /// regular, regular_as_baseline or combination
    #[arg(long = "type", short = 't', value_name = "KIND")]
    pub domain_type: Option<DomainKind>,

    /// Time units available to reach the goals
    #[arg(long)]
    pub deadline: Option<u32>,

    #[arg(long)]
    pub object_amount: Option<u32>,

    #[arg(long)]
    pub garbage_amount: Option<u32>,

    /// Episodes to evaluate
    #[arg(long, short = 'r')]
    pub runs: Option<usize>,

    /// Planner to evaluate; only mcts is available
    #[arg(long)]
    pub solver: Option<Solver>,

    /// Wall-clock seconds per episode
    #[arg(long)]
    pub horizon: Option<f64>,

    /// Search seconds per decision
    #[arg(long)]
    pub search_time: Option<f64>,

    #[arg(long)]
    pub search_depth: Option<usize>,

    /// UCB exploration constant
    #[arg(long)]
    pub exploration: Option<f64>,

    /// avg or max
    #[arg(long)]
    pub selection: Option<SelectionType>,

    /// Rollout candidates sampled per step
    #[arg(long, short = 'k')]
    pub k: Option<usize>,

    #[arg(long)]
    pub max_iterations: Option<usize>,

    #[arg(long, short = 's')]
    pub seed: Option<u64>,

    #[arg(long)]
    pub discount: Option<f64>,

    /// Directory holding compiled combination bundles
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,
}

impl Overrides {
    pub fn apply(self, config: &mut RunConfig) {
        if let Some(domain) = self.domain {
            config.domain = domain;
        }
        if let Some(kind) = self.domain_type {
            config.domain_type = kind;
        }
        if let Some(deadline) = self.deadline {
            config.deadline = deadline;
        }
        if let Some(amount) = self.object_amount {
            config.object_amount = amount;
        }
        if let Some(amount) = self.garbage_amount {
            config.garbage_amount = amount;
        }
        if let Some(runs) = self.runs {
            config.runs = runs;
        }
        if let Some(solver) = self.solver {
            config.solver = solver;
        }
        if let Some(secs) = self.horizon {
            config.horizon_secs = secs;
        }
        if let Some(secs) = self.search_time {
            config.search_time_secs = secs;
        }
        if let Some(depth) = self.search_depth {
            config.search_depth = depth;
        }
        if let Some(c) = self.exploration {
            config.exploration_constant = c;
        }
        if let Some(selection) = self.selection {
            config.selection = selection;
        }
        if let Some(k) = self.k {
            config.k = k;
        }
        if let Some(cap) = self.max_iterations {
            config.max_iterations = cap;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(discount) = self.discount {
            config.discount = discount;
        }
        if let Some(dir) = self.cache_dir {
            config.cache_dir = dir;
        }
    }
}

/// Load `path` (or the defaults), apply `overrides`, and validate the result.
pub fn resolve_config(path: Option<&Path>, overrides: Overrides) -> anyhow::Result<RunConfig> {
    let mut config = match path {
        Some(path) => RunConfig::from_yaml_path(path)
            .with_context(|| format!("failed to load run config {}", path.display()))?,
        None => RunConfig::default(),
    };
    overrides.apply(&mut config);
    config.validate().context("invalid run configuration")?;
    Ok(config)
}
