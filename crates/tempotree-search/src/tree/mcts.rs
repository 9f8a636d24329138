use std::time::{Duration, Instant};

use crate::tree::{
    config::SearchConfig,
    error::TreeError,
    ids::{ActionId, NodeId, StateKey},
    rollout::rollout,
    search_tree::Tree,
};

/// What one iteration did.
#[derive(Debug, Clone, Copy)]
pub struct IterationMetrics {
    pub leaf: NodeId,
    pub path_len: usize,
    pub reward_prefix: f64,
    pub rollout_return: f64,
    pub total_return: f64,
}

/// Aggregate of a complete search run.
#[derive(Debug, Clone)]
pub struct RunMetrics {
    pub iterations_requested: usize,
    pub iterations_completed: usize,
    pub total_return_sum: f64,
    pub average_total_return: f64,
    pub elapsed: Duration,
    /// True when the wall-clock budget ended the run before the iteration cap.
    pub stopped_by_time: bool,
}

impl RunMetrics {
    fn new(iterations_requested: usize) -> Self {
        RunMetrics {
            iterations_requested,
            iterations_completed: 0,
            total_return_sum: 0.0,
            average_total_return: 0.0,
            elapsed: Duration::ZERO,
            stopped_by_time: false,
        }
    }

    fn record(&mut self, metrics: IterationMetrics) {
        self.iterations_completed += 1;
        self.total_return_sum += metrics.total_return;
        self.average_total_return = self.total_return_sum / self.iterations_completed as f64;
    }
}

impl Tree {
    /// Add `total_return` to every edge on `path`.
    pub fn backpropagate(
        &mut self,
        path: &[(NodeId, ActionId)],
        total_return: f64,
    ) -> Result<(), TreeError> {
        path.iter().try_for_each(|&(node_id, action_id)| {
            let edge = self
                .node_mut(node_id)?
                .edge_mut(action_id)
                .ok_or(TreeError::MissingEdge { node_id, action_id })?;
            edge.record(total_return);
            Ok(())
        })
    }

    /// One iteration: selection/expansion, rollout, backpropagation.
    pub fn iterate<FNum, FStep, FPolicy>(
        &mut self,
        config: &SearchConfig,
        num_actions: &mut FNum,
        step: &mut FStep,
        rollout_policy: &mut FPolicy,
    ) -> Result<IterationMetrics, TreeError>
    where
        FNum: FnMut(StateKey) -> usize,
        FStep: FnMut(StateKey, ActionId) -> (StateKey, f64, bool),
        FPolicy: FnMut(StateKey, usize) -> ActionId,
    {
        let descent = self.tree_policy(
            config.c,
            config.selection,
            config.max_depth as u64,
            &mut *num_actions,
            &mut *step,
        )?;
        let leaf = self.node(descent.leaf)?;
        let rollout_return = if leaf.is_terminal() {
            0.0
        } else {
            rollout(
                leaf.state_key(),
                &mut *num_actions,
                &mut *step,
                &mut *rollout_policy,
                config.rollout_params(leaf.depth()),
            )?
        };

        let metrics = IterationMetrics {
            leaf: descent.leaf,
            path_len: descent.path.len(),
            reward_prefix: descent.reward,
            rollout_return,
            total_return: descent.reward + rollout_return,
        };
        self.backpropagate(&descent.path, metrics.total_return)?;
        Ok(metrics)
    }

    /// Iterate until the iteration cap or the time budget is exhausted.
    pub fn run<FNum, FStep, FPolicy>(
        &mut self,
        config: &SearchConfig,
        num_actions: FNum,
        step: FStep,
        rollout_policy: FPolicy,
    ) -> Result<RunMetrics, TreeError>
    where
        FNum: FnMut(StateKey) -> usize,
        FStep: FnMut(StateKey, ActionId) -> (StateKey, f64, bool),
        FPolicy: FnMut(StateKey, usize) -> ActionId,
    {
        self.run_with_hook(config, num_actions, step, rollout_policy, |_| {})
    }

    /// Like `run`, calling `on_iteration` after every completed iteration.
    pub fn run_with_hook<FNum, FStep, FPolicy, FHook>(
        &mut self,
        config: &SearchConfig,
        mut num_actions: FNum,
        mut step: FStep,
        mut rollout_policy: FPolicy,
        mut on_iteration: FHook,
    ) -> Result<RunMetrics, TreeError>
    where
        FNum: FnMut(StateKey) -> usize,
        FStep: FnMut(StateKey, ActionId) -> (StateKey, f64, bool),
        FPolicy: FnMut(StateKey, usize) -> ActionId,
        FHook: FnMut(&IterationMetrics),
    {
        let started = Instant::now();
        let out_of_time = |now: Duration| config.time_budget().is_some_and(|budget| now >= budget);
        let mut metrics = RunMetrics::new(config.iterations);

        while metrics.iterations_completed < config.iterations {
            if out_of_time(started.elapsed()) {
                metrics.stopped_by_time = true;
                break;
            }
            let done = self.iterate(config, &mut num_actions, &mut step, &mut rollout_policy)?;
            on_iteration(&done);
            metrics.record(done);
        }

        metrics.elapsed = started.elapsed();
        Ok(metrics)
    }
}
