use std::{
    cell::RefCell,
    time::{Duration, Instant},
};

use serde::{Deserialize, Serialize};
use tempotree_search::{
    ActionId, ReturnType, SearchConfig, SearchConfigError, SelectionType, Tree, TreeError,
};
use thiserror::Error;
use tracing::{debug, info};

use crate::{ActionRef, Mdp, MdpSimulator, State, StateInterner};

/// Budgets and knobs of the MCTS planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanParams {
    /// Wall-clock limit of one episode.
    pub horizon_secs: f64,
    /// Search time per decision.
    pub search_time_secs: f64,
    pub search_depth: usize,
    pub exploration_constant: f64,
    pub selection: SelectionType,
    /// Candidates the rollout policy samples per step.
    pub k: usize,
    pub seed: u64,
    /// Iteration cap per decision, on top of the time budget.
    pub max_iterations: usize,
}

impl Default for PlanParams {
    fn default() -> Self {
        PlanParams {
            horizon_secs: 90.0,
            search_time_secs: 1.0,
            search_depth: 40,
            exploration_constant: 10.0,
            selection: SelectionType::Avg,
            k: 10,
            seed: 0,
            max_iterations: 10_000,
        }
    }
}

impl PlanParams {
    pub fn validate(&self) -> Result<(), PlanError> {
        if !self.horizon_secs.is_finite() || self.horizon_secs <= 0.0 {
            return Err(PlanError::InvalidParams(
                "horizon_secs must be finite and > 0".to_string(),
            ));
        }
        if self.k == 0 {
            return Err(PlanError::InvalidParams("k must be greater than 0".to_string()));
        }
        Ok(())
    }

    /// Search configuration of one decision with discount `gamma`.
    pub fn search_config(&self, gamma: f64) -> SearchConfig {
        SearchConfig {
            iterations: self.max_iterations,
            time_budget_secs: Some(self.search_time_secs),
            c: self.exploration_constant,
            gamma,
            max_depth: self.search_depth,
            return_type: ReturnType::Discounted,
            fixed_horizon_steps: self.search_depth,
            selection: self.selection,
        }
    }
}

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("invalid planner parameters: {0}")]
    InvalidParams(String),

    #[error(transparent)]
    Config(#[from] SearchConfigError),

    #[error("search failed: {0}")]
    Search(#[from] TreeError),
}

/// Why an episode ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    GoalReached,
    DeadlineExceeded,
    NoApplicableAction,
    HorizonElapsed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceStep {
    pub action: String,
    /// Domain time elapsed after the step.
    pub elapsed: u32,
    pub goals_satisfied: usize,
}

/// One executed episode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    pub steps: Vec<TraceStep>,
    pub status: PlanStatus,
    pub final_elapsed: u32,
    pub goals_satisfied: usize,
    pub wall_time_secs: f64,
}

/// Aggregate over repeated episodes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationSummary {
    pub runs: usize,
    pub successes: usize,
    pub success_rate: f64,
    /// Mean domain time over every run.
    pub mean_elapsed: f64,
    pub mean_steps: f64,
    pub mean_wall_time_secs: f64,
    pub deadline_exceeded: usize,
    pub no_applicable_action: usize,
    pub horizon_elapsed: usize,
}

impl EvaluationSummary {
    pub fn from_traces(traces: &[Trace]) -> Self {
        let runs = traces.len();
        let count = |status: PlanStatus| traces.iter().filter(|t| t.status == status).count();
        let mean = |value: fn(&Trace) -> f64| {
            if runs == 0 {
                0.0
            } else {
                traces.iter().map(value).sum::<f64>() / runs as f64
            }
        };

        let successes = count(PlanStatus::GoalReached);
        EvaluationSummary {
            runs,
            successes,
            success_rate: if runs == 0 {
                0.0
            } else {
                successes as f64 / runs as f64
            },
            mean_elapsed: mean(|t| t.final_elapsed as f64),
            mean_steps: mean(|t| t.steps.len() as f64),
            mean_wall_time_secs: mean(|t| t.wall_time_secs),
            deadline_exceeded: count(PlanStatus::DeadlineExceeded),
            no_applicable_action: count(PlanStatus::NoApplicableAction),
            horizon_elapsed: count(PlanStatus::HorizonElapsed),
        }
    }
}

fn is_terminal(mdp: &Mdp, state: &State) -> bool {
    state.is_failure() || mdp.is_goal(state)
}

/// Fraction of goal literals that hold in `next` but not in `prev`.
fn progress(mdp: &Mdp, prev: &State, next: &State) -> f64 {
    let total = mdp.goal_count();
    if total == 0 || next.is_failure() {
        return 0.0;
    }
    let gained = mdp
        .core()
        .goals
        .iter()
        .filter(|goal| prev.holds(goal.atom) != goal.value && next.holds(goal.atom) == goal.value)
        .count();
    gained as f64 / total as f64
}

fn expected_progress(mdp: &Mdp, state: &State, action: ActionRef) -> f64 {
    mdp.transitions(state, action)
        .iter()
        .map(|(prob, next)| prob * progress(mdp, state, next))
        .sum()
}

/// Sample up to `k` distinct actions and keep the first with the highest expected progress.
fn rollout_choice(mdp: &Mdp, state: &State, count: usize, k: usize, sim: &mut MdpSimulator<'_>) -> usize {
    let applicable = mdp.applicable_actions(state);
    let mut pool: Vec<usize> = (0..count).collect();
    let mut best: Option<(usize, f64)> = None;

    for drawn in 0..k.min(count) {
        let pick = drawn + sim.pick(count - drawn);
        pool.swap(drawn, pick);
        let candidate = pool[drawn];
        let score = applicable
            .get(candidate)
            .map_or(0.0, |action| expected_progress(mdp, state, *action));

        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((candidate, score)),
        }
    }
    best.map_or(0, |(candidate, _)| candidate)
}

/// Run MCTS from `state` and return the root action with the most visits.
fn decide(
    mdp: &Mdp,
    state: &State,
    applicable: &[ActionRef],
    config: &SearchConfig,
    k: usize,
    sim: &mut MdpSimulator<'_>,
) -> Result<ActionRef, PlanError> {
    if applicable.len() == 1 {
        return Ok(applicable[0]);
    }

    let interner = RefCell::new(StateInterner::new());
    let sim = RefCell::new(sim);
    let root = interner.borrow_mut().intern(state.clone());
    let mut tree = Tree::new(root, false);

    let metrics = tree.run(
        config,
        |key| match interner.borrow().get(key) {
            Some(current) if !is_terminal(mdp, current) => mdp.applicable_actions(current).len(),
            _ => 0,
        },
        |key, action| {
            let Some(current) = interner.borrow().get(key).cloned() else {
                return (key, 0.0, true);
            };
            let Some(chosen) = mdp.applicable_actions(&current).get(action.index()).copied() else {
                return (key, 0.0, true);
            };
            let next = sim.borrow_mut().step(&current, chosen);
            let reward = progress(mdp, &current, &next);
            let terminal = is_terminal(mdp, &next);
            (interner.borrow_mut().intern(next), reward, terminal)
        },
        |key, count| {
            let Some(current) = interner.borrow().get(key).cloned() else {
                return ActionId::from(0);
            };
            let mut guard = sim.borrow_mut();
            ActionId::from(rollout_choice(mdp, &current, count, k, &mut **guard))
        },
    )?;

    let chosen = tree
        .best_root_action_by_visits()?
        .and_then(|action| applicable.get(action.index()).copied())
        .unwrap_or(applicable[0]);

    debug!(
        action = mdp.action_name(chosen).unwrap_or("?"),
        iterations = metrics.iterations_completed,
        nodes = tree.node_count(),
        states = interner.borrow().len(),
        stopped_by_time = metrics.stopped_by_time,
        "decision"
    );
    Ok(chosen)
}

/// Plan and execute one episode on `mdp`, deciding every step by MCTS.
pub fn plan(mdp: &Mdp, params: &PlanParams) -> Result<Trace, PlanError> {
    params.validate()?;
    let config = params.search_config(mdp.discount());
    config.validate()?;

    let horizon = Duration::from_secs_f64(params.horizon_secs);
    let started = Instant::now();
    let mut sim = MdpSimulator::new(mdp, params.seed);
    let mut state = mdp.initial_state();
    let mut steps = Vec::new();

    let status = loop {
        if mdp.is_goal(&state) {
            break PlanStatus::GoalReached;
        }
        if state.is_failure() {
            break PlanStatus::DeadlineExceeded;
        }
        if started.elapsed() >= horizon {
            break PlanStatus::HorizonElapsed;
        }
        let applicable = mdp.applicable_actions(&state);
        if applicable.is_empty() {
            break PlanStatus::NoApplicableAction;
        }

        let action = decide(mdp, &state, &applicable, &config, params.k, &mut sim)?;
        state = sim.step(&state, action);
        steps.push(TraceStep {
            action: mdp.action_name(action).unwrap_or("?").to_string(),
            elapsed: mdp.elapsed(&state),
            goals_satisfied: mdp.goals_satisfied(&state),
        });
    };

    Ok(Trace {
        steps,
        status,
        final_elapsed: mdp.elapsed(&state),
        goals_satisfied: mdp.goals_satisfied(&state),
        wall_time_secs: started.elapsed().as_secs_f64(),
    })
}

/// Run `runs` episodes with seeds `seed`, `seed + 1`, ... and summarise them.
pub fn evaluate(runs: usize, mdp: &Mdp, params: &PlanParams) -> Result<EvaluationSummary, PlanError> {
    let mut traces = Vec::with_capacity(runs);
    for run in 0..runs {
        let run_params = PlanParams {
            seed: params.seed.wrapping_add(run as u64),
            ..params.clone()
        };
        let trace = plan(mdp, &run_params)?;
        info!(
            run,
            status = ?trace.status,
            elapsed = trace.final_elapsed,
            steps = trace.steps.len(),
            goals = trace.goals_satisfied,
            "finished run"
        );
        traces.push(trace);
    }
    Ok(EvaluationSummary::from_traces(&traces))
}
