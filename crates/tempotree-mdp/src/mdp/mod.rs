//! Transition systems over converted and combination problems.

mod interner;
mod simulator;
mod state;
mod transition;

use tracing::info;

use crate::{
    CombinationAction, CombinationProblem, ConvertedAction, ConvertedProblem, MdpError,
    ProblemCore,
};

pub use interner::StateInterner;
pub use simulator::MdpSimulator;
pub use state::{InFlight, State};

use transition::{Branch, apply_event, holds_all, merge};

/// Floating point tolerance used when validating probability sums.
pub const PROB_TOLERANCE: f64 = 1e-9;

/// Dense index of an action in an [`Mdp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ActionRef(usize);

impl ActionRef {
    pub fn index(self) -> usize {
        self.0
    }
}

impl From<usize> for ActionRef {
    fn from(value: usize) -> Self {
        Self(value)
    }
}

/// What an MDP action does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MdpAction {
    /// Start event of split action `i`; its end fires `duration` ticks later.
    Start(usize),
    /// Zero-duration converted action `i`.
    Instant(usize),
    /// Let one tick pass.
    Wait,
    /// Converted action `i` run to completion as one macro step.
    Single(usize),
    /// Combination action `j` run to completion as one macro step.
    Combined(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MdpMode {
    /// One event per decision, one tick per decision.
    Split,
    /// One macro transition per decision, lasting its longest part.
    Combination,
}

/// Problems that can be wrapped as an [`Mdp`].
pub trait IntoMdp {
    fn into_mdp(self, discount: f64) -> Result<Mdp, MdpError>;
}

impl IntoMdp for ConvertedProblem {
    fn into_mdp(self, discount: f64) -> Result<Mdp, MdpError> {
        Mdp::from_parts(MdpMode::Split, self.core, self.actions, Vec::new(), discount)
    }
}

impl IntoMdp for &ConvertedProblem {
    fn into_mdp(self, discount: f64) -> Result<Mdp, MdpError> {
        self.clone().into_mdp(discount)
    }
}

impl IntoMdp for CombinationProblem {
    fn into_mdp(self, discount: f64) -> Result<Mdp, MdpError> {
        Mdp::from_parts(
            MdpMode::Combination,
            self.core,
            self.singles,
            self.combinations,
            discount,
        )
    }
}

impl IntoMdp for &CombinationProblem {
    fn into_mdp(self, discount: f64) -> Result<Mdp, MdpError> {
        self.clone().into_mdp(discount)
    }
}

/// Wrap a converted or combination problem as an MDP, validating every law.
pub fn build(problem: impl IntoMdp, discount: f64) -> Result<Mdp, MdpError> {
    problem.into_mdp(discount)
}

/// Applicability and transition primitives over immutable [`State`]s.
///
/// Every decision costs time; a decision that would overrun the remaining
/// time leads to the absorbing failure state. Rewards are left to the planner.
#[derive(Debug, Clone)]
pub struct Mdp {
    mode: MdpMode,
    core: ProblemCore,
    discount: f64,
    singles: Vec<ConvertedAction>,
    combinations: Vec<CombinationAction>,
    actions: Vec<MdpAction>,
    names: Vec<String>,
}

impl Mdp {
    pub fn build(problem: impl IntoMdp, discount: f64) -> Result<Self, MdpError> {
        problem.into_mdp(discount)
    }

    fn from_parts(
        mode: MdpMode,
        core: ProblemCore,
        singles: Vec<ConvertedAction>,
        combinations: Vec<CombinationAction>,
        discount: f64,
    ) -> Result<Self, MdpError> {
        if !discount.is_finite() || !(0.0..=1.0).contains(&discount) {
            return Err(MdpError::InvalidDiscount { value: discount });
        }

        for action in &singles {
            let events = std::iter::once(action.start_event()).chain(action.end_event());
            for event in events {
                for (group, effect) in event.groups.iter().enumerate() {
                    effect.law.check(action.name(), group, PROB_TOLERANCE)?;
                }
            }
        }

        let mut actions = Vec::new();
        let mut names = Vec::new();
        match mode {
            MdpMode::Split => {
                for (i, action) in singles.iter().enumerate() {
                    match action {
                        ConvertedAction::Split { action, .. } => {
                            actions.push(MdpAction::Start(i));
                            names.push(action.start.name.clone());
                        }
                        ConvertedAction::Instant { action, .. } => {
                            actions.push(MdpAction::Instant(i));
                            names.push(action.name.clone());
                        }
                    }
                }
                actions.push(MdpAction::Wait);
                names.push("wait".to_string());
            }
            MdpMode::Combination => {
                for (i, action) in singles.iter().enumerate() {
                    actions.push(MdpAction::Single(i));
                    names.push(action.name().to_string());
                }
                for (j, combo) in combinations.iter().enumerate() {
                    actions.push(MdpAction::Combined(j));
                    names.push(combo.name.clone());
                }
            }
        }

        info!(
            domain = %core.name,
            mode = ?mode,
            actions = actions.len(),
            deadline = core.deadline,
            "built mdp"
        );

        Ok(Mdp {
            mode,
            core,
            discount,
            singles,
            combinations,
            actions,
            names,
        })
    }

    pub fn mode(&self) -> MdpMode {
        self.mode
    }

    pub fn core(&self) -> &ProblemCore {
        &self.core
    }

    pub fn discount(&self) -> f64 {
        self.discount
    }

    pub fn deadline(&self) -> u32 {
        self.core.deadline
    }

    pub fn initial_state(&self) -> State {
        State::new(self.core.initial.clone(), self.core.deadline, Vec::new())
    }

    pub fn action_count(&self) -> usize {
        self.actions.len()
    }

    pub fn action(&self, action: ActionRef) -> Option<MdpAction> {
        self.actions.get(action.index()).copied()
    }

    pub fn action_name(&self, action: ActionRef) -> Option<&str> {
        self.names.get(action.index()).map(String::as_str)
    }

    pub fn action_by_name(&self, name: &str) -> Option<ActionRef> {
        self.names.iter().position(|n| n == name).map(ActionRef::from)
    }

    /// Time consumed by one decision taking `action`.
    fn cost(&self, action: MdpAction) -> u32 {
        match action {
            MdpAction::Start(_) | MdpAction::Instant(_) | MdpAction::Wait => 1,
            MdpAction::Single(i) => self.singles.get(i).map_or(1, ConvertedAction::span),
            MdpAction::Combined(j) => self
                .combinations
                .get(j)
                .map(|combo| {
                    combo
                        .parts
                        .iter()
                        .filter_map(|part| self.singles.get(*part))
                        .map(ConvertedAction::span)
                        .max()
                        .unwrap_or(1)
                })
                .unwrap_or(1),
        }
    }

    fn starts_hold(&self, state: &State, part: usize) -> bool {
        self.singles
            .get(part)
            .is_some_and(|action| holds_all(state.atoms(), &action.start_event().preconditions))
    }

    pub fn is_applicable(&self, state: &State, action: ActionRef) -> bool {
        if state.is_failure() {
            return false;
        }
        match self.action(action) {
            Some(MdpAction::Start(i)) => !state.in_flight(i) && self.starts_hold(state, i),
            Some(MdpAction::Instant(i)) | Some(MdpAction::Single(i)) => self.starts_hold(state, i),
            Some(MdpAction::Wait) => true,
            Some(MdpAction::Combined(j)) => self
                .combinations
                .get(j)
                .is_some_and(|combo| combo.parts.iter().all(|part| self.starts_hold(state, *part))),
            None => false,
        }
    }

    /// Applicable actions in action order; empty for the failure state.
    pub fn applicable_actions(&self, state: &State) -> Vec<ActionRef> {
        (0..self.actions.len())
            .map(ActionRef::from)
            .filter(|action| self.is_applicable(state, *action))
            .collect()
    }

    /// Successor distribution of `action` in `state`.
    ///
    /// Identical successors are merged; an inapplicable action leaves the state unchanged.
    pub fn transitions(&self, state: &State, action: ActionRef) -> Vec<(f64, State)> {
        let Some(kind) = self.action(action) else {
            return vec![(1.0, state.clone())];
        };
        if !self.is_applicable(state, action) {
            return vec![(1.0, state.clone())];
        }

        let cost = self.cost(kind);
        if state.remaining() < cost {
            return vec![(1.0, State::failure())];
        }
        let remaining = state.remaining() - cost;

        match kind {
            MdpAction::Start(_) | MdpAction::Instant(_) | MdpAction::Wait => {
                self.split_step(state, kind, remaining)
            }
            MdpAction::Single(i) => self.macro_step(state, &[i], remaining),
            MdpAction::Combined(j) => match self.combinations.get(j) {
                Some(combo) => self.macro_step(state, &combo.parts, remaining),
                None => vec![(1.0, state.clone())],
            },
        }
    }

    /// Apply the chosen event, advance one tick, then fire due end events.
    fn split_step(&self, state: &State, kind: MdpAction, remaining: u32) -> Vec<(f64, State)> {
        let table = self.core.atoms.as_ref();
        let mut branches = vec![Branch::certain(state.atoms().clone())];
        let mut agenda = state.agenda().to_vec();

        match kind {
            MdpAction::Start(i) => {
                if let Some(ConvertedAction::Split { action, .. }) = self.singles.get(i) {
                    branches = apply_event(table, branches, &action.start, false);
                    agenda.push(InFlight {
                        ticks_left: action.duration,
                        action: i,
                    });
                }
            }
            MdpAction::Instant(i) => {
                if let Some(action) = self.singles.get(i) {
                    branches = apply_event(table, branches, action.start_event(), false);
                }
            }
            _ => {}
        }

        agenda.sort_unstable();
        for entry in &mut agenda {
            entry.ticks_left = entry.ticks_left.saturating_sub(1);
        }
        let (due, pending): (Vec<InFlight>, Vec<InFlight>) =
            agenda.into_iter().partition(|entry| entry.ticks_left == 0);

        for entry in due {
            if let Some(end) = self.singles.get(entry.action).and_then(ConvertedAction::end_event) {
                branches = apply_event(table, branches, end, true);
            }
        }

        merge(
            branches
                .into_iter()
                .map(|branch| (branch.prob, State::new(branch.atoms, remaining, pending.clone()))),
        )
    }

    /// Start every part in order, then resolve their end events in order.
    fn macro_step(&self, state: &State, parts: &[usize], remaining: u32) -> Vec<(f64, State)> {
        let table = self.core.atoms.as_ref();
        let mut branches = vec![Branch::certain(state.atoms().clone())];

        for part in parts {
            if let Some(action) = self.singles.get(*part) {
                branches = apply_event(table, branches, action.start_event(), false);
            }
        }
        for part in parts {
            if let Some(end) = self.singles.get(*part).and_then(ConvertedAction::end_event) {
                branches = apply_event(table, branches, end, true);
            }
        }

        merge(
            branches
                .into_iter()
                .map(|branch| (branch.prob, State::new(branch.atoms, remaining, Vec::new()))),
        )
    }

    /// Pick a successor with a uniform `sample` in `[0, 1)` by CDF lookup.
    pub fn sample(&self, state: &State, action: ActionRef, sample: f64) -> State {
        let outcomes = self.transitions(state, action);
        let mut cumulative = 0.0_f64;
        let cdf: Vec<f64> = outcomes
            .iter()
            .map(|(prob, _)| {
                cumulative += prob;
                cumulative
            })
            .collect();

        let mut chosen_idx = cdf.partition_point(|p| *p < sample);
        if chosen_idx >= outcomes.len() {
            chosen_idx = outcomes.len().saturating_sub(1);
        }

        outcomes
            .into_iter()
            .nth(chosen_idx)
            .map(|(_, next)| next)
            .unwrap_or_else(|| state.clone())
    }

    pub fn goal_count(&self) -> usize {
        self.core.goals.len()
    }

    /// Number of goal literals holding in `state`; zero for the failure state.
    pub fn goals_satisfied(&self, state: &State) -> usize {
        if state.is_failure() {
            return 0;
        }
        self.core
            .goals
            .iter()
            .filter(|goal| state.holds(goal.atom) == goal.value)
            .count()
    }

    pub fn is_goal(&self, state: &State) -> bool {
        !state.is_failure() && self.goals_satisfied(state) == self.goal_count()
    }

    /// Time spent since the initial state.
    pub fn elapsed(&self, state: &State) -> u32 {
        self.core.deadline.saturating_sub(state.remaining())
    }
}
