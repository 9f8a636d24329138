use std::{collections::BTreeSet, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::{
    AtomId, AtomTable, Distribution, EffectTiming, Literal, ObjectId, ProbabilityLaw, SchemaId,
    StateView, Timing, Universe,
};

/// Data shared by every compilation stage of one problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemCore {
    pub name: String,
    pub universe: Arc<Universe>,
    pub atoms: Arc<AtomTable>,
    /// Atoms true in the initial state.
    pub initial: BTreeSet<AtomId>,
    pub goals: Vec<Literal>,
    pub deadline: u32,
}

impl ProblemCore {
    pub fn describe(&self, atom: AtomId) -> String {
        self.atoms
            .get(atom)
            .map(|fluent| self.universe.describe(fluent))
            .unwrap_or_else(|| format!("#{}", atom.index()))
    }

    pub fn proposition_count(&self) -> usize {
        self.atoms.len()
    }
}

/// A ground probabilistic group: target atoms, the law and the bindings it reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectGroup {
    pub targets: Vec<AtomId>,
    pub law: Arc<ProbabilityLaw>,
    pub bindings: Vec<ObjectId>,
}

impl EffectGroup {
    /// Outcome distribution in `state` with target indices resolved to atoms.
    pub fn distribution<V: StateView + ?Sized>(&self, state: &V) -> Distribution {
        let outcomes = self.law.select(state, &self.bindings).iter().map(|outcome| {
            let literals: Vec<Literal> = outcome
                .assign
                .iter()
                .filter_map(|(target, value)| {
                    self.targets
                        .get(*target)
                        .map(|atom| Literal::new(*atom, *value))
                })
                .collect();
            (outcome.prob, literals)
        });
        Distribution::from_outcomes(outcomes)
    }
}

/// A schema instance with every parameter bound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundAction {
    pub name: String,
    pub schema: SchemaId,
    pub args: Vec<ObjectId>,
    pub duration: u32,
    pub preconditions: Vec<(Timing, Literal)>,
    pub effects: Vec<(EffectTiming, Literal)>,
    pub groups: Vec<EffectGroup>,
    pub resources: BTreeSet<AtomId>,
    pub combinable: bool,
}

impl GroundAction {
    pub(crate) fn preconditions_at(&self, timings: &[Timing]) -> Vec<Literal> {
        self.preconditions
            .iter()
            .filter(|(timing, _)| timings.contains(timing))
            .map(|(_, literal)| *literal)
            .collect()
    }

    pub(crate) fn effects_at(&self, timing: EffectTiming) -> Vec<Literal> {
        self.effects
            .iter()
            .filter(|(at, _)| *at == timing)
            .map(|(_, literal)| *literal)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundProblem {
    pub core: ProblemCore,
    pub actions: Vec<GroundAction>,
}

impl GroundProblem {
    pub fn with_deadline(mut self, deadline: u32) -> Self {
        self.core.deadline = deadline;
        self
    }
}

/// A single instantaneous event: preconditions, deterministic effects, then groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstantAction {
    pub name: String,
    pub preconditions: Vec<Literal>,
    pub effects: Vec<Literal>,
    pub groups: Vec<EffectGroup>,
}

/// A durative action rewritten as a start/end event pair `duration` ticks apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitAction {
    pub name: String,
    pub start: InstantAction,
    pub end: InstantAction,
    pub duration: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConvertedAction {
    Instant {
        action: InstantAction,
        resources: BTreeSet<AtomId>,
        combinable: bool,
    },
    Split {
        action: SplitAction,
        resources: BTreeSet<AtomId>,
        combinable: bool,
    },
}

impl ConvertedAction {
    pub fn name(&self) -> &str {
        match self {
            ConvertedAction::Instant { action, .. } => &action.name,
            ConvertedAction::Split { action, .. } => &action.name,
        }
    }

    pub fn resources(&self) -> &BTreeSet<AtomId> {
        match self {
            ConvertedAction::Instant { resources, .. } | ConvertedAction::Split { resources, .. } => {
                resources
            }
        }
    }

    pub fn combinable(&self) -> bool {
        match self {
            ConvertedAction::Instant { combinable, .. } | ConvertedAction::Split { combinable, .. } => {
                *combinable
            }
        }
    }

    /// Time the action occupies as one macro step; instantaneous actions count one tick.
    pub fn span(&self) -> u32 {
        match self {
            ConvertedAction::Instant { .. } => 1,
            ConvertedAction::Split { action, .. } => action.duration.max(1),
        }
    }

    /// The event applied when the action begins.
    pub fn start_event(&self) -> &InstantAction {
        match self {
            ConvertedAction::Instant { action, .. } => action,
            ConvertedAction::Split { action, .. } => &action.start,
        }
    }

    pub fn end_event(&self) -> Option<&InstantAction> {
        match self {
            ConvertedAction::Instant { .. } => None,
            ConvertedAction::Split { action, .. } => Some(&action.end),
        }
    }

    /// Number of instantaneous events the action contributes.
    pub fn event_count(&self) -> usize {
        match self {
            ConvertedAction::Instant { .. } => 1,
            ConvertedAction::Split { .. } => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvertedProblem {
    pub core: ProblemCore,
    pub actions: Vec<ConvertedAction>,
}

impl ConvertedProblem {
    pub fn with_deadline(mut self, deadline: u32) -> Self {
        self.core.deadline = deadline;
        self
    }

    /// Two events per split action, one per instantaneous action.
    pub fn instantaneous_action_count(&self) -> usize {
        self.actions.iter().map(ConvertedAction::event_count).sum()
    }

    pub fn action_by_name(&self, name: &str) -> Option<usize> {
        self.actions.iter().position(|action| action.name() == name)
    }
}

/// Two resource-disjoint converted actions executed in the same step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinationAction {
    pub name: String,
    /// Indices into the retained single actions, lower first.
    pub parts: [usize; 2],
    pub resources: BTreeSet<AtomId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinationProblem {
    pub core: ProblemCore,
    pub singles: Vec<ConvertedAction>,
    pub combinations: Vec<CombinationAction>,
}

impl CombinationProblem {
    pub fn with_deadline(mut self, deadline: u32) -> Self {
        self.core.deadline = deadline;
        self
    }

    pub fn action_count(&self) -> usize {
        self.singles.len() + self.combinations.len()
    }
}
