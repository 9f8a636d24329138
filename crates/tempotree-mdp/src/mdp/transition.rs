use std::collections::{BTreeSet, HashMap};

use crate::{AtomId, AtomTable, Distribution, GroundFluent, InstantAction, Literal, State, StateView};

/// Atom set viewed through the table that names its atoms.
pub(crate) struct AtomView<'a> {
    pub table: &'a AtomTable,
    pub atoms: &'a BTreeSet<AtomId>,
}

impl StateView for AtomView<'_> {
    fn holds(&self, fluent: &GroundFluent) -> bool {
        self.table
            .lookup(fluent)
            .is_some_and(|atom| self.atoms.contains(&atom))
    }
}

/// One weighted partial successor while a transition is being expanded.
#[derive(Debug, Clone)]
pub(crate) struct Branch {
    pub prob: f64,
    pub atoms: BTreeSet<AtomId>,
}

impl Branch {
    pub fn certain(atoms: BTreeSet<AtomId>) -> Self {
        Self { prob: 1.0, atoms }
    }
}

pub(crate) fn holds_all(atoms: &BTreeSet<AtomId>, literals: &[Literal]) -> bool {
    literals
        .iter()
        .all(|literal| atoms.contains(&literal.atom) == literal.value)
}

fn assign(atoms: &mut BTreeSet<AtomId>, literals: &[Literal]) {
    for literal in literals {
        if literal.value {
            atoms.insert(literal.atom);
        } else {
            atoms.remove(&literal.atom);
        }
    }
}

/// Apply `event` to every branch and fan out over its groups' joint distribution.
///
/// Groups read the branch after the deterministic effects. With `guarded`,
/// branches where the event's preconditions fail pass through unchanged; a
/// dropped end event also skips its resource restore, so the resource stays claimed.
pub(crate) fn apply_event(
    table: &AtomTable,
    branches: Vec<Branch>,
    event: &InstantAction,
    guarded: bool,
) -> Vec<Branch> {
    let mut next = Vec::with_capacity(branches.len());
    for mut branch in branches {
        if guarded && !holds_all(&branch.atoms, &event.preconditions) {
            next.push(branch);
            continue;
        }

        assign(&mut branch.atoms, &event.effects);
        if event.groups.is_empty() {
            next.push(branch);
            continue;
        }

        let view = AtomView {
            table,
            atoms: &branch.atoms,
        };
        let joint = event
            .groups
            .iter()
            .fold(Distribution::certain(), |joint, group| {
                joint.product(&group.distribution(&view))
            });

        for (prob, literals) in joint.outcomes() {
            let mut atoms = branch.atoms.clone();
            assign(&mut atoms, literals);
            next.push(Branch {
                prob: branch.prob * prob,
                atoms,
            });
        }
    }
    next
}

/// Sum the probability of identical successors, keeping first-seen order.
pub(crate) fn merge(outcomes: impl IntoIterator<Item = (f64, State)>) -> Vec<(f64, State)> {
    let mut merged: Vec<(f64, State)> = Vec::new();
    let mut index: HashMap<State, usize> = HashMap::new();

    for (prob, state) in outcomes {
        match index.get(&state) {
            Some(position) => merged[*position].0 += prob,
            None => {
                index.insert(state.clone(), merged.len());
                merged.push((prob, state));
            }
        }
    }
    merged
}
