use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::{AtomId, CombinationAction, CombinationProblem, ConvertedProblem};

/// True when the two resource sets share no atom.
pub fn resources_disjoint(a: &BTreeSet<AtomId>, b: &BTreeSet<AtomId>) -> bool {
    a.is_disjoint(b)
}

/// Pair every two resource-disjoint converted actions into a combination action.
///
/// Pairs that overlap in a resource are skipped. Single actions are retained
/// unchanged so a planner can still act alone.
pub fn combine(problem: &ConvertedProblem) -> CombinationProblem {
    let singles = problem.actions.clone();
    let mut combinations = Vec::new();
    let mut conflicts = 0_usize;

    for (i, first) in singles.iter().enumerate() {
        for (j, second) in singles.iter().enumerate().skip(i + 1) {
            if !resources_disjoint(first.resources(), second.resources()) {
                conflicts += 1;
                continue;
            }
            combinations.push(CombinationAction {
                name: format!("{}|{}", first.name(), second.name()),
                parts: [i, j],
                resources: first.resources().union(second.resources()).copied().collect(),
            });
        }
    }

    info!(
        domain = %problem.core.name,
        singles = singles.len(),
        combinations = combinations.len(),
        conflicts,
        "built combination actions"
    );

    CombinationProblem {
        core: problem.core.clone(),
        singles,
        combinations,
    }
}

/// Drop combinations with a part marked non-combinable, such as a pure rest action.
pub fn drop_uncombinable(problem: CombinationProblem) -> CombinationProblem {
    let CombinationProblem {
        core,
        singles,
        combinations,
    } = problem;

    let before = combinations.len();
    let combinations: Vec<CombinationAction> = combinations
        .into_iter()
        .filter(|combo| {
            combo
                .parts
                .iter()
                .all(|part| singles.get(*part).is_some_and(|action| action.combinable()))
        })
        .collect();

    debug!(dropped = before - combinations.len(), "removed non-combinable combinations");
    CombinationProblem {
        core,
        singles,
        combinations,
    }
}
