use std::collections::BTreeSet;

use crate::AtomId;

/// A split action waiting for its end event.
///
/// Field order makes the derived ordering `(ticks_left, action)`, which is
/// the order due end events fire in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InFlight {
    pub ticks_left: u32,
    /// Index of the converted action.
    pub action: usize,
}

/// Immutable MDP state: true atoms, remaining time and the agenda of running actions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct State {
    atoms: BTreeSet<AtomId>,
    remaining: u32,
    agenda: Vec<InFlight>,
    failed: bool,
}

impl State {
    pub(crate) fn new(atoms: BTreeSet<AtomId>, remaining: u32, mut agenda: Vec<InFlight>) -> Self {
        agenda.sort_unstable();
        Self {
            atoms,
            remaining,
            agenda,
            failed: false,
        }
    }

    /// The absorbing state entered when a transition would overrun the deadline.
    pub fn failure() -> Self {
        Self {
            atoms: BTreeSet::new(),
            remaining: 0,
            agenda: Vec::new(),
            failed: true,
        }
    }

    pub fn atoms(&self) -> &BTreeSet<AtomId> {
        &self.atoms
    }

    pub fn holds(&self, atom: AtomId) -> bool {
        self.atoms.contains(&atom)
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Running split actions in firing order.
    pub fn agenda(&self) -> &[InFlight] {
        &self.agenda
    }

    pub fn is_failure(&self) -> bool {
        self.failed
    }

    pub fn in_flight(&self, action: usize) -> bool {
        self.agenda.iter().any(|entry| entry.action == action)
    }
}
