use std::collections::HashMap;

use tempotree_search::StateKey;

use crate::State;

/// Maps MDP states to the dense keys a search tree works with.
#[derive(Debug, Clone, Default)]
pub struct StateInterner {
    states: Vec<State>,
    state_to_key: HashMap<State, StateKey>,
}

impl StateInterner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the state if needed and return a stable dense key.
    pub fn intern(&mut self, state: State) -> StateKey {
        if let Some(key) = self.state_to_key.get(&state) {
            return *key;
        }

        let key = StateKey::from(self.states.len() as u64);
        self.states.push(state.clone());
        self.state_to_key.insert(state, key);
        key
    }

    pub fn get(&self, key: StateKey) -> Option<&State> {
        self.states.get(key.value() as usize)
    }

    pub fn key_of(&self, state: &State) -> Option<StateKey> {
        self.state_to_key.get(state).copied()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
