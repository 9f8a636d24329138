use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{AtomId, FluentId, ObjectId};

/// A fluent bound to a concrete object tuple.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GroundFluent {
    pub fluent: FluentId,
    pub args: Vec<ObjectId>,
}

impl GroundFluent {
    pub fn new(fluent: FluentId, args: impl Into<Vec<ObjectId>>) -> Self {
        Self {
            fluent,
            args: args.into(),
        }
    }
}

/// A required or assigned value of one atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Literal {
    pub atom: AtomId,
    pub value: bool,
}

impl Literal {
    pub fn new(atom: AtomId, value: bool) -> Self {
        Self { atom, value }
    }
}

/// Interns ground fluents into dense, stable `AtomId`s.
///
/// Serialized as the plain list of fluents; the reverse index is rebuilt on load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<GroundFluent>", into = "Vec<GroundFluent>")]
pub struct AtomTable {
    atoms: Vec<GroundFluent>,
    index: HashMap<GroundFluent, AtomId>,
}

impl AtomTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the fluent if needed and return its atom.
    pub fn intern(&mut self, fluent: GroundFluent) -> AtomId {
        if let Some(atom) = self.index.get(&fluent) {
            return *atom;
        }

        let atom = AtomId::from(self.atoms.len());
        self.atoms.push(fluent.clone());
        self.index.insert(fluent, atom);
        atom
    }

    pub fn get(&self, atom: AtomId) -> Option<&GroundFluent> {
        self.atoms.get(atom.index())
    }

    /// Atom of an already interned fluent. Fluents never interned are always false.
    pub fn lookup(&self, fluent: &GroundFluent) -> Option<AtomId> {
        self.index.get(fluent).copied()
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (AtomId, &GroundFluent)> {
        self.atoms
            .iter()
            .enumerate()
            .map(|(i, fluent)| (AtomId::from(i), fluent))
    }
}

impl From<Vec<GroundFluent>> for AtomTable {
    fn from(atoms: Vec<GroundFluent>) -> Self {
        let mut table = AtomTable::new();
        for fluent in atoms {
            table.intern(fluent);
        }
        table
    }
}

impl From<AtomTable> for Vec<GroundFluent> {
    fn from(table: AtomTable) -> Self {
        table.atoms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_stable_and_survives_serialization() {
        let mut table = AtomTable::new();
        let a = table.intern(GroundFluent::new(FluentId::from(0), vec![ObjectId::from(1)]));
        let b = table.intern(GroundFluent::new(FluentId::from(0), vec![ObjectId::from(2)]));
        let again = table.intern(GroundFluent::new(FluentId::from(0), vec![ObjectId::from(1)]));

        assert_eq!(a, again);
        assert_ne!(a, b);
        assert_eq!(table.len(), 2);

        let yaml = serde_yaml::to_string(&table).expect("serialize");
        let restored: AtomTable = serde_yaml::from_str(&yaml).expect("deserialize");
        assert_eq!(
            restored.lookup(&GroundFluent::new(FluentId::from(0), vec![ObjectId::from(2)])),
            Some(b)
        );
        assert!(
            restored
                .lookup(&GroundFluent::new(FluentId::from(1), Vec::new()))
                .is_none()
        );
    }
}
