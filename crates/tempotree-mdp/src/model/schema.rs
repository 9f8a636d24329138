use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{FluentId, GroundFluent, ObjectId, ProbabilityLaw, TypeId};

/// Argument of a fluent template: a schema parameter by position or a constant object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Term {
    Param(usize),
    Object(ObjectId),
}

impl From<ObjectId> for Term {
    fn from(object: ObjectId) -> Self {
        Term::Object(object)
    }
}

/// A fluent applied to terms, resolved to a [`GroundFluent`] once bindings are known.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FluentTemplate {
    pub fluent: FluentId,
    pub args: Vec<Term>,
}

impl FluentTemplate {
    pub fn new(fluent: FluentId, args: impl Into<Vec<Term>>) -> Self {
        Self {
            fluent,
            args: args.into(),
        }
    }

    pub fn nullary(fluent: FluentId) -> Self {
        Self {
            fluent,
            args: Vec::new(),
        }
    }

    /// Template with only constant arguments.
    pub fn constant(fluent: FluentId, objects: &[ObjectId]) -> Self {
        Self {
            fluent,
            args: objects.iter().copied().map(Term::Object).collect(),
        }
    }

    /// Substitute `bindings` for parameters; `None` when a parameter is out of range.
    pub fn bind(&self, bindings: &[ObjectId]) -> Option<GroundFluent> {
        let args = self
            .args
            .iter()
            .map(|term| match term {
                Term::Param(index) => bindings.get(*index).copied(),
                Term::Object(object) => Some(*object),
            })
            .collect::<Option<Vec<_>>>()?;
        Some(GroundFluent::new(self.fluent, args))
    }

    pub(crate) fn params(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.args
            .iter()
            .enumerate()
            .filter_map(|(position, term)| match term {
                Term::Param(index) => Some((position, *index)),
                Term::Object(_) => None,
            })
    }
}

/// When a precondition must hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timing {
    Start,
    /// Checked at both endpoints; there are no intermediate time points.
    Overall,
    End,
}

/// When a deterministic effect is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectTiming {
    Start,
    End,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub timing: Timing,
    pub fluent: FluentTemplate,
    pub value: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    pub timing: EffectTiming,
    pub fluent: FluentTemplate,
    pub value: bool,
}

/// A group of fluents whose joint assignment is drawn from `law`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbabilisticEffect {
    pub targets: Vec<FluentTemplate>,
    pub law: Arc<ProbabilityLaw>,
}

/// A parameterized durative action template.
///
/// A duration of zero marks an instantaneous action.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionSchema {
    pub name: String,
    pub params: Vec<(String, TypeId)>,
    pub duration: u32,
    pub conditions: Vec<Condition>,
    pub effects: Vec<Effect>,
    pub probabilistic: Vec<ProbabilisticEffect>,
    pub resources: Vec<FluentTemplate>,
    /// False drops every combination built from this action.
    pub combinable: bool,
}

impl ActionSchema {
    pub fn new(name: impl Into<String>, duration: u32) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            duration,
            conditions: Vec::new(),
            effects: Vec::new(),
            probabilistic: Vec::new(),
            resources: Vec::new(),
            combinable: true,
        }
    }

    pub fn instantaneous(name: impl Into<String>) -> Self {
        Self::new(name, 0)
    }

    /// Declare the next parameter and return the term referring to it.
    pub fn parameter(&mut self, name: impl Into<String>, ty: TypeId) -> Term {
        self.params.push((name.into(), ty));
        Term::Param(self.params.len() - 1)
    }

    pub fn precondition(&mut self, timing: Timing, fluent: FluentTemplate, value: bool) -> &mut Self {
        self.conditions.push(Condition {
            timing,
            fluent,
            value,
        });
        self
    }

    pub fn effect(&mut self, timing: EffectTiming, fluent: FluentTemplate, value: bool) -> &mut Self {
        self.effects.push(Effect {
            timing,
            fluent,
            value,
        });
        self
    }

    pub fn probabilistic(&mut self, targets: Vec<FluentTemplate>, law: ProbabilityLaw) -> &mut Self {
        self.probabilistic.push(ProbabilisticEffect {
            targets,
            law: Arc::new(law),
        });
        self
    }

    /// Hold `resource` exclusively for the whole duration.
    ///
    /// Requires it true at start, clears it at start and restores it at end.
    pub fn uses(&mut self, resource: FluentTemplate) -> &mut Self {
        self.precondition(Timing::Start, resource.clone(), true);
        self.effect(EffectTiming::Start, resource.clone(), false);
        self.effect(EffectTiming::End, resource.clone(), true);
        self.resources.push(resource);
        self
    }

    pub fn set_combinable(&mut self, combinable: bool) -> &mut Self {
        self.combinable = combinable;
        self
    }

    /// Every template the schema mentions, law conditions included.
    pub(crate) fn templates(&self) -> impl Iterator<Item = &FluentTemplate> {
        self.conditions
            .iter()
            .map(|c| &c.fluent)
            .chain(self.effects.iter().map(|e| &e.fluent))
            .chain(self.resources.iter())
            .chain(
                self.probabilistic
                    .iter()
                    .flat_map(|group| group.targets.iter().chain(group.law.templates())),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uses_declares_resource_and_its_guard() {
        let free = FluentId::from(0);
        let hands = ObjectId::from(3);
        let mut schema = ActionSchema::new("push", 2);
        schema.uses(FluentTemplate::constant(free, &[hands]));

        assert_eq!(schema.resources.len(), 1);
        assert_eq!(schema.conditions.len(), 1);
        assert_eq!(schema.conditions[0].timing, Timing::Start);
        assert!(schema.conditions[0].value);
        let timings: Vec<_> = schema.effects.iter().map(|e| (e.timing, e.value)).collect();
        assert_eq!(
            timings,
            vec![(EffectTiming::Start, false), (EffectTiming::End, true)]
        );
    }

    #[test]
    fn bind_substitutes_parameters_in_place() {
        let mut schema = ActionSchema::new("move", 1);
        let from = schema.parameter("from", TypeId::from(0));
        let template = FluentTemplate::new(FluentId::from(2), [from, Term::Object(ObjectId::from(9))]);

        let ground = template.bind(&[ObjectId::from(4)]).expect("bound");
        assert_eq!(ground.args, vec![ObjectId::from(4), ObjectId::from(9)]);
        assert!(template.bind(&[]).is_none());
    }
}
