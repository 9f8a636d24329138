use serde::{Deserialize, Serialize};

use crate::{FluentTemplate, GroundFluent, Literal, MdpError, ObjectId};

/// Truth of ground fluents in some state.
pub trait StateView {
    fn holds(&self, fluent: &GroundFluent) -> bool;
}

/// One outcome of a law: its probability and the values it assigns to group targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeSpec {
    pub prob: f64,
    /// `(target index, value)` pairs; an empty list leaves every target unchanged.
    pub assign: Vec<(usize, bool)>,
}

impl OutcomeSpec {
    pub fn new(prob: f64, assign: impl Into<Vec<(usize, bool)>>) -> Self {
        Self {
            prob,
            assign: assign.into(),
        }
    }

    /// An outcome that changes nothing.
    pub fn unchanged(prob: f64) -> Self {
        Self {
            prob,
            assign: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LawCase {
    /// Every literal must hold, after binding, for the case to apply.
    pub when: Vec<(FluentTemplate, bool)>,
    pub outcomes: Vec<OutcomeSpec>,
}

/// Explicit strategy producing the outcome distribution of a probabilistic group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbabilityLaw {
    Fixed(Vec<OutcomeSpec>),
    /// First matching case wins, `otherwise` applies when none match.
    Conditional {
        cases: Vec<LawCase>,
        otherwise: Vec<OutcomeSpec>,
    },
}

impl ProbabilityLaw {
    pub fn fixed(outcomes: Vec<OutcomeSpec>) -> Self {
        ProbabilityLaw::Fixed(outcomes)
    }

    /// Outcome list selected for `state` under `bindings`.
    pub fn select<V: StateView + ?Sized>(&self, state: &V, bindings: &[ObjectId]) -> &[OutcomeSpec] {
        match self {
            ProbabilityLaw::Fixed(outcomes) => outcomes.as_slice(),
            ProbabilityLaw::Conditional { cases, otherwise } => cases
                .iter()
                .find(|case| {
                    case.when.iter().all(|(template, value)| {
                        template
                            .bind(bindings)
                            .is_some_and(|ground| state.holds(&ground) == *value)
                    })
                })
                .map(|case| case.outcomes.as_slice())
                .unwrap_or(otherwise.as_slice()),
        }
    }

    /// Every outcome list the law can produce.
    pub fn branches(&self) -> Vec<&[OutcomeSpec]> {
        match self {
            ProbabilityLaw::Fixed(outcomes) => vec![outcomes.as_slice()],
            ProbabilityLaw::Conditional { cases, otherwise } => cases
                .iter()
                .map(|case| case.outcomes.as_slice())
                .chain(std::iter::once(otherwise.as_slice()))
                .collect(),
        }
    }

    pub(crate) fn templates(&self) -> Vec<&FluentTemplate> {
        match self {
            ProbabilityLaw::Fixed(_) => Vec::new(),
            ProbabilityLaw::Conditional { cases, .. } => cases
                .iter()
                .flat_map(|case| case.when.iter().map(|(template, _)| template))
                .collect(),
        }
    }

    /// Largest target index any outcome assigns.
    pub(crate) fn max_target(&self) -> Option<usize> {
        self.branches()
            .into_iter()
            .flat_map(|outcomes| outcomes.iter())
            .flat_map(|outcome| outcome.assign.iter().map(|(target, _)| *target))
            .max()
    }

    /// Every branch must hold finite non-negative probabilities summing to 1.
    pub fn check(&self, action: &str, group: usize, tolerance: f64) -> Result<(), MdpError> {
        for outcomes in self.branches() {
            let mut sum = 0.0_f64;
            for outcome in outcomes {
                if !outcome.prob.is_finite() || outcome.prob < 0.0 {
                    return Err(MdpError::InvalidProbability {
                        action: action.to_string(),
                        group,
                        value: outcome.prob,
                    });
                }
                sum += outcome.prob;
            }

            if (sum - 1.0).abs() > tolerance {
                return Err(MdpError::MalformedDistribution {
                    action: action.to_string(),
                    group,
                    sum,
                    tolerance,
                });
            }
        }
        Ok(())
    }
}

/// Discrete distribution over sets of literal assignments.
#[derive(Debug, Clone, PartialEq)]
pub struct Distribution {
    outcomes: Vec<(f64, Vec<Literal>)>,
}

impl Distribution {
    /// The distribution with one certain, empty outcome.
    pub fn certain() -> Self {
        Self {
            outcomes: vec![(1.0, Vec::new())],
        }
    }

    /// Build from raw outcomes, dropping zero-probability entries.
    pub fn from_outcomes(outcomes: impl IntoIterator<Item = (f64, Vec<Literal>)>) -> Self {
        Self {
            outcomes: outcomes.into_iter().filter(|(prob, _)| *prob > 0.0).collect(),
        }
    }

    pub fn outcomes(&self) -> &[(f64, Vec<Literal>)] {
        &self.outcomes
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.outcomes.iter().map(|(prob, _)| prob).sum()
    }

    /// Joint distribution of two independent groups; `other`'s assignments apply last.
    pub fn product(&self, other: &Distribution) -> Distribution {
        let mut outcomes = Vec::with_capacity(self.outcomes.len() * other.outcomes.len());
        for (p, left) in &self.outcomes {
            for (q, right) in &other.outcomes {
                let mut joint = left.clone();
                joint.extend_from_slice(right);
                outcomes.push((p * q, joint));
            }
        }
        Distribution { outcomes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AtomId, FluentId, Term};

    struct Only(Vec<GroundFluent>);

    impl StateView for Only {
        fn holds(&self, fluent: &GroundFluent) -> bool {
            self.0.contains(fluent)
        }
    }

    fn push_law() -> ProbabilityLaw {
        let out = FluentId::from(0);
        let under = FluentId::from(1);
        ProbabilityLaw::Conditional {
            cases: vec![
                LawCase {
                    when: vec![(FluentTemplate::nullary(out), true)],
                    outcomes: vec![OutcomeSpec::new(1.0, [(0, true)]), OutcomeSpec::unchanged(0.0)],
                },
                LawCase {
                    when: vec![(FluentTemplate::new(under, [Term::Param(0)]), true)],
                    outcomes: vec![OutcomeSpec::new(0.3, [(0, true)]), OutcomeSpec::unchanged(0.7)],
                },
            ],
            otherwise: vec![OutcomeSpec::new(0.1, [(0, true)]), OutcomeSpec::unchanged(0.9)],
        }
    }

    #[test]
    fn conditional_law_picks_first_matching_case() {
        let law = push_law();
        let rock = ObjectId::from(5);
        let under = GroundFluent::new(FluentId::from(1), vec![rock]);

        assert_eq!(law.select(&Only(vec![]), &[rock])[0].prob, 0.1);
        assert_eq!(law.select(&Only(vec![under.clone()]), &[rock])[0].prob, 0.3);
        let out = GroundFluent::new(FluentId::from(0), Vec::new());
        assert_eq!(law.select(&Only(vec![out, under]), &[rock])[0].prob, 1.0);
        assert!(law.check("push", 0, 1e-9).is_ok());
    }

    #[test]
    fn check_rejects_short_and_negative_branches() {
        let short = ProbabilityLaw::fixed(vec![OutcomeSpec::unchanged(0.1), OutcomeSpec::unchanged(0.85)]);
        assert!(matches!(
            short.check("search", 0, 1e-9),
            Err(MdpError::MalformedDistribution { .. })
        ));

        let negative = ProbabilityLaw::fixed(vec![OutcomeSpec::unchanged(1.5), OutcomeSpec::unchanged(-0.5)]);
        assert!(matches!(
            negative.check("search", 0, 1e-9),
            Err(MdpError::InvalidProbability { .. })
        ));
    }

    #[test]
    fn product_multiplies_independent_groups() {
        let a = AtomId::from(0);
        let b = AtomId::from(1);
        let left = Distribution::from_outcomes([
            (0.4, vec![Literal::new(a, true)]),
            (0.6, vec![Literal::new(a, false)]),
        ]);
        let right = Distribution::from_outcomes([(0.5, vec![Literal::new(b, true)]), (0.5, Vec::new())]);

        let joint = left.product(&right);
        assert_eq!(joint.len(), 4);
        assert!((joint.total() - 1.0).abs() < 1e-12);
        assert_eq!(joint.outcomes()[0].1, vec![Literal::new(a, true), Literal::new(b, true)]);
    }
}
