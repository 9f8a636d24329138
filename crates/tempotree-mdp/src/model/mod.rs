//! Authoring-side domain model: typed objects, fluents, action schemas and laws.

mod domain;
mod law;
mod schema;
mod universe;

pub use domain::{Domain, DomainBuilder, DomainKind, GroundingMap};
pub use law::{Distribution, LawCase, OutcomeSpec, ProbabilityLaw, StateView};
pub use schema::{
    ActionSchema, Condition, Effect, EffectTiming, FluentTemplate, ProbabilisticEffect, Term, Timing,
};
pub use universe::{FluentDecl, ObjectDecl, TypeDecl, Universe};

pub(crate) use universe::render;
