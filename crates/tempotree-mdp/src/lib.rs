//! Compilation of temporal, probabilistic planning domains into MDPs.
//!
//! Domain model → [`ground`] → [`convert`] / [`combine`] → [`Mdp`] → [`plan`].

mod atoms;
mod cache;
mod combine;
mod config;
mod convert;
pub mod domains;
mod error;
mod grounder;
mod ids;
mod mdp;
mod model;
mod pipeline;
mod planner;
mod problem;

pub use atoms::{AtomTable, GroundFluent, Literal};
pub use cache::{CacheKey, CacheStatus, CombinationBundle, load_bundle, load_or_build, save_bundle};
pub use combine::{combine, drop_uncombinable, resources_disjoint};
pub use config::{RunConfig, Solver};
pub use convert::convert;
pub use error::MdpError;
pub use grounder::ground;
pub use ids::{AtomId, FluentId, ObjectId, SchemaId, TypeId};
pub use mdp::{
    ActionRef, InFlight, IntoMdp, Mdp, MdpAction, MdpMode, MdpSimulator, PROB_TOLERANCE, State,
    StateInterner, build,
};
pub use model::{
    ActionSchema, Condition, Distribution, Domain, DomainBuilder, DomainKind, Effect,
    EffectTiming, FluentDecl, FluentTemplate, GroundingMap, LawCase, ObjectDecl, OutcomeSpec,
    ProbabilisticEffect, ProbabilityLaw, StateView, Term, Timing, TypeDecl, Universe,
};
pub use pipeline::{SplitBundle, compile_combination, compile_split};
pub use planner::{EvaluationSummary, PlanError, PlanParams, PlanStatus, Trace, TraceStep, evaluate, plan};
pub use problem::{
    CombinationAction, CombinationProblem, ConvertedAction, ConvertedProblem, EffectGroup,
    GroundAction, GroundProblem, InstantAction, ProblemCore, SplitAction,
};
