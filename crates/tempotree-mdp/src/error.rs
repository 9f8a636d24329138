use thiserror::Error;

#[derive(Debug, Error)]
/// Error type for domain authoring, compilation, MDP construction, and cache IO.
pub enum MdpError {
    #[error("failed to access file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to (de)serialize YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("unknown type '{name}'")]
    UnknownType { name: String },

    #[error("unknown object '{name}'")]
    UnknownObject { name: String },

    #[error("unknown fluent '{name}'")]
    UnknownFluent { name: String },

    #[error("unknown action schema '{name}'")]
    UnknownSchema { name: String },

    #[error("unknown domain '{name}'; expected one of: {known}")]
    UnknownDomain { name: String, known: String },

    #[error("duplicate {kind} name '{name}'")]
    DuplicateName { kind: &'static str, name: String },

    #[error("fluent '{fluent}' used with a mismatching signature: {detail}")]
    SignatureMismatch { fluent: String, detail: String },

    #[error(
        "schema '{schema}' parameter '{parameter}' expects type '{expected}', got object '{object}' of type '{found}'"
    )]
    TypeMismatch {
        schema: String,
        parameter: String,
        expected: String,
        object: String,
        found: String,
    },

    #[error("schema '{schema}' takes {expected} parameters, grounding tuple has {found}")]
    ArityMismatch {
        schema: String,
        expected: usize,
        found: usize,
    },

    #[error("schema '{schema}' references parameter {index} which it does not declare")]
    UnboundParameter { schema: String, index: usize },

    #[error(
        "schema '{schema}' probabilistic group {group} assigns target {target} but has only {targets} targets"
    )]
    InvalidOutcomeTarget {
        schema: String,
        group: usize,
        target: usize,
        targets: usize,
    },

    #[error("schema '{schema}' has no probabilistic group {group}")]
    UnknownEffectGroup { schema: String, group: usize },

    #[error(
        "probabilities of action '{action}', group {group} must sum to 1 within {tolerance}, got {sum}"
    )]
    MalformedDistribution {
        action: String,
        group: usize,
        sum: f64,
        tolerance: f64,
    },

    #[error("invalid probability {value} in action '{action}', group {group}")]
    InvalidProbability {
        action: String,
        group: usize,
        value: f64,
    },

    #[error("discount factor must be within [0, 1], got {value}")]
    InvalidDiscount { value: f64 },

    #[error("invalid run configuration: {0}")]
    InvalidConfig(String),
}
