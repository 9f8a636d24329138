use crate::{
    ActionSchema, Domain, DomainBuilder, DomainKind, EffectTiming, FluentTemplate, MdpError, Timing,
};

/// Fifteen parts, each produced by one durative action with start preconditions
/// on earlier parts. Enough concurrency to finish well inside a 20-tick deadline.
const ACTIONS: &[(&str, u32, &[&str], &str)] = &[
    ("eight", 8, &[], "a"),
    ("four1", 4, &[], "b"),
    ("four2", 4, &["b", "h", "f"], "i"),
    ("two1", 2, &[], "c"),
    ("two2", 2, &["c", "e"], "f"),
    ("two3", 2, &["b", "h", "f"], "j"),
    ("two4", 2, &["j", "l"], "m"),
    ("one1", 1, &[], "d"),
    ("one2", 1, &["d"], "e"),
    ("one3", 1, &["c", "e"], "g"),
    ("one4", 1, &["g"], "h"),
    ("one5", 1, &["b", "h", "f"], "k"),
    ("one6", 1, &["k"], "l"),
    ("one7", 1, &["j", "l"], "n"),
    ("one8", 1, &["n"], "o"),
];

const PARTS: &[&str] = &[
    "a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l", "m", "n", "o",
];

pub fn full_conc(kind: DomainKind, deadline: u32) -> Result<Domain, MdpError> {
    let mut builder = DomainBuilder::new("full_conc", kind);
    let part = builder.user_type("Part")?;
    builder.objects(PARTS.iter().copied(), part)?;
    let got = builder.fluent("got", &[part], false)?;

    for (name, duration, requires, produces) in ACTIONS {
        let mut schema = ActionSchema::new(*name, *duration);
        for required in *requires {
            let object = builder.universe().object_id(required)?;
            schema.precondition(Timing::Start, FluentTemplate::constant(got, &[object]), true);
        }
        let object = builder.universe().object_id(produces)?;
        schema.effect(EffectTiming::End, FluentTemplate::constant(got, &[object]), true);
        builder.action(schema)?;
    }

    for name in PARTS {
        let object = builder.universe().object_id(name)?;
        builder.goal(got, &[object], true);
    }
    builder.deadline(deadline);
    builder.build()
}
