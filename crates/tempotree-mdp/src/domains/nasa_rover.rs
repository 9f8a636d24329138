use crate::{
    ActionSchema, Domain, DomainBuilder, DomainKind, EffectTiming, FluentId, FluentTemplate,
    MdpError, ObjectId, OutcomeSpec, ProbabilityLaw, SchemaId, Timing, TypeId,
};

/// Sampling outcome: full success, failed sample that frees the hand, or nothing.
fn sample_law(success: f64, release: f64, nothing: f64) -> ProbabilityLaw {
    ProbabilityLaw::fixed(vec![
        OutcomeSpec::new(success, [(0, true), (1, true), (2, true), (3, false)]),
        OutcomeSpec::new(release, [(3, false), (2, true)]),
        OutcomeSpec::unchanged(nothing),
    ])
}

fn names(prefix: &str, count: u32) -> Vec<String> {
    (0..count).map(|i| format!("{prefix}{i}")).collect()
}

struct Fluents {
    have_rock_analysis: FluentId,
    communicated_rock_data: FluentId,
    full: FluentId,
    ready_to_drop: FluentId,
    calibrated: FluentId,
    have_image: FluentId,
    communicated_image_data: FluentId,
    store_of: FluentId,
    on_board: FluentId,
    free_h: FluentId,
    free_s: FluentId,
    good: FluentId,
    hand_of: FluentId,
    ready: FluentId,
    free_c: FluentId,
}

struct Types {
    rover: TypeId,
    store: TypeId,
    camera: TypeId,
    objective: TypeId,
    rock: TypeId,
    hand: TypeId,
}

/// Rovers sampling rocks and imaging objectives, then sending the data home.
///
/// Each rover owns two stores, two hands (the even one good), one camera and
/// one objective, and is responsible for two rocks. `object_amount` is the
/// rover count. Actions are grounded only for the objects a rover owns.
pub fn nasa_rover(kind: DomainKind, deadline: u32, object_amount: u32) -> Result<Domain, MdpError> {
    let n = object_amount;
    let mut builder = DomainBuilder::new("nasa_rover", kind);

    let ty = Types {
        rover: builder.user_type("Rover")?,
        store: builder.user_type("Store")?,
        camera: builder.user_type("Camera")?,
        objective: builder.user_type("Objective")?,
        rock: builder.user_type("Rock")?,
        hand: builder.user_type("Hand")?,
    };

    let rovers = builder.objects(names("r", n), ty.rover)?;
    let stores = builder.objects(names("s", 2 * n), ty.store)?;
    let cameras = builder.objects(names("c", n), ty.camera)?;
    let objectives = builder.objects(names("o", n), ty.objective)?;
    let rocks = builder.objects(names("x", 2 * n), ty.rock)?;
    let hands = builder.objects(names("h", 2 * n), ty.hand)?;

    let f = Fluents {
        have_rock_analysis: builder.fluent("have_rock_analysis", &[ty.rover, ty.rock], false)?,
        communicated_rock_data: builder.fluent("communicated_rock_data", &[ty.rock], false)?,
        full: builder.fluent("full", &[ty.store], false)?,
        ready_to_drop: builder.fluent("ready_to_drop", &[ty.store], false)?,
        calibrated: builder.fluent("calibrated", &[ty.camera, ty.objective], false)?,
        have_image: builder.fluent("have_image", &[ty.rover, ty.objective], false)?,
        communicated_image_data: builder.fluent("communicated_image_data", &[ty.objective], false)?,
        store_of: builder.fluent("store_of", &[ty.store, ty.rover], false)?,
        on_board: builder.fluent("on_board", &[ty.camera, ty.rover], false)?,
        free_h: builder.fluent("free_h", &[ty.hand], false)?,
        free_s: builder.fluent("free_s", &[ty.store], true)?,
        good: builder.fluent("good", &[ty.hand], false)?,
        hand_of: builder.fluent("hand_of", &[ty.hand, ty.rover], false)?,
        ready: builder.fluent("ready", &[ty.hand, ty.rock], false)?,
        free_c: builder.fluent("free_c", &[ty.camera], false)?,
    };

    for (i, rover) in rovers.iter().enumerate() {
        for store in &stores[2 * i..2 * i + 2] {
            builder.initial(f.store_of, &[*store, *rover], true);
        }
        for hand in &hands[2 * i..2 * i + 2] {
            builder.initial(f.hand_of, &[*hand, *rover], true);
        }
        builder.initial(f.on_board, &[cameras[i], *rover], true);
    }
    for (i, hand) in hands.iter().enumerate() {
        builder.initial(f.free_h, &[*hand], true);
        if i % 2 == 0 {
            builder.initial(f.good, &[*hand], true);
        }
    }
    for camera in &cameras {
        builder.initial(f.free_c, &[*camera], true);
    }

    let regular = kind != DomainKind::Combination;
    let sample_good = builder.action(sample_schema(&ty, &f, "sample_rock_good", 5, true, regular))?;
    let sample = builder.action(sample_schema(&ty, &f, "sample_rock", 10, false, regular))?;
    let drop_store = builder.action(drop_schema(&ty, &f))?;
    let calibrate = builder.action(calibrate_schema(&ty, &f))?;
    let turn_on_dropping = builder.action(turn_on_dropping_schema(&ty, &f, regular))?;
    let turn_on_good_hand = builder.action(turn_on_good_hand_schema(&ty, &f, regular))?;
    let turn_on_hand = builder.action(turn_on_hand_schema(&ty, &f))?;
    let take_image = builder.action(take_image_schema(&ty, &f))?;
    let communicate_rock = builder.action(communicate_schema(
        "communicate_rock_data",
        ty.rover,
        ty.rock,
        f.have_rock_analysis,
        f.communicated_rock_data,
    ))?;
    let communicate_image = builder.action(communicate_schema(
        "communicate_image_data",
        ty.rover,
        ty.objective,
        f.have_image,
        f.communicated_image_data,
    ))?;

    let owned = |items: &[ObjectId], i: usize| items[2 * i..2 * i + 2].to_vec();
    let mut rsxh = Vec::new();
    let mut rx = Vec::new();
    let mut hx = Vec::new();
    let mut co = Vec::new();
    let mut roc = Vec::new();
    let mut ro = Vec::new();
    for (i, rover) in rovers.iter().enumerate() {
        let my_rocks = owned(&rocks, i);
        let my_hands = owned(&hands, i);
        for store in owned(&stores, i) {
            for rock in &my_rocks {
                for hand in &my_hands {
                    rsxh.push(vec![*rover, store, *rock, *hand]);
                }
            }
        }
        for rock in &my_rocks {
            rx.push(vec![*rover, *rock]);
        }
        for hand in &my_hands {
            for rock in &my_rocks {
                hx.push(vec![*hand, *rock]);
            }
        }
        co.push(vec![cameras[i], objectives[i]]);
        roc.push(vec![*rover, objectives[i], cameras[i]]);
        ro.push(vec![*rover, objectives[i]]);
    }
    let single_stores: Vec<Vec<ObjectId>> = stores.iter().map(|s| vec![*s]).collect();

    let grounding: [(SchemaId, &Vec<Vec<ObjectId>>); 10] = [
        (sample_good, &rsxh),
        (sample, &rsxh),
        (drop_store, &single_stores),
        (calibrate, &co),
        (turn_on_dropping, &single_stores),
        (turn_on_good_hand, &hx),
        (turn_on_hand, &hx),
        (take_image, &roc),
        (communicate_rock, &rx),
        (communicate_image, &ro),
    ];
    for (schema, tuples) in grounding {
        builder.grounding(schema, tuples.clone());
    }

    for rock in &rocks {
        builder.goal(f.communicated_rock_data, &[*rock], true);
    }
    for objective in &objectives {
        builder.goal(f.communicated_image_data, &[*objective], true);
    }
    builder.deadline(deadline);
    builder.size_params(vec![object_amount]);
    builder.build()
}

fn sample_schema(ty: &Types, f: &Fluents, name: &str, duration: u32, good_hand: bool, regular: bool) -> ActionSchema {
    let mut schema = ActionSchema::new(name, duration);
    let rover = schema.parameter("rover", ty.rover);
    let store = schema.parameter("store", ty.store);
    let rock = schema.parameter("rock", ty.rock);
    let hand = schema.parameter("hand", ty.hand);

    schema
        .precondition(Timing::Overall, FluentTemplate::new(f.store_of, [store, rover]), true)
        .precondition(Timing::Overall, FluentTemplate::new(f.full, [store]), false)
        .precondition(Timing::Overall, FluentTemplate::new(f.ready_to_drop, [store]), false)
        .precondition(Timing::Overall, FluentTemplate::new(f.ready, [hand, rock]), true)
        .precondition(Timing::Overall, FluentTemplate::new(f.hand_of, [hand, rover]), true)
        .precondition(Timing::Overall, FluentTemplate::new(f.good, [hand]), good_hand);
    if regular {
        schema.uses(FluentTemplate::new(f.free_s, [store]));
    }

    let law = if good_hand {
        sample_law(0.9, 0.051, 0.049)
    } else {
        sample_law(0.7, 0.05, 0.25)
    };
    schema.probabilistic(
        vec![
            FluentTemplate::new(f.full, [store]),
            FluentTemplate::new(f.have_rock_analysis, [rover, rock]),
            FluentTemplate::new(f.free_h, [hand]),
            FluentTemplate::new(f.ready, [hand, rock]),
        ],
        law,
    );
    schema
}

fn drop_schema(ty: &Types, f: &Fluents) -> ActionSchema {
    let mut schema = ActionSchema::new("drop", 3);
    let store = schema.parameter("store", ty.store);
    schema
        .precondition(Timing::Overall, FluentTemplate::new(f.ready_to_drop, [store]), true)
        .effect(EffectTiming::End, FluentTemplate::new(f.full, [store]), false)
        .effect(EffectTiming::End, FluentTemplate::new(f.ready_to_drop, [store]), false);
    schema
}

fn calibrate_schema(ty: &Types, f: &Fluents) -> ActionSchema {
    let mut schema = ActionSchema::new("calibrate", 4);
    let camera = schema.parameter("camera", ty.camera);
    let objective = schema.parameter("objective", ty.objective);
    schema.effect(EffectTiming::End, FluentTemplate::new(f.calibrated, [camera, objective]), true);
    schema
}

fn turn_on_dropping_schema(ty: &Types, f: &Fluents, regular: bool) -> ActionSchema {
    let mut schema = ActionSchema::new("turn_on_dropping", 1);
    let store = schema.parameter("store", ty.store);
    if regular {
        schema.uses(FluentTemplate::new(f.free_s, [store]));
    }
    schema.effect(EffectTiming::End, FluentTemplate::new(f.ready_to_drop, [store]), true);
    schema
}

/// Under [`DomainKind::Combination`] the hand is claimed at the end instead of the start.
fn turn_on_good_hand_schema(ty: &Types, f: &Fluents, regular: bool) -> ActionSchema {
    let mut schema = ActionSchema::new("turn_on_good_hand", 1);
    let hand = schema.parameter("hand", ty.hand);
    let rock = schema.parameter("rock", ty.rock);
    let free_hand = FluentTemplate::new(f.free_h, [hand]);

    schema.precondition(Timing::Overall, FluentTemplate::new(f.good, [hand]), true);
    if regular {
        schema
            .precondition(Timing::Start, free_hand.clone(), true)
            .effect(EffectTiming::Start, free_hand, false);
    } else {
        schema
            .precondition(Timing::Overall, free_hand.clone(), true)
            .effect(EffectTiming::End, free_hand, false);
    }
    schema.effect(EffectTiming::End, FluentTemplate::new(f.ready, [hand, rock]), true);
    schema
}

fn turn_on_hand_schema(ty: &Types, f: &Fluents) -> ActionSchema {
    let mut schema = ActionSchema::instantaneous("turn_on_hand");
    let hand = schema.parameter("hand", ty.hand);
    let rock = schema.parameter("rock", ty.rock);
    schema
        .precondition(Timing::Start, FluentTemplate::new(f.free_h, [hand]), true)
        .precondition(Timing::Start, FluentTemplate::new(f.good, [hand]), false)
        .probabilistic(
            vec![
                FluentTemplate::new(f.free_h, [hand]),
                FluentTemplate::new(f.ready, [hand, rock]),
            ],
            ProbabilityLaw::fixed(vec![
                OutcomeSpec::new(0.8, [(0, false), (1, true)]),
                OutcomeSpec::unchanged(0.2),
            ]),
        );
    schema
}

fn take_image_schema(ty: &Types, f: &Fluents) -> ActionSchema {
    let mut schema = ActionSchema::new("take_image", 6);
    let rover = schema.parameter("rover", ty.rover);
    let objective = schema.parameter("objective", ty.objective);
    let camera = schema.parameter("camera", ty.camera);
    let calibrated = FluentTemplate::new(f.calibrated, [camera, objective]);

    schema
        .precondition(Timing::Overall, calibrated.clone(), true)
        .precondition(Timing::Overall, FluentTemplate::new(f.on_board, [camera, rover]), true)
        .probabilistic(
            vec![FluentTemplate::new(f.have_image, [rover, objective]), calibrated],
            ProbabilityLaw::fixed(vec![
                OutcomeSpec::new(0.9, [(0, true), (1, false)]),
                OutcomeSpec::new(0.1, [(0, false), (1, false)]),
            ]),
        );
    schema
}

/// Transmit data about `subject` that `rover` holds; succeeds with probability 0.6.
fn communicate_schema(
    name: &str,
    rover_ty: TypeId,
    subject_ty: TypeId,
    have: FluentId,
    communicated: FluentId,
) -> ActionSchema {
    let mut schema = ActionSchema::new(name, 2);
    let rover = schema.parameter("rover", rover_ty);
    let subject = schema.parameter("subject", subject_ty);
    schema
        .precondition(Timing::Overall, FluentTemplate::new(have, [rover, subject]), true)
        .probabilistic(
            vec![FluentTemplate::new(communicated, [subject])],
            ProbabilityLaw::fixed(vec![
                OutcomeSpec::new(0.6, [(0, true)]),
                OutcomeSpec::new(0.4, [(0, false)]),
            ]),
        );
    schema
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn good_hand_claim_moves_to_end_under_combination() {
        let regular = nasa_rover(DomainKind::Regular, 40, 1).expect("domain");
        let combined = nasa_rover(DomainKind::Combination, 40, 1).expect("domain");
        let id = regular.schema_id("turn_on_good_hand").expect("schema");

        let timings = |domain: &Domain| -> Vec<EffectTiming> {
            domain.schema(id).expect("schema").effects.iter().map(|e| e.timing).collect()
        };
        assert_eq!(timings(&regular), vec![EffectTiming::Start, EffectTiming::End]);
        assert_eq!(timings(&combined), vec![EffectTiming::End, EffectTiming::End]);

        let dropping = regular.schema_id("turn_on_dropping").expect("schema");
        assert_eq!(regular.schema(dropping).expect("schema").resources.len(), 1);
        assert!(combined.schema(dropping).expect("schema").resources.is_empty());
    }

    #[test]
    fn grounding_map_covers_every_schema() {
        let domain = nasa_rover(DomainKind::Regular, 40, 2).expect("domain");
        assert_eq!(domain.grounding_map().map(|m| m.len()), Some(10));
        assert_eq!(domain.size_params(), &[2]);
        assert_eq!(domain.goals().len(), 6);
    }
}
