use crate::{
    ActionSchema, Domain, DomainBuilder, DomainKind, EffectTiming, FluentId, FluentTemplate,
    LawCase, MdpError, ObjectId, OutcomeSpec, ProbabilityLaw, Timing,
};

/// Chance that a physical action leaves the agent tired.
fn tired_law() -> ProbabilityLaw {
    ProbabilityLaw::fixed(vec![
        OutcomeSpec::new(0.4, [(0, true)]),
        OutcomeSpec::new(0.6, [(0, false)]),
    ])
}

/// Chance that a push frees the car, depending on which rock sits under it.
fn push_law(car_out: FluentId, rock_under_car: FluentId, bad: ObjectId, good: ObjectId, odds: [f64; 3]) -> ProbabilityLaw {
    let [p_bad, p_good, p_none] = odds;
    let outcomes = |p: f64| vec![OutcomeSpec::new(p, [(0, true)]), OutcomeSpec::unchanged(1.0 - p)];

    ProbabilityLaw::Conditional {
        cases: vec![
            LawCase {
                when: vec![(FluentTemplate::nullary(car_out), true)],
                outcomes: outcomes(1.0),
            },
            LawCase {
                when: vec![(FluentTemplate::constant(rock_under_car, &[bad]), true)],
                outcomes: outcomes(p_bad),
            },
            LawCase {
                when: vec![(FluentTemplate::constant(rock_under_car, &[good]), true)],
                outcomes: outcomes(p_good),
            },
        ],
        otherwise: outcomes(p_none),
    }
}

/// A car stuck in mud: find a rock, wedge it under a wheel, push and hit the gas.
pub fn stuck_car_1o(kind: DomainKind, deadline: u32) -> Result<Domain, MdpError> {
    let mut builder = DomainBuilder::new("stuck_car_1o", kind);
    let car_ty = builder.user_type("Car")?;
    let pedal_ty = builder.user_type("GasPedal")?;
    let rock_ty = builder.user_type("Rock")?;
    let body_ty = builder.user_type("BodyPart")?;

    builder.object("car", car_ty)?;
    builder.object("gasPedal", pedal_ty)?;
    let bad = builder.object("bad", rock_ty)?;
    let good = builder.object("good", rock_ty)?;
    let hands = builder.object("hands", body_ty)?;
    let legs = builder.object("legs", body_ty)?;

    let car_out = builder.fluent("car_out", &[], false)?;
    let tired = builder.fluent("tired", &[], false)?;
    let got_rock = builder.fluent("got_rock", &[rock_ty], false)?;
    let free = builder.fluent("free", &[body_ty], true)?;
    let rock_under_car = builder.fluent("rock_under_car", &[rock_ty], false)?;
    builder.fluent("gas_pressed", &[], false)?;

    let free_hands = FluentTemplate::constant(free, &[hands]);
    let free_legs = FluentTemplate::constant(free, &[legs]);
    let is_tired = FluentTemplate::nullary(tired);
    let push = |odds| push_law(car_out, rock_under_car, bad, good, odds);

    let mut rest = ActionSchema::new("rest", 1);
    rest.precondition(Timing::Overall, free_hands.clone(), true)
        .precondition(Timing::Overall, free_legs.clone(), true)
        .effect(EffectTiming::End, is_tired.clone(), false)
        .set_combinable(false);
    builder.action(rest)?;

    let mut place_rock = ActionSchema::new("place_rock", 2);
    let rock = place_rock.parameter("rock", rock_ty);
    place_rock
        .precondition(Timing::Overall, FluentTemplate::new(got_rock, [rock]), true)
        .precondition(Timing::Start, is_tired.clone(), false)
        .uses(free_hands.clone())
        .uses(free_legs.clone())
        .effect(EffectTiming::End, FluentTemplate::new(rock_under_car, [rock]), true)
        .effect(EffectTiming::End, FluentTemplate::new(got_rock, [rock]), false)
        .probabilistic(vec![is_tired.clone()], tired_law());
    builder.action(place_rock)?;

    let mut search = ActionSchema::new("search", 2);
    search
        .precondition(Timing::Start, is_tired.clone(), false)
        .uses(free_hands.clone())
        .probabilistic(
            vec![
                FluentTemplate::constant(got_rock, &[bad]),
                FluentTemplate::constant(got_rock, &[good]),
            ],
            ProbabilityLaw::fixed(vec![
                OutcomeSpec::new(0.1, [(0, true)]),
                OutcomeSpec::new(0.9, [(1, true)]),
            ]),
        );
    builder.action(search)?;

    let mut push_car = ActionSchema::new("push_car", 2);
    push_car
        .precondition(Timing::Start, is_tired.clone(), false)
        .uses(free_hands.clone())
        .probabilistic(vec![FluentTemplate::nullary(car_out)], push([0.3, 0.48, 0.1]))
        .probabilistic(vec![is_tired.clone()], tired_law());
    builder.action(push_car)?;

    let mut push_gas = ActionSchema::new("push_gas", 2);
    push_gas
        .precondition(Timing::Start, is_tired.clone(), false)
        .uses(free_legs.clone())
        .probabilistic(vec![FluentTemplate::nullary(car_out)], push([0.2, 0.4, 0.1]));
    builder.action(push_gas)?;

    let mut push_car_gas = ActionSchema::new("push_car_gas", 4);
    push_car_gas
        .precondition(Timing::Start, is_tired.clone(), false)
        .uses(free_hands)
        .uses(free_legs)
        .probabilistic(vec![FluentTemplate::nullary(car_out)], push([0.4, 0.9, 0.2]))
        .probabilistic(vec![is_tired], tired_law());
    builder.action(push_car_gas)?;

    builder.goal(car_out, &[], true);
    builder.deadline(deadline);
    builder.build()
}
