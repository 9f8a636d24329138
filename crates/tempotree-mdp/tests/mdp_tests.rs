use tempotree_mdp::{
    ActionRef, ActionSchema, AtomId, DomainBuilder, DomainKind, EffectTiming, FluentTemplate,
    GroundFluent, Mdp, MdpAction, MdpError, MdpMode, MdpSimulator, OutcomeSpec, ProbabilityLaw,
    State, Timing, compile_combination, compile_split, domains,
};

const FULL_CONC_SCHEDULE: [&str; 15] = [
    "eight", "four1", "two1", "one1", "one2", "two2", "one3", "one4", "four2", "two3", "one5",
    "one6", "two4", "one7", "one8",
];

fn full_conc_split(deadline: u32) -> Mdp {
    let domain = domains::full_conc(DomainKind::Regular, deadline).expect("domain");
    let split = compile_split(&domain).expect("compile");
    Mdp::build(&split.converted, 0.95).expect("mdp")
}

fn full_conc_combination(deadline: u32) -> Mdp {
    let domain = domains::full_conc(DomainKind::Combination, deadline).expect("domain");
    let bundle = compile_combination(&domain).expect("compile");
    Mdp::build(&bundle.combination, 0.95).expect("mdp")
}

fn atom(mdp: &Mdp, fluent: &str, objects: &[&str]) -> AtomId {
    let universe = &mdp.core().universe;
    let fluent = universe.fluent_id(fluent).expect("fluent");
    let args = objects
        .iter()
        .map(|name| universe.object_id(name).expect("object"))
        .collect::<Vec<_>>();
    mdp.core()
        .atoms
        .lookup(&GroundFluent::new(fluent, args))
        .expect("interned atom")
}

fn only_successor(mdp: &Mdp, state: &State, action: ActionRef) -> State {
    let outcomes = mdp.transitions(state, action);
    assert_eq!(outcomes.len(), 1, "expected a deterministic transition");
    assert!((outcomes[0].0 - 1.0).abs() < 1e-12);
    outcomes[0].1.clone()
}

#[test]
fn scripted_full_conc_schedule_meets_every_goal_in_time() {
    let mdp = full_conc_split(20);
    let mut state = mdp.initial_state();

    for name in FULL_CONC_SCHEDULE {
        let action = mdp.action_by_name(&format!("{name}@start")).expect("start action");
        assert!(mdp.is_applicable(&state, action), "{name} should be startable");
        state = only_successor(&mdp, &state, action);
    }

    assert!(mdp.is_goal(&state));
    assert_eq!(mdp.goals_satisfied(&state), 15);
    assert_eq!(mdp.elapsed(&state), 15);
    assert_eq!(state.remaining(), 5);
    assert!(state.agenda().is_empty());
}

#[test]
fn split_mode_appends_wait_after_start_actions() {
    let mdp = full_conc_split(20);

    assert_eq!(mdp.mode(), MdpMode::Split);
    assert_eq!(mdp.action_count(), 16);
    let wait = mdp.action_by_name("wait").expect("wait");
    assert_eq!(wait.index(), 15);
    assert_eq!(mdp.action(wait), Some(MdpAction::Wait));
    assert_eq!(mdp.action(ActionRef::from(0)), Some(MdpAction::Start(0)));
}

#[test]
fn split_and_combination_agree_on_a_single_durative_action() {
    let split = full_conc_split(20);
    let got_a = atom(&split, "got", &["a"]);
    let start = split.action_by_name("eight@start").expect("start");
    let wait = split.action_by_name("wait").expect("wait");

    let mut state = only_successor(&split, &split.initial_state(), start);
    assert!(state.in_flight(0));
    assert!(!split.is_applicable(&state, start), "an in-flight action cannot restart");
    for _ in 0..6 {
        state = only_successor(&split, &state, wait);
    }
    assert!(!state.holds(got_a));
    state = only_successor(&split, &state, wait);
    assert!(state.holds(got_a));
    assert_eq!(state.remaining(), 12);

    let combination = full_conc_combination(20);
    let eight = combination.action_by_name("eight").expect("single");
    let after = only_successor(&combination, &combination.initial_state(), eight);
    assert!(after.holds(atom(&combination, "got", &["a"])));
    assert_eq!(after.remaining(), 12);
    assert_eq!(after.atoms(), state.atoms());
}

#[test]
fn stuck_car_search_follows_its_law() {
    let domain = domains::stuck_car_1o(DomainKind::Combination, 20).expect("domain");
    let bundle = compile_combination(&domain).expect("compile");
    let mdp = Mdp::build(&bundle.combination, 0.95).expect("mdp");

    let search = mdp.action_by_name("search").expect("search");
    let outcomes = mdp.transitions(&mdp.initial_state(), search);
    assert_eq!(outcomes.len(), 2);
    assert!((outcomes[0].0 - 0.1).abs() < 1e-12);
    assert!((outcomes[1].0 - 0.9).abs() < 1e-12);
    assert!(outcomes[0].1.holds(atom(&mdp, "got_rock", &["bad"])));
    assert!(outcomes[1].1.holds(atom(&mdp, "got_rock", &["good"])));
    assert!(outcomes.iter().all(|(_, next)| next.holds(atom(&mdp, "free", &["hands"]))));
    assert!(outcomes.iter().all(|(_, next)| next.remaining() == 18));
}

#[test]
fn law_that_does_not_sum_to_one_is_rejected_at_build() {
    let domain = domains::stuck_car_1o(DomainKind::Combination, 20).expect("domain");
    let broken = domain
        .with_law(
            "search",
            0,
            ProbabilityLaw::fixed(vec![
                OutcomeSpec::new(0.1, [(0, true)]),
                OutcomeSpec::new(0.85, [(1, true)]),
            ]),
        )
        .expect("law swap");
    let bundle = compile_combination(&broken).expect("compile");

    let err = Mdp::build(&bundle.combination, 0.95).expect_err("build should fail");
    match err {
        MdpError::MalformedDistribution { action, sum, .. } => {
            assert_eq!(action, "search");
            assert!((sum - 0.95).abs() < 1e-9);
        }
        other => panic!("unexpected error: {other}"),
    }

    let intact = compile_combination(&domain).expect("compile");
    assert!(Mdp::build(&intact.combination, 0.95).is_ok());
}

#[test]
fn out_of_range_discount_is_rejected() {
    let domain = domains::full_conc(DomainKind::Regular, 20).expect("domain");
    let split = compile_split(&domain).expect("compile");

    assert!(matches!(
        Mdp::build(&split.converted, 1.5),
        Err(MdpError::InvalidDiscount { .. })
    ));
}

#[test]
fn overrunning_the_deadline_leads_to_failure() {
    let mdp = full_conc_combination(3);
    let eight = mdp.action_by_name("eight").expect("single");

    let outcomes = mdp.transitions(&mdp.initial_state(), eight);
    assert_eq!(outcomes.len(), 1);
    let failed = &outcomes[0].1;
    assert!(failed.is_failure());
    assert_eq!(*failed, State::failure());
    assert!(mdp.applicable_actions(failed).is_empty());
    assert_eq!(mdp.goals_satisfied(failed), 0);
    assert!(!mdp.is_goal(failed));
}

#[test]
fn split_wait_at_zero_remaining_fails() {
    let mdp = full_conc_split(1);
    let wait = mdp.action_by_name("wait").expect("wait");

    let once = only_successor(&mdp, &mdp.initial_state(), wait);
    assert_eq!(once.remaining(), 0);
    assert!(only_successor(&mdp, &once, wait).is_failure());
}

#[test]
fn inapplicable_action_leaves_state_unchanged() {
    let mdp = full_conc_split(20);
    let initial = mdp.initial_state();
    let one2 = mdp.action_by_name("one2@start").expect("start");

    assert!(!mdp.is_applicable(&initial, one2));
    assert_eq!(mdp.transitions(&initial, one2), vec![(1.0, initial.clone())]);
    assert!(!mdp.applicable_actions(&initial).contains(&one2));
}

#[test]
fn combination_applies_both_parts_in_one_step() {
    let domain = domains::stuck_car_1o(DomainKind::Combination, 20).expect("domain");
    let bundle = compile_combination(&domain).expect("compile");
    let mdp = Mdp::build(&bundle.combination, 0.95).expect("mdp");

    let pair = mdp.action_by_name("search|push_gas").expect("combination");
    let outcomes = mdp.transitions(&mdp.initial_state(), pair);
    let total: f64 = outcomes.iter().map(|(prob, _)| prob).sum();

    assert!((total - 1.0).abs() < 1e-9);
    assert_eq!(outcomes.len(), 4);
    assert!(outcomes.iter().all(|(_, next)| next.remaining() == 18));

    let car_out = atom(&mdp, "car_out", &[]);
    let freed: f64 = outcomes
        .iter()
        .filter(|(_, next)| next.holds(car_out))
        .map(|(prob, _)| prob)
        .sum();
    assert!((freed - 0.1).abs() < 1e-9);
}

#[test]
fn equal_seeds_replay_equal_trajectories() {
    let domain = domains::stuck_car_1o(DomainKind::Regular, 30).expect("domain");
    let split = compile_split(&domain).expect("compile");
    let mdp = Mdp::build(&split.converted, 0.95).expect("mdp");

    let walk = |seed: u64| {
        let mut sim = MdpSimulator::new(&mdp, seed);
        let mut state = mdp.initial_state();
        let mut visited = Vec::new();
        for _ in 0..12 {
            let applicable = mdp.applicable_actions(&state);
            if applicable.is_empty() {
                break;
            }
            let action = applicable[sim.pick(applicable.len())];
            state = sim.step(&state, action);
            visited.push(state.clone());
        }
        visited
    };

    assert_eq!(walk(11), walk(11));
}

#[test]
fn instantaneous_action_lands_in_one_tick_without_agenda_entry() {
    let domain = domains::nasa_rover(DomainKind::Regular, 40, 1).expect("domain");
    let split = compile_split(&domain).expect("compile");
    let mdp = Mdp::build(&split.converted, 0.95).expect("mdp");

    let turn_on = mdp.action_by_name("turn_on_hand(h1, x0)").expect("instant action");
    assert_eq!(mdp.action(turn_on), Some(MdpAction::Instant(turn_on.index())));
    assert!(mdp.action_by_name("turn_on_hand(h1, x0)@start").is_none());

    let initial = mdp.initial_state();
    assert!(mdp.is_applicable(&initial, turn_on));
    let ready = atom(&mdp, "ready", &["h1", "x0"]);
    let free_hand = atom(&mdp, "free_h", &["h1"]);

    let outcomes = mdp.transitions(&initial, turn_on);
    assert_eq!(outcomes.len(), 2);
    assert!((outcomes[0].0 - 0.8).abs() < 1e-12);
    assert!((outcomes[1].0 - 0.2).abs() < 1e-12);
    assert!(outcomes[0].1.holds(ready));
    assert!(!outcomes[0].1.holds(free_hand));
    assert!(!outcomes[1].1.holds(ready));
    assert!(outcomes[1].1.holds(free_hand));
    for (_, next) in &outcomes {
        assert!(next.agenda().is_empty());
        assert_eq!(next.remaining(), 39);
        assert_eq!(mdp.elapsed(next), 1);
    }

    let good_hand = mdp.action_by_name("turn_on_hand(h0, x0)").expect("instant action");
    assert!(!mdp.is_applicable(&initial, good_hand));
}

#[test]
fn end_dropped_by_failed_overall_condition_keeps_resource_claimed() {
    let mut builder = DomainBuilder::new("workshop", DomainKind::Regular);
    let tool = builder.fluent("tool", &[], true).expect("fluent");
    let powered = builder.fluent("powered", &[], true).expect("fluent");
    let done = builder.fluent("done", &[], false).expect("fluent");

    let mut work = ActionSchema::new("work", 2);
    work.uses(FluentTemplate::nullary(tool))
        .precondition(Timing::Overall, FluentTemplate::nullary(powered), true)
        .effect(EffectTiming::End, FluentTemplate::nullary(done), true);
    builder.action(work).expect("action");
    let mut cut = ActionSchema::instantaneous("cut");
    cut.effect(EffectTiming::Start, FluentTemplate::nullary(powered), false);
    builder.action(cut).expect("action");
    builder.goal(done, &[], true);
    builder.deadline(10);

    let domain = builder.build().expect("domain");
    let split = compile_split(&domain).expect("compile");
    let mdp = Mdp::build(&split.converted, 0.95).expect("mdp");
    let start = mdp.action_by_name("work@start").expect("start");
    let cut = mdp.action_by_name("cut").expect("instant");

    let running = only_successor(&mdp, &mdp.initial_state(), start);
    assert!(!running.holds(atom(&mdp, "tool", &[])));
    let after = only_successor(&mdp, &running, cut);

    assert!(after.agenda().is_empty());
    assert!(!after.holds(atom(&mdp, "done", &[])));
    assert!(!after.holds(atom(&mdp, "tool", &[])));
    assert!(!mdp.is_applicable(&after, start));
}
