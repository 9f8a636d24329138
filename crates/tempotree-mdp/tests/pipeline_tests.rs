use tempotree_mdp::{
    ConvertedAction, DomainKind, GroundingMap, MdpError, combine, compile_combination,
    compile_split, domains, ground,
};

#[test]
fn full_conc_grounds_one_action_per_schema_and_two_events_each() {
    let domain = domains::full_conc(DomainKind::Regular, 20).expect("domain");
    let split = compile_split(&domain).expect("compile");

    assert_eq!(split.ground.actions.len(), 15);
    assert_eq!(split.converted.instantaneous_action_count(), 30);
    assert_eq!(split.ground.core.goals.len(), 15);
    assert_eq!(split.ground.core.initial.len(), 0);

    let eight = &split.converted.actions[0];
    assert_eq!(eight.name(), "eight");
    assert_eq!(eight.start_event().name, "eight@start");
    assert_eq!(eight.end_event().map(|e| e.name.as_str()), Some("eight@end"));
    assert_eq!(eight.span(), 8);
}

#[test]
fn grounding_is_deterministic() {
    let domain = domains::nasa_rover(DomainKind::Regular, 40, 2).expect("domain");

    let first = ground(&domain).expect("ground");
    let second = ground(&domain).expect("ground");
    assert_eq!(first, second);
}

#[test]
fn nasa_rover_grounds_only_owned_objects() {
    let domain = domains::nasa_rover(DomainKind::Regular, 40, 1).expect("domain");
    let split = compile_split(&domain).expect("compile");

    assert_eq!(split.ground.actions.len(), 33);
    assert_eq!(split.ground.actions[0].name, "sample_rock_good(r0, s0, x0, h0)");

    let instants = split
        .converted
        .actions
        .iter()
        .filter(|action| matches!(action, ConvertedAction::Instant { .. }))
        .count();
    assert_eq!(instants, 4);
    assert_eq!(split.converted.instantaneous_action_count(), 29 * 2 + 4);
}

#[test]
fn nasa_rover_initial_state_seeds_free_hands_and_stores() {
    let domain = domains::nasa_rover(DomainKind::Regular, 40, 1).expect("domain");
    let problem = ground(&domain).expect("ground");

    let mut initial: Vec<String> = problem.core.initial.iter().map(|atom| problem.core.describe(*atom)).collect();
    initial.sort();
    assert!(initial.contains(&"free_s(s0)".to_string()));
    assert!(initial.contains(&"free_h(h1)".to_string()));
    assert!(initial.contains(&"good(h0)".to_string()));
    assert!(!initial.contains(&"good(h1)".to_string()));
    assert!(initial.contains(&"store_of(s1, r0)".to_string()));
}

#[test]
fn mistyped_grounding_tuple_is_rejected() {
    let domain = domains::nasa_rover(DomainKind::Regular, 40, 1).expect("domain");
    let drop = domain.schema_id("drop").expect("schema");
    let rover = domain.universe().object_id("r0").expect("object");

    let mut map = GroundingMap::new();
    map.insert(drop, vec![vec![rover]]);
    let err = ground(&domain.with_grounding_map(map)).expect_err("grounding should fail");

    assert!(matches!(err, MdpError::TypeMismatch { .. }));
    assert!(err.to_string().contains("r0"));
}

#[test]
fn short_grounding_tuple_is_rejected() {
    let domain = domains::nasa_rover(DomainKind::Regular, 40, 1).expect("domain");
    let calibrate = domain.schema_id("calibrate").expect("schema");
    let camera = domain.universe().object_id("c0").expect("object");

    let mut map = GroundingMap::new();
    map.insert(calibrate, vec![vec![camera]]);
    assert!(matches!(
        ground(&domain.with_grounding_map(map)),
        Err(MdpError::ArityMismatch {
            expected: 2,
            found: 1,
            ..
        })
    ));
}

#[test]
fn stuck_car_combinations_exclude_shared_body_parts_and_rest() {
    let domain = domains::stuck_car_1o(DomainKind::Combination, 20).expect("domain");
    let split = compile_split(&domain).expect("compile");
    assert_eq!(split.ground.actions.len(), 7);

    let all = combine(&split.converted);
    assert_eq!(all.combinations.len(), 8);

    let bundle = compile_combination(&domain).expect("compile");
    let names: Vec<&str> = bundle
        .combination
        .combinations
        .iter()
        .map(|combo| combo.name.as_str())
        .collect();
    assert_eq!(names, vec!["search|push_gas", "push_car|push_gas"]);
    assert_eq!(bundle.combination.singles.len(), 7);
    assert_eq!(bundle.combination.action_count(), 9);
    assert_eq!(bundle.split, split.converted);
}

#[test]
fn unknown_domain_lists_known_names() {
    let err = domains::build("blocks_world", DomainKind::Regular, 20, 1, 0).expect_err("unknown");

    match err {
        MdpError::UnknownDomain { name, known } => {
            assert_eq!(name, "blocks_world");
            assert!(known.contains("nasa_rover"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn garbage_amount_is_rejected_for_bundled_domains() {
    for name in domains::NAMES {
        let err = domains::build(name, DomainKind::Regular, 20, 1, 3).expect_err("garbage");
        assert!(matches!(err, MdpError::InvalidConfig(_)), "{name}: {err}");
        assert!(domains::build(name, DomainKind::Regular, 20, 1, 0).is_ok());
    }
}
