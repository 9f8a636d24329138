use crate::{ActionId, ReturnType, SearchConfig, SelectionType, StateKey, Tree};

fn config(iterations: usize, max_depth: usize) -> SearchConfig {
    SearchConfig {
        iterations,
        time_budget_secs: None,
        c: 1.4,
        gamma: 1.0,
        max_depth,
        return_type: ReturnType::Discounted,
        fixed_horizon_steps: max_depth,
        selection: SelectionType::Avg,
    }
}

#[test]
fn deterministic_iterations_backpropagate_visits() {
    let mut tree = Tree::new(StateKey::from(0), false);
    let config = config(2, 8);

    let mut num_actions = |state: StateKey| match state.value() {
        0 | 1 => 1,
        _ => 0,
    };
    let mut step = |state: StateKey, _action: ActionId| match state.value() {
        0 => (StateKey::from(1), 1.0, false),
        1 => (StateKey::from(2), 2.0, true),
        _ => (state, 0.0, true),
    };
    let mut rollout_policy = |_state: StateKey, _num_actions: usize| ActionId::from(0);

    tree.iterate(&config, &mut num_actions, &mut step, &mut rollout_policy)
        .expect("first iteration should succeed");
    tree.iterate(&config, &mut num_actions, &mut step, &mut rollout_policy)
        .expect("second iteration should succeed");

    let root = tree.node(tree.root_id()).expect("root exists");
    let root_edge = root.edge(ActionId::from(0)).expect("root action exists");
    assert_eq!(root_edge.visits(), 2);

    let child_id = root_edge
        .get_child_for(StateKey::from(1))
        .expect("child should exist for state 1");
    let child = tree.node(child_id).expect("child exists");
    let child_edge = child.edge(ActionId::from(0)).expect("child action exists");
    assert_eq!(child_edge.visits(), 1);
}

#[test]
fn stochastic_transitions_create_distinct_outcomes_and_count_occurrences() {
    let mut tree = Tree::new(StateKey::from(0), false);
    let config = config(3, 4);

    let mut sequence = vec![1_u64, 2_u64, 1_u64].into_iter();
    let mut num_actions = |state: StateKey| match state.value() {
        0 => 1,
        _ => 0,
    };
    let mut step = move |state: StateKey, _action: ActionId| {
        if state.value() == 0 {
            let next_state = sequence.next().expect("enough stochastic outcomes");
            (StateKey::from(next_state), 0.0, true)
        } else {
            (state, 0.0, true)
        }
    };
    let mut rollout_policy = |_state: StateKey, _num_actions: usize| ActionId::from(0);

    for _ in 0..3 {
        tree.iterate(&config, &mut num_actions, &mut step, &mut rollout_policy)
            .expect("iteration should succeed");
    }

    let root = tree.node(tree.root_id()).expect("root exists");
    let edge = root.edge(ActionId::from(0)).expect("action 0 exists");

    assert_eq!(edge.outcomes_len(), 2);
    assert_eq!(edge.outcome_count_for(StateKey::from(1)), Some(2));
    assert_eq!(edge.outcome_count_for(StateKey::from(2)), Some(1));
    assert_eq!(tree.node_count(), 3);
}

#[test]
fn depth_limit_stops_descent_at_the_cap() {
    let mut tree = Tree::new(StateKey::from(0), false);
    let config = config(10, 1);

    // Endless chain: every state leads to the next one.
    let mut num_actions = |_state: StateKey| 1;
    let mut step =
        |state: StateKey, _action: ActionId| (StateKey::from(state.value() + 1), 1.0, false);
    let mut rollout_policy = |_state: StateKey, _num_actions: usize| ActionId::from(0);

    for _ in 0..10 {
        let metrics = tree
            .iterate(&config, &mut num_actions, &mut step, &mut rollout_policy)
            .expect("iteration should succeed");
        assert!(metrics.path_len <= 1);
        assert_eq!(metrics.rollout_return, 0.0);
    }
    assert_eq!(tree.node_count(), 2);
}

#[test]
fn max_selection_prefers_the_risky_high_payoff_action() {
    let mut tree = Tree::new(StateKey::from(0), false);
    let mut config = config(200, 2);
    config.selection = SelectionType::Max;

    let mut draws = 0_u64;
    let num_actions = |state: StateKey| if state.value() == 0 { 2 } else { 0 };
    let step = move |_state: StateKey, action: ActionId| {
        if action.index() == 0 {
            (StateKey::from(1), 1.0, true)
        } else {
            // Pays 10 one time in four, nothing otherwise: mean 2.5, best 10.
            draws += 1;
            if draws % 4 == 0 {
                (StateKey::from(2), 10.0, true)
            } else {
                (StateKey::from(3), 0.0, true)
            }
        }
    };
    let rollout_policy = |_state: StateKey, _num_actions: usize| ActionId::from(0);

    tree.run(&config, num_actions, step, rollout_policy)
        .expect("run should succeed");

    let best = tree
        .best_root_action_by_value(SelectionType::Max)
        .expect("lookup should succeed")
        .expect("root has actions");
    assert_eq!(best.index(), 1);
}

#[test]
fn default_config_yaml_parses() {
    let config = SearchConfig::from_default_yaml().expect("default yaml should parse");
    assert_eq!(config.return_type, ReturnType::Discounted);
    assert_eq!(config.selection, SelectionType::Avg);
    assert!(config.iterations > 0);
    assert!(config.time_budget().is_some());
}

#[test]
fn invalid_time_budget_is_rejected() {
    let err = SearchConfig::from_yaml_str("time_budget_secs: -1.0\n")
        .expect_err("negative budget must fail");
    assert!(err.to_string().contains("time_budget_secs"));
}
