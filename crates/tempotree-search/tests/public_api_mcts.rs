use std::time::Duration;

use tempotree_search::{ActionId, ReturnType, SearchConfig, SelectionType, StateKey, Tree};

fn two_armed_config(iterations: usize) -> SearchConfig {
    SearchConfig {
        iterations,
        time_budget_secs: None,
        c: 0.0,
        gamma: 1.0,
        max_depth: 4,
        return_type: ReturnType::Discounted,
        fixed_horizon_steps: 4,
        selection: SelectionType::Avg,
    }
}

fn two_armed_step(state: StateKey, action: ActionId) -> (StateKey, f64, bool) {
    if state.value() != 0 {
        return (state, 0.0, true);
    }
    if action.index() == 0 {
        (StateKey::from(1), 1.0, true)
    } else {
        (StateKey::from(2), 5.0, true)
    }
}

#[test]
fn public_run_prefers_higher_value_root_action() {
    let mut tree = Tree::new(StateKey::from(0), false);
    let config = two_armed_config(20);

    let run = tree
        .run(
            &config,
            |state: StateKey| if state.value() == 0 { 2 } else { 0 },
            two_armed_step,
            |_state: StateKey, _num_actions: usize| ActionId::from(0),
        )
        .expect("run should succeed");

    assert_eq!(run.iterations_completed, config.iterations);

    let best_by_visits = tree
        .best_root_action_by_visits()
        .expect("root action lookup should succeed")
        .expect("an action should be available");
    let best_by_value = tree
        .best_root_action_by_value(SelectionType::Avg)
        .expect("root action lookup should succeed")
        .expect("an action should be available");

    assert_eq!(best_by_visits.index(), 1);
    assert_eq!(best_by_value.index(), 1);

    let edges = tree.root_edges().expect("root exists");
    assert_eq!(edges.len(), 2);
    assert_eq!(edges.iter().map(|e| e.visits).sum::<u64>(), 20);
}

#[test]
fn public_time_budget_stops_run_before_iteration_cap() {
    let mut tree = Tree::new(StateKey::from(0), false);
    let mut config = two_armed_config(usize::MAX);
    config.time_budget_secs = Some(0.02);

    let run = tree
        .run(
            &config,
            |state: StateKey| if state.value() == 0 { 2 } else { 0 },
            |state, action| {
                std::thread::sleep(Duration::from_millis(1));
                two_armed_step(state, action)
            },
            |_state: StateKey, _num_actions: usize| ActionId::from(0),
        )
        .expect("run should succeed");

    assert!(run.stopped_by_time);
    assert!(run.iterations_completed < config.iterations);
    assert!(run.elapsed >= Duration::from_millis(20));
}

#[test]
fn public_default_yaml_config_parses() {
    let config = SearchConfig::from_default_yaml().expect("default yaml should parse");
    assert_eq!(config.return_type, ReturnType::Discounted);
    assert!(config.iterations > 0);
    assert!("max".parse::<SelectionType>().is_ok());
    assert!("median".parse::<SelectionType>().is_err());
}
