use crate::tree::{
    error::TreeError,
    ids::{ActionId, StateKey},
    rollout::{ReturnType, RolloutParams, rollout},
};

// Two rewarded steps, 2.0 then 4.0; the second one is terminal.
fn two_step_chain(return_type: ReturnType, fixed_horizon_steps: usize) -> f64 {
    rollout(
        StateKey::from(0),
        |state| if state.value() < 2 { 1 } else { 0 },
        |state, _| match state.value() {
            0 => (StateKey::from(1), 2.0, false),
            _ => (StateKey::from(2), 4.0, true),
        },
        |_, _| ActionId::from(0),
        RolloutParams {
            return_type,
            gamma: 0.5,
            max_steps: 8,
            fixed_horizon_steps,
        },
    )
    .expect("rollout")
}

#[test]
fn discounted_return_weights_later_rewards() {
    assert_eq!(two_step_chain(ReturnType::Discounted, 8), 4.0);
}

#[test]
fn undiscounted_modes_sum_rewards() {
    assert_eq!(two_step_chain(ReturnType::EpisodicUndiscounted, 8), 6.0);
    assert_eq!(two_step_chain(ReturnType::FixedHorizon, 8), 6.0);
    assert_eq!(two_step_chain(ReturnType::FixedHorizon, 1), 2.0);
}

#[test]
fn no_steps_taken_without_budget() {
    let mut calls = 0;
    let total = rollout(
        StateKey::from(0),
        |_| 1,
        |state, _| {
            calls += 1;
            (state, 1.0, false)
        },
        |_, _| ActionId::from(0),
        RolloutParams {
            return_type: ReturnType::Discounted,
            gamma: 1.0,
            max_steps: 0,
            fixed_horizon_steps: 4,
        },
    )
    .expect("rollout");

    assert_eq!(total, 0.0);
    assert_eq!(calls, 0);
}

#[test]
fn policy_choosing_missing_action_is_reported() {
    let err = rollout(
        StateKey::from(3),
        |_| 2,
        |state, _| (state, 0.0, false),
        |_, _| ActionId::from(2),
        RolloutParams {
            return_type: ReturnType::EpisodicUndiscounted,
            gamma: 1.0,
            max_steps: 5,
            fixed_horizon_steps: 5,
        },
    )
    .expect_err("out of range action");

    assert!(matches!(
        err,
        TreeError::InvalidRolloutAction { num_actions: 2, .. }
    ));
}
