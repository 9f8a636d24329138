use serde::{Deserialize, Serialize};

use crate::tree::{
    error::TreeError,
    ids::{ActionId, StateKey},
};

/// How the rewards collected along a rollout become one return.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnType {
    /// Plain reward sum.
    EpisodicUndiscounted,
    /// Reward at step `t` weighted by `gamma^t`.
    #[default]
    Discounted,
    /// Plain reward sum, cut at `fixed_horizon_steps`.
    FixedHorizon,
}

#[derive(Debug, Clone, Copy)]
pub struct RolloutParams {
    pub return_type: ReturnType,
    pub gamma: f64,
    pub max_steps: usize,
    pub fixed_horizon_steps: usize,
}

impl RolloutParams {
    /// Number of steps a rollout may take under these params.
    pub fn step_limit(&self) -> usize {
        if self.return_type == ReturnType::FixedHorizon {
            self.fixed_horizon_steps.min(self.max_steps)
        } else {
            self.max_steps
        }
    }

    fn weight_step(&self) -> f64 {
        match self.return_type {
            ReturnType::Discounted => self.gamma,
            ReturnType::EpisodicUndiscounted | ReturnType::FixedHorizon => 1.0,
        }
    }
}

struct Accumulator {
    total: f64,
    weight: f64,
    decay: f64,
}

impl Accumulator {
    fn push(&mut self, reward: f64) {
        self.total += self.weight * reward;
        self.weight *= self.decay;
    }
}

/// Follow `rollout_policy` from `start_state_key` and return the accumulated reward.
///
/// The walk ends on a terminal step, on a state with no actions, or at
/// [`RolloutParams::step_limit`]. A policy that picks an action outside
/// `0..num_actions` aborts the rollout with [`TreeError::InvalidRolloutAction`].
pub fn rollout<FNum, FStep, FPolicy>(
    start_state_key: StateKey,
    mut num_actions: FNum,
    mut step: FStep,
    mut rollout_policy: FPolicy,
    params: RolloutParams,
) -> Result<f64, TreeError>
where
    FNum: FnMut(StateKey) -> usize,
    FStep: FnMut(StateKey, ActionId) -> (StateKey, f64, bool),
    FPolicy: FnMut(StateKey, usize) -> ActionId,
{
    let mut acc = Accumulator {
        total: 0.0,
        weight: 1.0,
        decay: params.weight_step(),
    };
    let mut current = start_state_key;
    let mut steps_left = params.step_limit();

    while steps_left > 0 {
        steps_left -= 1;
        let available = num_actions(current);
        if available == 0 {
            break;
        }
        let chosen = rollout_policy(current, available);
        if chosen.index() >= available {
            return Err(TreeError::InvalidRolloutAction {
                state_key: current,
                action_id: chosen,
                num_actions: available,
            });
        }

        let (next, reward, done) = step(current, chosen);
        acc.push(reward);
        if done {
            break;
        }
        current = next;
    }

    Ok(acc.total)
}
