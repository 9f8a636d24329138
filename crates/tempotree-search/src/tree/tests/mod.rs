mod mcts_core_tests;
mod rollout_tests;
