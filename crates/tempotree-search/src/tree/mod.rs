mod arena;
pub mod config;
mod edges;
pub mod error;
pub mod ids;
pub mod mcts;
mod node;
mod outcomes;
pub mod rollout;
pub mod search_tree;
pub mod stats;

#[cfg(test)]
mod tests;
