mod tree;

pub use tree::config::{SearchConfig, SearchConfigError};
pub use tree::error::TreeError;
pub use tree::ids::{ActionId, NodeId, StateKey};
pub use tree::mcts::{IterationMetrics, RunMetrics};
pub use tree::rollout::{ReturnType, RolloutParams, rollout};
pub use tree::search_tree::{RootEdge, Tree, TreePolicyResult};
pub use tree::stats::SelectionType;
