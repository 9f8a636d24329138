use std::fmt;

use crate::tree::ids::{ActionId, NodeId, StateKey};

/// Failures raised while growing or querying a search tree.
///
/// These indicate a broken invariant between the tree and the environment
/// callbacks (an id that was never allocated, a policy that picked an action
/// the state does not offer), never an ordinary search outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// No node is stored under this id.
    MissingNode { node_id: NodeId },
    /// The node was expanded with fewer actions than `action_id`.
    MissingEdge {
        node_id: NodeId,
        action_id: ActionId,
    },
    /// The node is expanded but has no edge to choose from.
    ActionSelectionFailed { node_id: NodeId },
    /// A successor was registered twice under the same edge.
    OutcomeInsertFailed {
        node_id: NodeId,
        action_id: ActionId,
    },
    /// The rollout policy answered with an action outside `[0, num_actions)`.
    InvalidRolloutAction {
        state_key: StateKey,
        action_id: ActionId,
        num_actions: usize,
    },
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeError::MissingNode { node_id } => {
                write!(f, "node {} is not in the tree", node_id.index())
            }
            TreeError::MissingEdge { node_id, action_id } => write!(
                f,
                "node {} has no edge for action {}",
                node_id.index(),
                action_id.index()
            ),
            TreeError::ActionSelectionFailed { node_id } => {
                write!(f, "node {} has no action to select", node_id.index())
            }
            TreeError::OutcomeInsertFailed { node_id, action_id } => write!(
                f,
                "successor already registered under action {} of node {}",
                action_id.index(),
                node_id.index()
            ),
            TreeError::InvalidRolloutAction {
                state_key,
                action_id,
                num_actions,
            } => write!(
                f,
                "rollout chose action {} in state {} which offers only {} actions",
                action_id.index(),
                state_key.value(),
                num_actions
            ),
        }
    }
}

impl std::error::Error for TreeError {}
