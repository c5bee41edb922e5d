use std::{
    future::Future,
    sync::Arc,
};

use super::merkle_tree::TreeError;
use crate::{
    domain::{
        error::DomainError,
        hash::Hash,
    },
    rhs::node::{
        NodeType,
        ProofNode,
    },
};

/// Port for a content-addressed store of Merkle tree nodes (Reverse Hash Service).
///
/// Nodes are immutable once stored; saving an existing node is a no-op.
///
/// Implementations:
/// - `HttpRhsClient` (remote RHS over HTTP)
/// - `InMemoryNodeStore` (for servers and tests)
pub trait NodeStore: Send + Sync {
    /// Fetch the node whose hash is `hash`.
    fn get_node(
        &self,
        hash: &Hash,
    ) -> impl Future<Output = Result<ProofNode, RhsError>> + Send;

    /// Store a batch of nodes.
    fn save_nodes(
        &self,
        nodes: &[ProofNode],
    ) -> impl Future<Output = Result<(), RhsError>> + Send;
}

impl<T: NodeStore> NodeStore for Arc<T> {
    async fn get_node(&self, hash: &Hash) -> Result<ProofNode, RhsError> {
        (**self).get_node(hash).await
    }

    async fn save_nodes(&self, nodes: &[ProofNode]) -> Result<(), RhsError> {
        (**self).save_nodes(nodes).await
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RhsError {
    #[error("node not found: {0}")]
    NodeNotFound(Hash),

    #[error("unexpected HTTP status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("invalid node: {0}")]
    InvalidNode(String),

    #[error("requested node {requested} but store returned {got}")]
    HashMismatch { requested: Hash, got: Hash },

    #[error("unexpected node type {node_type} at {hash}")]
    UnexpectedNodeType { hash: Hash, node_type: NodeType },

    #[error("tree depth is too high: walk exceeded {max} levels")]
    TreeDepthExceeded { max: usize },

    #[error("tree error: {0}")]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl RhsError {
    /// Whether a caller may retry the operation that produced this error.
    ///
    /// Errors showing the remote store is structurally invalid are final.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RhsError::NodeNotFound(_)
                | RhsError::HttpStatus { .. }
                | RhsError::Transport(_)
                | RhsError::TreeDepthExceeded { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_classification() {
        assert!(RhsError::Transport("reset".into()).is_retryable());
        assert!(RhsError::HttpStatus {
            status: 503,
            body: String::new()
        }
        .is_retryable());
        assert!(RhsError::TreeDepthExceeded { max: 240 }.is_retryable());
        assert!(!RhsError::UnexpectedNodeType {
            hash: Hash::ZERO,
            node_type: NodeType::State
        }
        .is_retryable());
        assert!(!RhsError::HashMismatch {
            requested: Hash::ZERO,
            got: Hash::ONE
        }
        .is_retryable());
        assert!(!RhsError::InvalidNode("arity".into()).is_retryable());
    }
}
