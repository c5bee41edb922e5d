use std::collections::HashMap;

use tokio::sync::Mutex;

use crate::{
    domain::hash::Hash,
    ports::node_store::{
        NodeStore,
        RhsError,
    },
    rhs::node::ProofNode,
};

/// In-memory implementation of `NodeStore`, backing the RHS server and tests.
///
/// Every node is validated before it is stored, so the map only ever holds
/// nodes whose hash matches their children.
pub struct InMemoryNodeStore {
    nodes: Mutex<HashMap<Hash, ProofNode>>,
}

impl InMemoryNodeStore {
    pub fn new() -> Self {
        Self {
            nodes: Mutex::new(HashMap::new()),
        }
    }

    pub async fn len(&self) -> usize {
        self.nodes.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.nodes.lock().await.is_empty()
    }
}

impl Default for InMemoryNodeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeStore for InMemoryNodeStore {
    async fn get_node(&self, hash: &Hash) -> Result<ProofNode, RhsError> {
        let nodes = self.nodes.lock().await;
        nodes.get(hash).cloned().ok_or(RhsError::NodeNotFound(*hash))
    }

    async fn save_nodes(&self, nodes: &[ProofNode]) -> Result<(), RhsError> {
        // Validate the whole batch first so a bad node stores nothing.
        for node in nodes {
            node.validate()?;
        }
        let mut stored = self.nodes.lock().await;
        for node in nodes {
            stored.entry(node.hash).or_insert_with(|| node.clone());
        }
        Ok(())
    }
}
