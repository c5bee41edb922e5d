use std::collections::HashSet;

use tracing::{
    debug,
    info,
};

use super::node::ProofNode;
use crate::{
    domain::{
        hash::Hash,
        tree_state::TreeState,
    },
    ports::{
        merkle_tree::MerkleTreeReader,
        node_store::{
            NodeStore,
            RhsError,
        },
    },
};

/// Collects the nodes needed to reconstruct proofs for a set of tree keys,
/// deduplicated by hash, and publishes them in one batch.
#[derive(Debug, Default)]
pub struct NodesBuilder {
    nodes: Vec<ProofNode>,
    seen: HashSet<Hash>,
}

impl NodesBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, node: ProofNode) {
        if self.seen.insert(node.hash) {
            self.nodes.push(node);
        }
    }

    /// Add the path of `key` as currently stored in `tree`.
    pub fn add_key<T: MerkleTreeReader>(&mut self, tree: &T, key: &Hash) -> Result<(), RhsError> {
        let entry = tree.get(key)?;
        self.add_leaf_path(key, &entry.value, &entry.siblings);
        Ok(())
    }

    /// Add a leaf and every middle node above it. `siblings` is the dense
    /// path from the root (index 0) down to the leaf. Returns the root the
    /// path hashes to.
    pub fn add_leaf_path(&mut self, key: &Hash, value: &Hash, siblings: &[Hash]) -> Hash {
        let leaf = ProofNode::leaf(*key, *value);
        let mut current = leaf.hash;
        self.push(leaf);

        for (level, sibling) in siblings.iter().enumerate().rev() {
            let node = if key.test_bit(level) {
                ProofNode::middle(*sibling, current)
            } else {
                ProofNode::middle(current, *sibling)
            };
            current = node.hash;
            self.push(node);
        }
        current
    }

    /// Add the state node for `tree_state`. A zero state has nothing to publish.
    pub fn add_state(&mut self, tree_state: &TreeState) {
        if !tree_state.state().is_zero() {
            self.push(ProofNode::state(tree_state));
        }
    }

    pub fn nodes(&self) -> &[ProofNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Save every collected node with a single store call. Returns how many
    /// nodes were sent.
    pub async fn publish<S: NodeStore>(self, store: &S) -> Result<usize, RhsError> {
        if self.nodes.is_empty() {
            debug!("nothing to publish");
            return Ok(0);
        }
        let count = self.nodes.len();
        store.save_nodes(&self.nodes).await?;
        info!("published {count} nodes to RHS");
        Ok(count)
    }
}

/// The three trees behind an identity state.
pub struct IdentityTrees<'a, T> {
    pub claims: &'a T,
    pub revocations: &'a T,
    pub roots: &'a T,
}

/// Publish what a verifier needs to check revocation against `tree_state`:
/// the state node, the roots-tree path of the claims root and the
/// revocation-tree path of each revoked nonce.
pub async fn publish_identity_state<S, T>(
    store: &S,
    tree_state: &TreeState,
    trees: IdentityTrees<'_, T>,
    revoked_nonces: &[u64],
) -> Result<usize, RhsError>
where
    S: NodeStore,
    T: MerkleTreeReader,
{
    let mut builder = NodesBuilder::new();
    builder.add_state(tree_state);

    let claims_root = trees.claims.root();
    if !claims_root.is_zero() {
        builder.add_key(trees.roots, &claims_root)?;
    }
    for nonce in revoked_nonces {
        builder.add_key(trees.revocations, &Hash::from_u64(*nonce))?;
    }

    builder.publish(store).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        adapters::{
            memory_rhs::InMemoryNodeStore,
            sparse_merkle_tree::SparseMerkleTree,
        },
        rhs::node::NodeType,
    };

    fn h(v: u64) -> Hash {
        Hash::from_u64(v)
    }

    #[test]
    fn test_leaf_path_hashes_to_tree_root() {
        let mut tree = SparseMerkleTree::new(10);
        for k in [1u64, 2, 3, 5, 8] {
            tree.add(h(k), h(k * 10)).unwrap();
        }

        let mut builder = NodesBuilder::new();
        let entry = tree.get(&h(5)).unwrap();
        let root = builder.add_leaf_path(&h(5), &entry.value, &entry.siblings);

        assert_eq!(root, tree.root());
        assert_eq!(builder.len(), entry.siblings.len() + 1);
        assert_eq!(builder.nodes()[0].node_type(), NodeType::Leaf);
    }

    #[test]
    fn test_shared_subpaths_are_deduplicated() {
        let mut tree = SparseMerkleTree::new(10);
        for k in [1u64, 3] {
            tree.add(h(k), h(0)).unwrap();
        }

        let mut builder = NodesBuilder::new();
        builder.add_key(&tree, &h(1)).unwrap();
        let first = builder.len();
        builder.add_key(&tree, &h(1)).unwrap();
        assert_eq!(builder.len(), first);

        builder.add_key(&tree, &h(3)).unwrap();
        let hashes: HashSet<Hash> = builder.nodes().iter().map(|n| n.hash).collect();
        assert_eq!(hashes.len(), builder.len());
    }

    #[test]
    fn test_missing_key_fails() {
        let tree = SparseMerkleTree::new(10);
        let mut builder = NodesBuilder::new();
        assert!(matches!(builder.add_key(&tree, &h(7)), Err(RhsError::Tree(_))));
    }

    #[test]
    fn test_zero_state_is_skipped() {
        let mut builder = NodesBuilder::new();
        builder.add_state(&TreeState::new(Hash::ZERO, Hash::ZERO, Hash::ZERO));
        assert!(builder.is_empty());

        builder.add_state(&TreeState::new(h(1), Hash::ZERO, Hash::ZERO));
        assert_eq!(builder.nodes()[0].node_type(), NodeType::State);
    }

    #[tokio::test]
    async fn test_publish_empty_builder_skips_store() {
        let store = InMemoryNodeStore::new();
        assert_eq!(NodesBuilder::new().publish(&store).await.unwrap(), 0);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_publish_identity_state() {
        let mut claims = SparseMerkleTree::new(10);
        claims.add(h(11), h(12)).unwrap();
        let mut revocations = SparseMerkleTree::new(10);
        revocations.add(h(4), Hash::ZERO).unwrap();
        let mut roots = SparseMerkleTree::new(10);
        roots.add(claims.root(), Hash::ZERO).unwrap();
        let state = TreeState::new(claims.root(), revocations.root(), roots.root());

        let store = InMemoryNodeStore::new();
        let trees = IdentityTrees {
            claims: &claims,
            revocations: &revocations,
            roots: &roots,
        };
        let published = publish_identity_state(&store, &state, trees, &[4]).await.unwrap();

        assert_eq!(published, 3);
        assert!(store.get_node(&state.state()).await.is_ok());
        assert!(store.get_node(&revocations.root()).await.is_ok());
        assert!(store.get_node(&roots.root()).await.is_ok());
    }
}
