use tracing::debug;

use super::{
    node::{
        NodeType,
        ProofNode,
    },
    status::RevocationStatus,
};
use crate::{
    domain::{
        hash::Hash,
        proof::{
            NodeAux,
            Proof,
            MAX_PROOF_DEPTH,
        },
        tree_state::TreeState,
    },
    ports::node_store::{
        NodeStore,
        RhsError,
    },
};

/// Rebuilds Merkle proofs by walking nodes fetched from a [`NodeStore`].
///
/// Every fetched node is checked against the hash it was requested by, so a
/// store can withhold nodes but cannot forge them.
pub struct RhsResolver<S> {
    store: S,
}

impl<S: NodeStore> RhsResolver<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    async fn fetch(&self, hash: &Hash) -> Result<ProofNode, RhsError> {
        let node = self.store.get_node(hash).await?;
        if node.hash != *hash {
            return Err(RhsError::HashMismatch {
                requested: *hash,
                got: node.hash,
            });
        }
        node.validate()?;
        Ok(node)
    }

    /// Proof of `key` against `root`.
    ///
    /// A zero hash ends the walk in an empty subtree; a leaf ends it either
    /// at `key` or at the leaf occupying its place.
    pub async fn generate_proof(&self, root: &Hash, key: &Hash) -> Result<Proof, RhsError> {
        debug!("resolving key {key} against root {root}");
        let mut siblings = Vec::new();
        let mut next = *root;

        loop {
            if next.is_zero() {
                return Ok(Proof::new(false, &siblings, None)?);
            }

            let node = self.fetch(&next).await?;
            match (node.node_type(), node.children.as_slice()) {
                (NodeType::Leaf, [leaf_key, leaf_value, _]) => {
                    let proof = if leaf_key == key {
                        Proof::new(true, &siblings, None)?
                    } else {
                        let aux = NodeAux {
                            key: *leaf_key,
                            value: *leaf_value,
                        };
                        Proof::new(false, &siblings, Some(aux))?
                    };
                    return Ok(proof);
                }
                (NodeType::Middle, [left, right]) => {
                    let depth = siblings.len();
                    if depth >= MAX_PROOF_DEPTH {
                        return Err(RhsError::TreeDepthExceeded {
                            max: MAX_PROOF_DEPTH,
                        });
                    }
                    if key.test_bit(depth) {
                        siblings.push(*left);
                        next = *right;
                    } else {
                        siblings.push(*right);
                        next = *left;
                    }
                }
                (node_type, _) => {
                    return Err(RhsError::UnexpectedNodeType {
                        hash: next,
                        node_type,
                    });
                }
            }
        }
    }

    /// Tree roots behind a published identity state.
    pub async fn tree_state(&self, state: &Hash) -> Result<TreeState, RhsError> {
        let node = self.fetch(state).await?;
        match (node.node_type(), node.children.as_slice()) {
            (NodeType::State, [claims, revocations, roots]) => {
                Ok(TreeState::new(*claims, *revocations, *roots))
            }
            (node_type, _) => Err(RhsError::UnexpectedNodeType {
                hash: *state,
                node_type,
            }),
        }
    }

    /// Non-revocation proof of `nonce` in the revocation tree of `state`.
    pub async fn revocation_status(
        &self,
        state: &Hash,
        nonce: u64,
    ) -> Result<RevocationStatus, RhsError> {
        let issuer = self.tree_state(state).await?;
        let mtp = self
            .generate_proof(&issuer.revocation_root(), &Hash::from_u64(nonce))
            .await?;
        debug!(
            "revocation nonce {nonce} under state {state}: revoked={}",
            mtp.existence()
        );
        Ok(RevocationStatus { issuer, mtp })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory_rhs::InMemoryNodeStore;

    fn h(v: u64) -> Hash {
        Hash::from_u64(v)
    }

    #[tokio::test]
    async fn test_zero_root_is_empty_tree() {
        let resolver = RhsResolver::new(InMemoryNodeStore::new());
        let proof = resolver.generate_proof(&Hash::ZERO, &h(1)).await.unwrap();
        assert_eq!(proof, Proof::non_existence());
    }

    #[tokio::test]
    async fn test_single_leaf() {
        let store = InMemoryNodeStore::new();
        let leaf = ProofNode::leaf(h(2), h(20));
        store.save_nodes(&[leaf.clone()]).await.unwrap();
        let resolver = RhsResolver::new(store);

        let proof = resolver.generate_proof(&leaf.hash, &h(2)).await.unwrap();
        assert!(proof.existence());
        assert_eq!(proof.depth(), 0);

        let proof = resolver.generate_proof(&leaf.hash, &h(4)).await.unwrap();
        assert!(!proof.existence());
        assert_eq!(
            proof.node_aux(),
            Some(&NodeAux {
                key: h(2),
                value: h(20)
            })
        );
        assert!(proof.verify(&leaf.hash, &h(4), &Hash::ZERO));
    }

    #[tokio::test]
    async fn test_missing_node_is_retryable() {
        let resolver = RhsResolver::new(InMemoryNodeStore::new());
        let err = resolver.generate_proof(&h(9), &h(1)).await.unwrap_err();
        assert!(matches!(err, RhsError::NodeNotFound(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_state_node_mid_walk_is_rejected() {
        let store = InMemoryNodeStore::new();
        let state = ProofNode::state(&TreeState::new(h(1), h(2), h(3)));
        let root = ProofNode::middle(state.hash, Hash::ZERO);
        store.save_nodes(&[state.clone(), root.clone()]).await.unwrap();
        let resolver = RhsResolver::new(store);

        let err = resolver.generate_proof(&root.hash, &h(0)).await.unwrap_err();
        assert!(matches!(
            err,
            RhsError::UnexpectedNodeType {
                node_type: NodeType::State,
                ..
            }
        ));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_walk_deeper_than_bound_fails() {
        let store = InMemoryNodeStore::new();
        let mut nodes = vec![ProofNode::leaf(Hash::ZERO, h(1))];
        for _ in 0..=MAX_PROOF_DEPTH {
            let below = nodes[nodes.len() - 1].hash;
            nodes.push(ProofNode::middle(below, Hash::ZERO));
        }
        let root = nodes[nodes.len() - 1].hash;
        store.save_nodes(&nodes).await.unwrap();
        let resolver = RhsResolver::new(store);

        let err = resolver.generate_proof(&root, &Hash::ZERO).await.unwrap_err();
        assert!(matches!(
            err,
            RhsError::TreeDepthExceeded {
                max: MAX_PROOF_DEPTH
            }
        ));
    }

    #[tokio::test]
    async fn test_forged_node_is_rejected() {
        struct LyingStore;
        impl NodeStore for LyingStore {
            async fn get_node(&self, _hash: &Hash) -> Result<ProofNode, RhsError> {
                Ok(ProofNode::leaf(Hash::from_u64(1), Hash::from_u64(1)))
            }
            async fn save_nodes(&self, _nodes: &[ProofNode]) -> Result<(), RhsError> {
                Ok(())
            }
        }

        let resolver = RhsResolver::new(LyingStore);
        let err = resolver.generate_proof(&h(5), &h(1)).await.unwrap_err();
        assert!(matches!(err, RhsError::HashMismatch { .. }));
    }

    #[tokio::test]
    async fn test_tree_state_requires_state_node() {
        let store = InMemoryNodeStore::new();
        let ts = TreeState::new(h(1), h(2), h(3));
        let middle = ProofNode::middle(h(1), h(2));
        store
            .save_nodes(&[ProofNode::state(&ts), middle.clone()])
            .await
            .unwrap();
        let resolver = RhsResolver::new(store);

        assert_eq!(resolver.tree_state(&ts.state()).await.unwrap(), ts);
        assert!(matches!(
            resolver.tree_state(&middle.hash).await,
            Err(RhsError::UnexpectedNodeType {
                node_type: NodeType::Middle,
                ..
            })
        ));
    }
}
