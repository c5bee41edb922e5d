use std::collections::HashMap;

use crate::{
    crypto::poseidon::poseidon2,
    domain::{
        hash::Hash,
        proof::{
            leaf_key,
            NodeAux,
            Proof,
        },
    },
    ports::merkle_tree::{
        MerkleTreeReader,
        TreeEntry,
        TreeError,
    },
};

#[derive(Debug, Clone, Copy)]
enum TreeNode {
    Leaf { key: Hash, value: Hash },
    Middle { left: Hash, right: Hash },
}

/// In-memory iden3 sparse Merkle tree.
///
/// Nodes are content addressed and never removed, so proofs can be generated
/// against any root the tree has had. A leaf sits at the shallowest level
/// where its key prefix is unique; inserting a colliding key pushes both
/// leaves down until their paths diverge.
pub struct SparseMerkleTree {
    nodes: HashMap<Hash, TreeNode>,
    root: Hash,
    max_levels: usize,
    /// Roots after each insertion, oldest first.
    root_history: Vec<Hash>,
}

impl SparseMerkleTree {
    pub fn new(max_levels: usize) -> Self {
        Self {
            nodes: HashMap::new(),
            root: Hash::ZERO,
            max_levels,
            root_history: Vec::new(),
        }
    }

    pub fn max_levels(&self) -> usize {
        self.max_levels
    }

    pub fn is_known_root(&self, root: &Hash) -> bool {
        root.is_zero() || self.root_history.contains(root)
    }

    pub fn root_history(&self) -> &[Hash] {
        &self.root_history
    }

    /// Insert `value` under `key`.
    pub fn add(&mut self, key: Hash, value: Hash) -> Result<(), TreeError> {
        let root = self.add_leaf(key, value, self.root, 0)?;
        self.root = root;
        self.root_history.push(root);
        Ok(())
    }

    fn node(&self, hash: &Hash) -> Result<Option<TreeNode>, TreeError> {
        if hash.is_zero() {
            return Ok(None);
        }
        self.nodes
            .get(hash)
            .copied()
            .map(Some)
            .ok_or(TreeError::NodeNotFound(*hash))
    }

    fn store_leaf(&mut self, key: Hash, value: Hash) -> Hash {
        let hash = leaf_key(&key, &value);
        self.nodes.insert(hash, TreeNode::Leaf { key, value });
        hash
    }

    fn store_middle(&mut self, left: Hash, right: Hash) -> Hash {
        let hash = poseidon2(&left, &right);
        self.nodes.insert(hash, TreeNode::Middle { left, right });
        hash
    }

    fn add_leaf(&mut self, key: Hash, value: Hash, at: Hash, level: usize) -> Result<Hash, TreeError> {
        if level >= self.max_levels {
            return Err(TreeError::ReachedMaxLevel(self.max_levels));
        }
        match self.node(&at)? {
            None => Ok(self.store_leaf(key, value)),
            Some(TreeNode::Leaf {
                key: old_key,
                value: old_value,
            }) => {
                if old_key == key {
                    return Err(TreeError::KeyAlreadyExists(key));
                }
                let old_leaf = leaf_key(&old_key, &old_value);
                self.push_leaf(key, value, &old_key, old_leaf, level)
            }
            Some(TreeNode::Middle { left, right }) => {
                if key.test_bit(level) {
                    let right = self.add_leaf(key, value, right, level + 1)?;
                    Ok(self.store_middle(left, right))
                } else {
                    let left = self.add_leaf(key, value, left, level + 1)?;
                    Ok(self.store_middle(left, right))
                }
            }
        }
    }

    /// Push the existing leaf `old_leaf` down until its path and the new
    /// key's path diverge.
    fn push_leaf(
        &mut self,
        key: Hash,
        value: Hash,
        old_key: &Hash,
        old_leaf: Hash,
        level: usize,
    ) -> Result<Hash, TreeError> {
        if level + 2 > self.max_levels {
            return Err(TreeError::ReachedMaxLevel(self.max_levels));
        }
        let new_bit = key.test_bit(level);
        if new_bit == old_key.test_bit(level) {
            let below = self.push_leaf(key, value, old_key, old_leaf, level + 1)?;
            return Ok(if new_bit {
                self.store_middle(Hash::ZERO, below)
            } else {
                self.store_middle(below, Hash::ZERO)
            });
        }

        let new_leaf = self.store_leaf(key, value);
        Ok(if new_bit {
            self.store_middle(old_leaf, new_leaf)
        } else {
            self.store_middle(new_leaf, old_leaf)
        })
    }

    /// Walk from `root` towards `key`, collecting siblings, until reaching an
    /// empty subtree or a leaf.
    fn walk(&self, root: &Hash, key: &Hash) -> Result<(Vec<Hash>, Option<(Hash, Hash)>), TreeError> {
        let mut siblings = Vec::new();
        let mut next = *root;
        for level in 0..self.max_levels {
            match self.node(&next)? {
                None => return Ok((siblings, None)),
                Some(TreeNode::Leaf { key: found, value }) => {
                    return Ok((siblings, Some((found, value))));
                }
                Some(TreeNode::Middle { left, right }) => {
                    if key.test_bit(level) {
                        siblings.push(left);
                        next = right;
                    } else {
                        siblings.push(right);
                        next = left;
                    }
                }
            }
        }
        Err(TreeError::ReachedMaxLevel(self.max_levels))
    }
}

impl MerkleTreeReader for SparseMerkleTree {
    fn root(&self) -> Hash {
        self.root
    }

    fn get(&self, key: &Hash) -> Result<TreeEntry, TreeError> {
        match self.walk(&self.root, key)? {
            (siblings, Some((found, value))) if found == *key => Ok(TreeEntry { value, siblings }),
            _ => Err(TreeError::KeyNotFound(*key)),
        }
    }

    fn generate_proof(&self, key: &Hash, root: &Hash) -> Result<Proof, TreeError> {
        let proof = match self.walk(root, key)? {
            (siblings, Some((found, _))) if found == *key => Proof::new(true, &siblings, None)?,
            (siblings, Some((found, value))) => Proof::new(
                false,
                &siblings,
                Some(NodeAux {
                    key: found,
                    value,
                }),
            )?,
            (siblings, None) => Proof::new(false, &siblings, None)?,
        };
        Ok(proof)
    }
}
