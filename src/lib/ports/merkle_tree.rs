use crate::domain::{
    error::DomainError,
    hash::Hash,
    proof::Proof,
};

/// Value stored under a key plus the dense sibling path down to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub value: Hash,
    pub siblings: Vec<Hash>,
}

/// Read access to a local sparse Merkle tree, as the RHS publisher and
/// circuit callers need it.
pub trait MerkleTreeReader {
    fn root(&self) -> Hash;

    /// Entry stored under `key` in the current tree.
    fn get(&self, key: &Hash) -> Result<TreeEntry, TreeError>;

    /// Inclusion or non-inclusion proof of `key` against `root`, which may be
    /// any root the tree has had.
    fn generate_proof(&self, key: &Hash, root: &Hash) -> Result<Proof, TreeError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    #[error("key not found: {0}")]
    KeyNotFound(Hash),

    #[error("key already exists: {0}")]
    KeyAlreadyExists(Hash),

    #[error("reached maximum level {0}")]
    ReachedMaxLevel(usize),

    #[error("node not found: {0}")]
    NodeNotFound(Hash),

    #[error(transparent)]
    Domain(#[from] DomainError),
}
