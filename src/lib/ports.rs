pub mod merkle_tree;
pub mod node_store;
pub mod state;

pub use merkle_tree::{
    MerkleTreeReader,
    TreeEntry,
    TreeError,
};
pub use node_store::{
    NodeStore,
    RhsError,
};
pub use state::{
    IdentityStateReader,
    StateError,
};
