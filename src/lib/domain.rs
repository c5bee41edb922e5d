pub mod claim;
pub mod error;
pub mod hash;
pub mod id;
pub mod proof;
pub mod signature;
pub mod tree_state;
