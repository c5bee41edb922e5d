pub mod http_rhs;
pub mod memory_rhs;
pub mod memory_state;
pub mod sparse_merkle_tree;
