//! iden3 proof plumbing: circuit input encoding, public signal decoding and
//! Reverse Hash Service (RHS) publication and resolution of sparse Merkle
//! tree proofs.

pub mod adapters;
pub mod circuits;
pub mod config;
pub mod crypto;
pub mod domain;
pub mod ports;
pub mod rhs;
pub mod server;

pub use domain::{
    claim::{
        Claim,
        SchemaHash,
    },
    error::DomainError,
    hash::Hash,
    id::{
        Id,
        IdType,
    },
    proof::{
        NodeAux,
        Proof,
        SparseSiblings,
    },
    signature::Signature,
    tree_state::TreeState,
};
