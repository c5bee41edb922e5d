use thiserror::Error;

/// Errors raised while building or parsing domain values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("invalid decimal: {0}")]
    InvalidDecimal(String),

    #[error("expected {expected} bytes, got {got}")]
    InvalidLength { expected: usize, got: usize },

    #[error("claim index slot {0} is out of range")]
    InvalidSlot(usize),

    #[error("value is not a BN254 field element: {0}")]
    NotInField(String),

    #[error("proof depth {depth} exceeds maximum {max}")]
    ProofTooDeep { depth: usize, max: usize },

    #[error("existence proof cannot carry a node aux")]
    AuxOnExistenceProof,

    #[error("non-existence proof node aux key equals the queried key")]
    AuxKeyMatchesQuery,

    #[error("tree state mismatch: expected {expected}, got {got}")]
    StateMismatch { expected: String, got: String },

    #[error("identifier does not fit into 31 bytes: {0}")]
    IdTooLarge(String),
}
