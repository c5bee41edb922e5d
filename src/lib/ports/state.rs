use std::future::Future;

use crate::domain::{
    hash::Hash,
    id::Id,
};

/// Port for looking up the latest published state of an identity
/// (on-chain state contract or an indexer in front of it).
///
/// Implementations:
/// - `InMemoryStateRegistry` (for tests)
pub trait IdentityStateReader: Send + Sync {
    fn latest_state(&self, id: &Id) -> impl Future<Output = Result<Hash, StateError>> + Send;
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    /// The identity never published a state; it may still be in genesis.
    #[error("identity {0} not found")]
    IdentityNotFound(Id),

    #[error("state lookup failed: {0}")]
    Lookup(String),
}
