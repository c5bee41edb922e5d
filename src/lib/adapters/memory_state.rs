use std::collections::HashMap;

use tokio::sync::Mutex;

use crate::{
    domain::{
        hash::Hash,
        id::Id,
    },
    ports::state::{
        IdentityStateReader,
        StateError,
    },
};

/// In-memory registry of the latest state of each identity, standing in for
/// the on-chain state contract.
pub struct InMemoryStateRegistry {
    states: Mutex<HashMap<Id, Hash>>,
}

impl InMemoryStateRegistry {
    pub fn new() -> Self {
        Self {
            states: Mutex::new(HashMap::new()),
        }
    }

    /// Record `state` as the latest state of `id`, replacing any earlier one.
    pub async fn publish(&self, id: Id, state: Hash) {
        self.states.lock().await.insert(id, state);
    }
}

impl Default for InMemoryStateRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityStateReader for InMemoryStateRegistry {
    async fn latest_state(&self, id: &Id) -> Result<Hash, StateError> {
        let states = self.states.lock().await;
        states
            .get(id)
            .copied()
            .ok_or(StateError::IdentityNotFound(*id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::id::IdType;

    #[tokio::test]
    async fn test_latest_state_wins() {
        let registry = InMemoryStateRegistry::new();
        let id = Id::from_genesis_state(IdType::new(1, 0x21), &Hash::from_u64(1));
        assert!(matches!(
            registry.latest_state(&id).await,
            Err(StateError::IdentityNotFound(_))
        ));

        registry.publish(id, Hash::from_u64(1)).await;
        registry.publish(id, Hash::from_u64(2)).await;
        assert_eq!(registry.latest_state(&id).await.unwrap(), Hash::from_u64(2));
    }
}
