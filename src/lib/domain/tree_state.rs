use serde::{
    Deserialize,
    Serialize,
};

use super::{
    error::DomainError,
    hash::Hash,
};
use crate::crypto::poseidon::poseidon3;

/// Identity state together with the three roots it commits to.
///
/// `state == Poseidon(claims_root, revocation_root, root_of_roots)` holds for
/// every value of this type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TreeStateParts", into = "TreeStateParts")]
pub struct TreeState {
    state: Hash,
    claims_root: Hash,
    revocation_root: Hash,
    root_of_roots: Hash,
}

impl TreeState {
    pub fn new(claims_root: Hash, revocation_root: Hash, root_of_roots: Hash) -> Self {
        Self {
            state: poseidon3(&claims_root, &revocation_root, &root_of_roots),
            claims_root,
            revocation_root,
            root_of_roots,
        }
    }

    /// Accept an externally supplied state, checking it against its roots.
    pub fn from_parts(
        state: Hash,
        claims_root: Hash,
        revocation_root: Hash,
        root_of_roots: Hash,
    ) -> Result<Self, DomainError> {
        let computed = Self::new(claims_root, revocation_root, root_of_roots);
        if computed.state != state {
            return Err(DomainError::StateMismatch {
                expected: computed.state.to_string(),
                got: state.to_string(),
            });
        }
        Ok(computed)
    }

    pub fn state(&self) -> Hash {
        self.state
    }

    pub fn claims_root(&self) -> Hash {
        self.claims_root
    }

    pub fn revocation_root(&self) -> Hash {
        self.revocation_root
    }

    pub fn root_of_roots(&self) -> Hash {
        self.root_of_roots
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TreeStateParts {
    state: Hash,
    claims_root: Hash,
    revocation_root: Hash,
    root_of_roots: Hash,
}

impl TryFrom<TreeStateParts> for TreeState {
    type Error = DomainError;

    fn try_from(p: TreeStateParts) -> Result<Self, Self::Error> {
        TreeState::from_parts(p.state, p.claims_root, p.revocation_root, p.root_of_roots)
    }
}

impl From<TreeState> for TreeStateParts {
    fn from(t: TreeState) -> Self {
        TreeStateParts {
            state: t.state,
            claims_root: t.claims_root,
            revocation_root: t.revocation_root,
            root_of_roots: t.root_of_roots,
        }
    }
}
