use tracing::info;

use super::resolver::RhsResolver;
use crate::{
    domain::{
        hash::Hash,
        id::{
            Id,
            IdType,
        },
        proof::Proof,
        tree_state::TreeState,
    },
    ports::{
        node_store::{
            NodeStore,
            RhsError,
        },
        state::{
            IdentityStateReader,
            StateError,
        },
    },
};

/// Revocation proof of a claim together with the issuer state it was
/// checked against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevocationStatus {
    pub issuer: TreeState,
    pub mtp: Proof,
}

/// What a caller knows about an issuer that may not have published a state
/// yet. `id_type` pins the network the identifier is expected to live on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenesisContext {
    pub id_type: IdType,
    pub tree_state: TreeState,
}

#[derive(Debug, thiserror::Error)]
pub enum RevocationStatusError {
    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Rhs(#[from] RhsError),

    #[error("identity {0} is not derived from the supplied genesis state")]
    NotGenesis(Id),
}

/// Revocation status of `nonce` for `issuer`, read from the issuer's latest
/// published state.
///
/// An issuer without a published state is only accepted with a `genesis`
/// context whose state derives `issuer` under `genesis.id_type`.
pub async fn resolve_revocation_status<R, S>(
    states: &R,
    resolver: &RhsResolver<S>,
    issuer: &Id,
    nonce: u64,
    genesis: Option<&GenesisContext>,
) -> Result<RevocationStatus, RevocationStatusError>
where
    R: IdentityStateReader,
    S: NodeStore,
{
    let state = match states.latest_state(issuer).await {
        Ok(state) => state,
        Err(err @ StateError::IdentityNotFound(_)) => {
            let Some(genesis) = genesis else {
                return Err(err.into());
            };
            return genesis_status(resolver, issuer, nonce, genesis).await;
        }
        Err(err) => return Err(err.into()),
    };

    Ok(resolver.revocation_status(&state, nonce).await?)
}

async fn genesis_status<S: NodeStore>(
    resolver: &RhsResolver<S>,
    issuer: &Id,
    nonce: u64,
    genesis: &GenesisContext,
) -> Result<RevocationStatus, RevocationStatusError> {
    let tree_state = genesis.tree_state;
    if !Id::is_genesis_state(issuer, &tree_state.state(), genesis.id_type) {
        return Err(RevocationStatusError::NotGenesis(*issuer));
    }
    info!("issuer {issuer} has no published state, using genesis state");

    let revocation_root = tree_state.revocation_root();
    let mtp = if revocation_root.is_zero() {
        Proof::non_existence()
    } else {
        resolver
            .generate_proof(&revocation_root, &Hash::from_u64(nonce))
            .await?
    };
    Ok(RevocationStatus {
        issuer: tree_state,
        mtp,
    })
}
