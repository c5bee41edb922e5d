use alloy_primitives::U256;
use serde::Serialize;

use super::{
    atomic_query_mtp_v2::{
        AtomicQueryMtpV2CircuitInputs,
        AtomicQueryMtpV2Inputs,
    },
    config::CircuitConfig,
    error::{
        CircuitError,
        CircuitId,
    },
    signals::SignalReader,
    user_auth::{
        UserAuthCircuitInputs,
        UserAuthInputs,
    },
    CircuitInputs,
    PubSignals,
};
use crate::domain::{
    hash::Hash,
    id::Id,
};

const CIRCUIT: CircuitId = CircuitId::AtomicQueryMtpV2OnChain;

/// The MTP query plus a proof that the requester controls its identity,
/// verified against the on-chain GIST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomicQueryMtpV2OnChainInputs {
    pub query: AtomicQueryMtpV2Inputs,
    pub auth: UserAuthInputs,
}

#[derive(Serialize)]
struct OnChainCircuitInputs<'a> {
    #[serde(flatten)]
    query: AtomicQueryMtpV2CircuitInputs<'a>,
    #[serde(flatten)]
    auth: UserAuthCircuitInputs<'a>,
}

impl CircuitInputs for AtomicQueryMtpV2OnChainInputs {
    fn circuit_id(&self) -> CircuitId {
        CIRCUIT
    }

    fn validate(&self) -> Result<(), CircuitError> {
        let request_id = self.query.require_request_id(CIRCUIT)?;
        self.auth.parts(CIRCUIT)?;
        self.query.claim_parts(CIRCUIT, request_id)?;
        Ok(())
    }

    fn marshal(&self, config: &CircuitConfig) -> Result<Vec<u8>, CircuitError> {
        let request_id = self.query.require_request_id(CIRCUIT)?;
        let auth = self.auth.parts(CIRCUIT)?;
        let claim = self.query.claim_parts(CIRCUIT, request_id)?;

        let inputs = OnChainCircuitInputs {
            query: AtomicQueryMtpV2CircuitInputs::new(CIRCUIT, &self.query, &claim, config)?,
            auth: UserAuthCircuitInputs::new(CIRCUIT, &auth, config)?,
        };
        Ok(serde_json::to_vec(&inputs)?)
    }
}

/// Fixed-size outputs; the query values are folded into `circuit_query_hash`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomicQueryMtpV2OnChainPubSignals {
    pub merklized: bool,
    pub user_id: Id,
    pub circuit_query_hash: U256,
    pub request_id: U256,
    pub challenge: U256,
    pub gist_root: Hash,
    pub issuer_id: Id,
    pub issuer_claim_iden_state: Hash,
    pub is_revocation_checked: bool,
    pub issuer_claim_non_rev_state: Hash,
    pub timestamp: u64,
}

impl AtomicQueryMtpV2OnChainPubSignals {
    pub const SIGNALS: usize = 11;
}

impl PubSignals for AtomicQueryMtpV2OnChainPubSignals {
    fn unmarshal(data: &[u8], _config: &CircuitConfig) -> Result<Self, CircuitError> {
        let mut r = SignalReader::parse(CIRCUIT, data, Self::SIGNALS)?;
        Ok(Self {
            merklized: r.flag()?,
            user_id: r.id()?,
            circuit_query_hash: r.big_int()?,
            request_id: r.big_int()?,
            challenge: r.big_int()?,
            gist_root: r.hash()?,
            issuer_id: r.id()?,
            issuer_claim_iden_state: r.hash()?,
            is_revocation_checked: r.flag()?,
            issuer_claim_non_rev_state: r.hash()?,
            timestamp: r.u64()?,
        })
    }
}
