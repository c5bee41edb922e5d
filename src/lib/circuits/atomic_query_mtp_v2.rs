use alloy_primitives::U256;
use serde::Serialize;

use super::{
    common::{
        check_value_proof,
        encode_siblings,
        encode_values,
        encode_with_aux,
        flag,
        ClaimPathInputs,
    },
    config::CircuitConfig,
    error::{
        CircuitError,
        CircuitId,
    },
    signals::SignalReader,
    types::{
        ClaimWithMtpProof,
        Operator,
        Query,
    },
    CircuitInputs,
    PubSignals,
};
use crate::domain::{
    claim::{
        Claim,
        SchemaHash,
    },
    hash::Hash,
    id::Id,
    proof::Proof,
};

/// Query a credential the issuer has published in its claims tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomicQueryMtpV2Inputs {
    pub request_id: Option<U256>,
    pub id: Id,
    pub profile_nonce: U256,
    pub claim_subject_profile_nonce: U256,
    pub issuer_id: Id,
    pub claim: ClaimWithMtpProof,
    pub skip_claim_revocation_check: bool,
    pub current_time_stamp: u64,
    pub query: Query,
}

pub(crate) struct Parts<'a> {
    request_id: U256,
    inc_mtp: &'a Proof,
    non_rev_mtp: &'a Proof,
}

impl AtomicQueryMtpV2Inputs {
    /// Request-level checks shared with the on-chain variant.
    pub(crate) fn require_request_id(&self, circuit: CircuitId) -> Result<U256, CircuitError> {
        self.request_id.ok_or(CircuitError::EmptyRequestId(circuit))
    }

    /// Credential-level checks, run after the request and auth checks.
    pub(crate) fn claim_parts(
        &self,
        circuit: CircuitId,
        request_id: U256,
    ) -> Result<Parts<'_>, CircuitError> {
        let inc_mtp = self
            .claim
            .inc_proof
            .proof
            .as_ref()
            .ok_or(CircuitError::EmptyClaimProof(circuit))?;
        let non_rev_mtp = self
            .claim
            .non_rev_proof
            .proof
            .as_ref()
            .ok_or(CircuitError::EmptyClaimNonRevProof(circuit))?;
        if let Some(value_proof) = &self.query.value_proof {
            check_value_proof(circuit, value_proof)?;
        }
        Ok(Parts {
            request_id,
            inc_mtp,
            non_rev_mtp,
        })
    }

    fn parts(&self) -> Result<Parts<'_>, CircuitError> {
        let request_id = self.require_request_id(CircuitId::AtomicQueryMtpV2)?;
        self.claim_parts(CircuitId::AtomicQueryMtpV2, request_id)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AtomicQueryMtpV2CircuitInputs<'a> {
    #[serde(rename = "requestID")]
    request_id: String,
    #[serde(rename = "userGenesisID")]
    user_genesis_id: String,
    profile_nonce: String,
    claim_subject_profile_nonce: String,
    #[serde(rename = "issuerID")]
    issuer_id: String,
    issuer_claim: &'a Claim,
    issuer_claim_mtp: Vec<String>,
    issuer_claim_claims_tree_root: Hash,
    issuer_claim_rev_tree_root: Hash,
    issuer_claim_roots_tree_root: Hash,
    issuer_claim_iden_state: Hash,
    is_revocation_checked: &'static str,
    issuer_claim_non_rev_claims_tree_root: Hash,
    issuer_claim_non_rev_rev_tree_root: Hash,
    issuer_claim_non_rev_roots_tree_root: Hash,
    issuer_claim_non_rev_state: Hash,
    issuer_claim_non_rev_mtp: Vec<String>,
    issuer_claim_non_rev_mtp_aux_hi: Hash,
    issuer_claim_non_rev_mtp_aux_hv: Hash,
    issuer_claim_non_rev_mtp_no_aux: &'static str,
    claim_schema: String,
    #[serde(flatten)]
    claim_path: ClaimPathInputs,
    operator: String,
    slot_index: String,
    timestamp: String,
    value: Vec<String>,
}

impl<'a> AtomicQueryMtpV2CircuitInputs<'a> {
    pub(crate) fn new(
        circuit: CircuitId,
        inputs: &'a AtomicQueryMtpV2Inputs,
        parts: &Parts<'a>,
        config: &CircuitConfig,
    ) -> Result<Self, CircuitError> {
        let claim = &inputs.claim;
        let inc_state = &claim.inc_proof.tree_state;
        let non_rev_state = &claim.non_rev_proof.tree_state;
        let (non_rev_mtp, non_rev_aux) = encode_with_aux(
            circuit,
            "issuerClaimNonRevMtp",
            parts.non_rev_mtp,
            config.mt_level_claim,
        )?;

        Ok(Self {
            request_id: parts.request_id.to_string(),
            user_genesis_id: inputs.id.big_int().to_string(),
            profile_nonce: inputs.profile_nonce.to_string(),
            claim_subject_profile_nonce: inputs.claim_subject_profile_nonce.to_string(),
            issuer_id: inputs.issuer_id.big_int().to_string(),
            issuer_claim: &claim.claim,
            issuer_claim_mtp: encode_siblings(
                circuit,
                "issuerClaimMtp",
                parts.inc_mtp,
                config.mt_level_claim,
            )?,
            issuer_claim_claims_tree_root: inc_state.claims_root(),
            issuer_claim_rev_tree_root: inc_state.revocation_root(),
            issuer_claim_roots_tree_root: inc_state.root_of_roots(),
            issuer_claim_iden_state: inc_state.state(),
            is_revocation_checked: flag(!inputs.skip_claim_revocation_check),
            issuer_claim_non_rev_claims_tree_root: non_rev_state.claims_root(),
            issuer_claim_non_rev_rev_tree_root: non_rev_state.revocation_root(),
            issuer_claim_non_rev_roots_tree_root: non_rev_state.root_of_roots(),
            issuer_claim_non_rev_state: non_rev_state.state(),
            issuer_claim_non_rev_mtp: non_rev_mtp,
            issuer_claim_non_rev_mtp_aux_hi: non_rev_aux.key,
            issuer_claim_non_rev_mtp_aux_hv: non_rev_aux.value,
            issuer_claim_non_rev_mtp_no_aux: flag(non_rev_aux.no_aux),
            claim_schema: claim.claim.schema_hash().big_int().to_string(),
            claim_path: ClaimPathInputs::new(
                circuit,
                inputs.query.value_proof.as_ref(),
                config.mt_level_claims_merklization,
            )?,
            operator: inputs.query.operator.code().to_string(),
            slot_index: inputs.query.slot_index.to_string(),
            timestamp: inputs.current_time_stamp.to_string(),
            value: encode_values(circuit, inputs.query.values(), config.value_array_size)?,
        })
    }
}

impl CircuitInputs for AtomicQueryMtpV2Inputs {
    fn circuit_id(&self) -> CircuitId {
        CircuitId::AtomicQueryMtpV2
    }

    fn validate(&self) -> Result<(), CircuitError> {
        self.parts().map(|_| ())
    }

    fn marshal(&self, config: &CircuitConfig) -> Result<Vec<u8>, CircuitError> {
        let parts = self.parts()?;
        let inputs =
            AtomicQueryMtpV2CircuitInputs::new(CircuitId::AtomicQueryMtpV2, self, &parts, config)?;
        Ok(serde_json::to_vec(&inputs)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomicQueryMtpV2PubSignals {
    pub merklized: bool,
    pub user_id: Id,
    pub issuer_claim_iden_state: Hash,
    pub request_id: U256,
    pub issuer_id: Id,
    pub is_revocation_checked: bool,
    pub issuer_claim_non_rev_state: Hash,
    pub timestamp: u64,
    pub claim_schema: SchemaHash,
    pub claim_path_not_exists: bool,
    pub claim_path_key: U256,
    pub slot_index: u32,
    pub operator: Operator,
    pub value: Vec<U256>,
}

impl AtomicQueryMtpV2PubSignals {
    /// Signals preceding the value array.
    pub const FIXED_SIGNALS: usize = 13;
}

impl PubSignals for AtomicQueryMtpV2PubSignals {
    fn unmarshal(data: &[u8], config: &CircuitConfig) -> Result<Self, CircuitError> {
        let expected = Self::FIXED_SIGNALS + config.value_array_size;
        let mut r = SignalReader::parse(CircuitId::AtomicQueryMtpV2, data, expected)?;
        Ok(Self {
            merklized: r.flag()?,
            user_id: r.id()?,
            issuer_claim_iden_state: r.hash()?,
            request_id: r.big_int()?,
            issuer_id: r.id()?,
            is_revocation_checked: r.flag()?,
            issuer_claim_non_rev_state: r.hash()?,
            timestamp: r.u64()?,
            claim_schema: r.schema()?,
            claim_path_not_exists: r.flag()?,
            claim_path_key: r.big_int()?,
            slot_index: r.u32()?,
            operator: r.operator()?,
            value: r.rest()?,
        })
    }
}
