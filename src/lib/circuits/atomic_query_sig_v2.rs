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
        ClaimWithSigProof,
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
    signature::Signature,
};

/// Query a credential signed by the issuer's BabyJubJub key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomicQuerySigV2Inputs {
    pub request_id: Option<U256>,
    pub id: Id,
    pub profile_nonce: U256,
    pub claim_subject_profile_nonce: U256,
    pub issuer_id: Id,
    pub claim: ClaimWithSigProof,
    pub skip_claim_revocation_check: bool,
    pub current_time_stamp: u64,
    pub query: Query,
}

pub(crate) struct Parts<'a> {
    request_id: U256,
    non_rev_mtp: &'a Proof,
    issuer_auth_inc_mtp: &'a Proof,
    issuer_auth_non_rev_mtp: &'a Proof,
    signature: &'a Signature,
}

impl AtomicQuerySigV2Inputs {
    pub(crate) fn require_request_id(&self, circuit: CircuitId) -> Result<U256, CircuitError> {
        self.request_id.ok_or(CircuitError::EmptyRequestId(circuit))
    }

    /// Credential, issuer-signature and query checks.
    pub(crate) fn claim_parts(
        &self,
        circuit: CircuitId,
        request_id: U256,
    ) -> Result<Parts<'_>, CircuitError> {
        let sig_proof = &self.claim.signature_proof;
        let parts = Parts {
            request_id,
            non_rev_mtp: self
                .claim
                .non_rev_proof
                .proof
                .as_ref()
                .ok_or(CircuitError::EmptyClaimNonRevProof(circuit))?,
            issuer_auth_inc_mtp: sig_proof
                .issuer_auth_inc_proof
                .proof
                .as_ref()
                .ok_or(CircuitError::EmptyIssuerAuthClaimProof(circuit))?,
            issuer_auth_non_rev_mtp: sig_proof
                .issuer_auth_non_rev_proof
                .proof
                .as_ref()
                .ok_or(CircuitError::EmptyIssuerAuthClaimNonRevProof(circuit))?,
            signature: sig_proof
                .signature
                .as_ref()
                .ok_or(CircuitError::EmptyClaimSignature(circuit))?,
        };
        if self.query.values.is_none() && self.query.operator != Operator::Noop {
            return Err(CircuitError::EmptyQueryValue(circuit));
        }
        if let Some(value_proof) = &self.query.value_proof {
            check_value_proof(circuit, value_proof)?;
        }
        Ok(parts)
    }

    fn parts(&self) -> Result<Parts<'_>, CircuitError> {
        let request_id = self.require_request_id(CircuitId::AtomicQuerySigV2)?;
        self.claim_parts(CircuitId::AtomicQuerySigV2, request_id)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AtomicQuerySigV2CircuitInputs<'a> {
    #[serde(rename = "requestID")]
    request_id: String,
    #[serde(rename = "userGenesisID")]
    user_genesis_id: String,
    profile_nonce: String,
    claim_subject_profile_nonce: String,
    #[serde(rename = "issuerID")]
    issuer_id: String,
    issuer_claim: &'a Claim,
    issuer_claim_non_rev_claims_tree_root: Hash,
    issuer_claim_non_rev_rev_tree_root: Hash,
    issuer_claim_non_rev_roots_tree_root: Hash,
    issuer_claim_non_rev_state: Hash,
    issuer_claim_non_rev_mtp: Vec<String>,
    issuer_claim_non_rev_mtp_aux_hi: Hash,
    issuer_claim_non_rev_mtp_aux_hv: Hash,
    issuer_claim_non_rev_mtp_no_aux: &'static str,
    issuer_claim_signature_r8x: String,
    issuer_claim_signature_r8y: String,
    issuer_claim_signature_s: String,
    issuer_auth_claim: &'a Claim,
    issuer_auth_claim_mtp: Vec<String>,
    issuer_auth_claim_non_rev_mtp: Vec<String>,
    issuer_auth_claim_non_rev_mtp_aux_hi: Hash,
    issuer_auth_claim_non_rev_mtp_aux_hv: Hash,
    issuer_auth_claim_non_rev_mtp_no_aux: &'static str,
    issuer_auth_claims_tree_root: Hash,
    issuer_auth_rev_tree_root: Hash,
    issuer_auth_roots_tree_root: Hash,
    is_revocation_checked: &'static str,
    claim_schema: String,
    #[serde(flatten)]
    claim_path: ClaimPathInputs,
    operator: String,
    slot_index: String,
    timestamp: String,
    value: Vec<String>,
}

impl<'a> AtomicQuerySigV2CircuitInputs<'a> {
    pub(crate) fn new(
        circuit: CircuitId,
        inputs: &'a AtomicQuerySigV2Inputs,
        parts: &Parts<'a>,
        config: &CircuitConfig,
    ) -> Result<Self, CircuitError> {
        let claim = &inputs.claim;
        let sig_proof = &claim.signature_proof;
        let non_rev_state = &claim.non_rev_proof.tree_state;
        let issuer_auth_state = &sig_proof.issuer_auth_inc_proof.tree_state;

        let (non_rev_mtp, non_rev_aux) = encode_with_aux(
            circuit,
            "issuerClaimNonRevMtp",
            parts.non_rev_mtp,
            config.mt_level_claim,
        )?;
        let (auth_non_rev_mtp, auth_non_rev_aux) = encode_with_aux(
            circuit,
            "issuerAuthClaimNonRevMtp",
            parts.issuer_auth_non_rev_mtp,
            config.mt_level,
        )?;

        Ok(Self {
            request_id: parts.request_id.to_string(),
            user_genesis_id: inputs.id.big_int().to_string(),
            profile_nonce: inputs.profile_nonce.to_string(),
            claim_subject_profile_nonce: inputs.claim_subject_profile_nonce.to_string(),
            issuer_id: inputs.issuer_id.big_int().to_string(),
            issuer_claim: &claim.claim,
            issuer_claim_non_rev_claims_tree_root: non_rev_state.claims_root(),
            issuer_claim_non_rev_rev_tree_root: non_rev_state.revocation_root(),
            issuer_claim_non_rev_roots_tree_root: non_rev_state.root_of_roots(),
            issuer_claim_non_rev_state: non_rev_state.state(),
            issuer_claim_non_rev_mtp: non_rev_mtp,
            issuer_claim_non_rev_mtp_aux_hi: non_rev_aux.key,
            issuer_claim_non_rev_mtp_aux_hv: non_rev_aux.value,
            issuer_claim_non_rev_mtp_no_aux: flag(non_rev_aux.no_aux),
            issuer_claim_signature_r8x: parts.signature.r8_x.to_string(),
            issuer_claim_signature_r8y: parts.signature.r8_y.to_string(),
            issuer_claim_signature_s: parts.signature.s.to_string(),
            issuer_auth_claim: &sig_proof.issuer_auth_claim,
            issuer_auth_claim_mtp: encode_siblings(
                circuit,
                "issuerAuthClaimMtp",
                parts.issuer_auth_inc_mtp,
                config.mt_level,
            )?,
            issuer_auth_claim_non_rev_mtp: auth_non_rev_mtp,
            issuer_auth_claim_non_rev_mtp_aux_hi: auth_non_rev_aux.key,
            issuer_auth_claim_non_rev_mtp_aux_hv: auth_non_rev_aux.value,
            issuer_auth_claim_non_rev_mtp_no_aux: flag(auth_non_rev_aux.no_aux),
            issuer_auth_claims_tree_root: issuer_auth_state.claims_root(),
            issuer_auth_rev_tree_root: issuer_auth_state.revocation_root(),
            issuer_auth_roots_tree_root: issuer_auth_state.root_of_roots(),
            is_revocation_checked: flag(!inputs.skip_claim_revocation_check),
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

impl CircuitInputs for AtomicQuerySigV2Inputs {
    fn circuit_id(&self) -> CircuitId {
        CircuitId::AtomicQuerySigV2
    }

    fn validate(&self) -> Result<(), CircuitError> {
        self.parts().map(|_| ())
    }

    fn marshal(&self, config: &CircuitConfig) -> Result<Vec<u8>, CircuitError> {
        let parts = self.parts()?;
        let inputs =
            AtomicQuerySigV2CircuitInputs::new(CircuitId::AtomicQuerySigV2, self, &parts, config)?;
        Ok(serde_json::to_vec(&inputs)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomicQuerySigV2PubSignals {
    pub merklized: bool,
    pub user_id: Id,
    pub issuer_auth_state: Hash,
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

impl AtomicQuerySigV2PubSignals {
    pub const FIXED_SIGNALS: usize = 13;
}

impl PubSignals for AtomicQuerySigV2PubSignals {
    fn unmarshal(data: &[u8], config: &CircuitConfig) -> Result<Self, CircuitError> {
        let expected = Self::FIXED_SIGNALS + config.value_array_size;
        let mut r = SignalReader::parse(CircuitId::AtomicQuerySigV2, data, expected)?;
        Ok(Self {
            merklized: r.flag()?,
            user_id: r.id()?,
            issuer_auth_state: r.hash()?,
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
