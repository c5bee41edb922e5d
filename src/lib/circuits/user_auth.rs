//! The user-authentication block appended by the on-chain query circuits.

use alloy_primitives::U256;
use serde::Serialize;

use super::{
    common::{
        encode_siblings,
        encode_with_aux,
        flag,
    },
    config::CircuitConfig,
    error::{
        CircuitError,
        CircuitId,
    },
    types::GistProof,
};
use crate::domain::{
    claim::Claim,
    hash::Hash,
    proof::Proof,
    signature::Signature,
    tree_state::TreeState,
};

/// Proof that the requesting user controls its identity right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAuthInputs {
    pub auth_claim: Claim,
    pub auth_claim_inc_mtp: Option<Proof>,
    pub auth_claim_non_rev_mtp: Option<Proof>,
    pub tree_state: TreeState,
    pub gist_proof: GistProof,
    pub signature: Option<Signature>,
    pub challenge: Option<U256>,
}

pub(crate) struct UserAuthParts<'a> {
    inputs: &'a UserAuthInputs,
    inc_mtp: &'a Proof,
    non_rev_mtp: &'a Proof,
    gist_mtp: &'a Proof,
    signature: &'a Signature,
    challenge: U256,
}

impl UserAuthInputs {
    pub(crate) fn parts(&self, circuit: CircuitId) -> Result<UserAuthParts<'_>, CircuitError> {
        Ok(UserAuthParts {
            inputs: self,
            inc_mtp: self
                .auth_claim_inc_mtp
                .as_ref()
                .ok_or(CircuitError::EmptyAuthClaimProof(circuit))?,
            non_rev_mtp: self
                .auth_claim_non_rev_mtp
                .as_ref()
                .ok_or(CircuitError::EmptyAuthClaimNonRevProof(circuit))?,
            gist_mtp: self
                .gist_proof
                .proof
                .as_ref()
                .ok_or(CircuitError::EmptyGistProof(circuit))?,
            signature: self
                .signature
                .as_ref()
                .ok_or(CircuitError::EmptyChallengeSignature(circuit))?,
            challenge: self.challenge.ok_or(CircuitError::EmptyChallenge(circuit))?,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserAuthCircuitInputs<'a> {
    auth_claim: &'a Claim,
    auth_claim_inc_mtp: Vec<String>,
    auth_claim_non_rev_mtp: Vec<String>,
    auth_claim_non_rev_mtp_aux_hi: Hash,
    auth_claim_non_rev_mtp_aux_hv: Hash,
    auth_claim_non_rev_mtp_no_aux: &'static str,
    challenge: String,
    challenge_signature_r8x: String,
    challenge_signature_r8y: String,
    challenge_signature_s: String,
    user_claims_tree_root: Hash,
    user_rev_tree_root: Hash,
    user_roots_tree_root: Hash,
    user_state: Hash,
    gist_root: Hash,
    gist_mtp: Vec<String>,
    gist_mtp_aux_hi: Hash,
    gist_mtp_aux_hv: Hash,
    gist_mtp_no_aux: &'static str,
}

impl<'a> UserAuthCircuitInputs<'a> {
    pub(crate) fn new(
        circuit: CircuitId,
        parts: &UserAuthParts<'a>,
        config: &CircuitConfig,
    ) -> Result<Self, CircuitError> {
        let inputs = parts.inputs;
        let inc_mtp = encode_siblings(circuit, "authClaimIncMtp", parts.inc_mtp, config.mt_level)?;
        let (non_rev_mtp, non_rev_aux) =
            encode_with_aux(circuit, "authClaimNonRevMtp", parts.non_rev_mtp, config.mt_level)?;
        let (gist_mtp, gist_aux) =
            encode_with_aux(circuit, "gistMtp", parts.gist_mtp, config.mt_level_on_chain)?;

        Ok(Self {
            auth_claim: &inputs.auth_claim,
            auth_claim_inc_mtp: inc_mtp,
            auth_claim_non_rev_mtp: non_rev_mtp,
            auth_claim_non_rev_mtp_aux_hi: non_rev_aux.key,
            auth_claim_non_rev_mtp_aux_hv: non_rev_aux.value,
            auth_claim_non_rev_mtp_no_aux: flag(non_rev_aux.no_aux),
            challenge: parts.challenge.to_string(),
            challenge_signature_r8x: parts.signature.r8_x.to_string(),
            challenge_signature_r8y: parts.signature.r8_y.to_string(),
            challenge_signature_s: parts.signature.s.to_string(),
            user_claims_tree_root: inputs.tree_state.claims_root(),
            user_rev_tree_root: inputs.tree_state.revocation_root(),
            user_roots_tree_root: inputs.tree_state.root_of_roots(),
            user_state: inputs.tree_state.state(),
            gist_root: inputs.gist_proof.root,
            gist_mtp,
            gist_mtp_aux_hi: gist_aux.key,
            gist_mtp_aux_hv: gist_aux.value,
            gist_mtp_no_aux: flag(gist_aux.no_aux),
        })
    }
}
