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
    signals::SignalReader,
    types::ClaimWithMtpProof,
    CircuitInputs,
    PubSignals,
};
use crate::domain::{
    claim::Claim,
    hash::Hash,
    id::Id,
    proof::Proof,
    signature::Signature,
    tree_state::TreeState,
};

const CIRCUIT: CircuitId = CircuitId::StateTransition;

/// Move an identity from `old_tree_state` to `new_tree_state`, authorised by
/// a key whose auth claim is valid in both states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateTransitionInputs {
    pub id: Id,
    pub old_tree_state: TreeState,
    pub new_tree_state: TreeState,
    pub is_old_state_genesis: bool,
    pub auth_claim: ClaimWithMtpProof,
    pub auth_claim_new_state_inc_proof: Option<Proof>,
    pub signature: Signature,
}

struct Parts<'a> {
    inc_mtp: &'a Proof,
    new_state_inc_mtp: &'a Proof,
    non_rev_mtp: &'a Proof,
}

impl StateTransitionInputs {
    fn parts(&self) -> Result<Parts<'_>, CircuitError> {
        Ok(Parts {
            inc_mtp: self
                .auth_claim
                .inc_proof
                .proof
                .as_ref()
                .ok_or(CircuitError::EmptyAuthClaimProof(CIRCUIT))?,
            new_state_inc_mtp: self
                .auth_claim_new_state_inc_proof
                .as_ref()
                .ok_or(CircuitError::EmptyAuthClaimProofInTheNewState(CIRCUIT))?,
            non_rev_mtp: self
                .auth_claim
                .non_rev_proof
                .proof
                .as_ref()
                .ok_or(CircuitError::EmptyAuthClaimNonRevProof(CIRCUIT))?,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StateTransitionCircuitInputs<'a> {
    auth_claim: &'a Claim,
    auth_claim_mtp: Vec<String>,
    auth_claim_non_rev_mtp: Vec<String>,
    auth_claim_non_rev_mtp_aux_hi: Hash,
    auth_claim_non_rev_mtp_aux_hv: Hash,
    auth_claim_non_rev_mtp_no_aux: &'static str,
    #[serde(rename = "userID")]
    user_id: String,
    new_user_state: Hash,
    old_user_state: Hash,
    is_old_state_genesis: &'static str,
    claims_tree_root: Hash,
    rev_tree_root: Hash,
    roots_tree_root: Hash,
    signature_r8x: String,
    signature_r8y: String,
    signature_s: String,
    new_auth_claim_mtp: Vec<String>,
    new_claims_tree_root: Hash,
    new_rev_tree_root: Hash,
    new_roots_tree_root: Hash,
}

impl CircuitInputs for StateTransitionInputs {
    fn circuit_id(&self) -> CircuitId {
        CIRCUIT
    }

    fn validate(&self) -> Result<(), CircuitError> {
        self.parts().map(|_| ())
    }

    fn marshal(&self, config: &CircuitConfig) -> Result<Vec<u8>, CircuitError> {
        let parts = self.parts()?;
        let (non_rev_mtp, non_rev_aux) =
            encode_with_aux(CIRCUIT, "authClaimNonRevMtp", parts.non_rev_mtp, config.mt_level)?;
        let old = &self.old_tree_state;
        let new = &self.new_tree_state;

        let inputs = StateTransitionCircuitInputs {
            auth_claim: &self.auth_claim.claim,
            auth_claim_mtp: encode_siblings(CIRCUIT, "authClaimMtp", parts.inc_mtp, config.mt_level)?,
            auth_claim_non_rev_mtp: non_rev_mtp,
            auth_claim_non_rev_mtp_aux_hi: non_rev_aux.key,
            auth_claim_non_rev_mtp_aux_hv: non_rev_aux.value,
            auth_claim_non_rev_mtp_no_aux: flag(non_rev_aux.no_aux),
            user_id: self.id.big_int().to_string(),
            new_user_state: new.state(),
            old_user_state: old.state(),
            is_old_state_genesis: flag(self.is_old_state_genesis),
            claims_tree_root: old.claims_root(),
            rev_tree_root: old.revocation_root(),
            roots_tree_root: old.root_of_roots(),
            signature_r8x: self.signature.r8_x.to_string(),
            signature_r8y: self.signature.r8_y.to_string(),
            signature_s: self.signature.s.to_string(),
            new_auth_claim_mtp: encode_siblings(
                CIRCUIT,
                "newAuthClaimMtp",
                parts.new_state_inc_mtp,
                config.mt_level,
            )?,
            new_claims_tree_root: new.claims_root(),
            new_rev_tree_root: new.revocation_root(),
            new_roots_tree_root: new.root_of_roots(),
        };
        Ok(serde_json::to_vec(&inputs)?)
    }
}

/// Public outputs: userID, oldUserState, newUserState, isOldStateGenesis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateTransitionPubSignals {
    pub user_id: Id,
    pub old_user_state: Hash,
    pub new_user_state: Hash,
    pub is_old_state_genesis: bool,
}

impl StateTransitionPubSignals {
    pub const SIGNALS: usize = 4;
}

impl PubSignals for StateTransitionPubSignals {
    fn unmarshal(data: &[u8], _config: &CircuitConfig) -> Result<Self, CircuitError> {
        let mut r = SignalReader::parse(CIRCUIT, data, Self::SIGNALS)?;
        Ok(Self {
            user_id: r.id()?,
            old_user_state: r.hash()?,
            new_user_state: r.hash()?,
            is_old_state_genesis: r.flag()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::U256;

    use super::*;
    use crate::{
        circuits::types::MtProof,
        domain::{
            claim::SchemaHash,
            id::IdType,
        },
    };

    fn h(v: u64) -> Hash {
        Hash::from_u64(v)
    }

    fn inputs() -> StateTransitionInputs {
        let old = TreeState::new(h(1), Hash::ZERO, Hash::ZERO);
        let new = TreeState::new(h(2), Hash::ZERO, h(3));
        StateTransitionInputs {
            id: Id::from_genesis_state(IdType::new(0x01, 0x21), &old.state()),
            old_tree_state: old,
            new_tree_state: new,
            is_old_state_genesis: true,
            auth_claim: ClaimWithMtpProof {
                claim: Claim::with_schema(SchemaHash::new([9; 16]), 4),
                inc_proof: MtProof {
                    proof: Some(Proof::new(true, &[], None).unwrap()),
                    tree_state: old,
                },
                non_rev_proof: MtProof {
                    proof: Some(Proof::non_existence()),
                    tree_state: old,
                },
            },
            auth_claim_new_state_inc_proof: Some(Proof::new(true, &[h(40)], None).unwrap()),
            signature: Signature::new(U256::from(1u64), U256::from(2u64), U256::from(3u64)),
        }
    }

    #[test]
    fn test_validate_order() {
        let mut i = inputs();
        i.auth_claim.inc_proof.proof = None;
        i.auth_claim_new_state_inc_proof = None;
        assert!(matches!(i.validate(), Err(CircuitError::EmptyAuthClaimProof(_))));

        let mut i = inputs();
        i.auth_claim_new_state_inc_proof = None;
        i.auth_claim.non_rev_proof.proof = None;
        assert!(matches!(
            i.validate(),
            Err(CircuitError::EmptyAuthClaimProofInTheNewState(_))
        ));

        let mut i = inputs();
        i.auth_claim.non_rev_proof.proof = None;
        assert!(matches!(i.validate(), Err(CircuitError::EmptyAuthClaimNonRevProof(_))));
    }

    #[test]
    fn test_marshal() {
        let i = inputs();
        let config = CircuitConfig {
            mt_level: 2,
            ..CircuitConfig::default()
        };
        let bytes = i.marshal(&config).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["isOldStateGenesis"], "1");
        assert_eq!(json["userID"], i.id.big_int().to_string());
        assert_eq!(json["oldUserState"], i.old_tree_state.state().to_string());
        assert_eq!(json["newUserState"], i.new_tree_state.state().to_string());
        assert_eq!(json["claimsTreeRoot"], "1");
        assert_eq!(json["newClaimsTreeRoot"], "2");
        assert_eq!(json["newRootsTreeRoot"], "3");
        assert_eq!(json["newAuthClaimMtp"], serde_json::json!(["40", "0"]));
        assert_eq!(json["authClaimMtp"], serde_json::json!(["0", "0"]));
        assert_eq!(json["authClaimNonRevMtpNoAux"], "1");
        assert_eq!(json["signatureS"], "3");
    }
}
