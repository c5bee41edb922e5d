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
    signals::SignalReader,
    types::GistProof,
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

const CIRCUIT: CircuitId = CircuitId::AuthV2;

/// Inputs proving control of an identity via a signed challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthV2Inputs {
    pub genesis_id: Option<Id>,
    pub profile_nonce: U256,
    pub auth_claim: Claim,
    pub auth_claim_inc_mtp: Option<Proof>,
    pub auth_claim_non_rev_mtp: Option<Proof>,
    pub tree_state: TreeState,
    pub gist_proof: GistProof,
    pub signature: Option<Signature>,
    pub challenge: Option<U256>,
}

struct Parts<'a> {
    genesis_id: &'a Id,
    inc_mtp: &'a Proof,
    non_rev_mtp: &'a Proof,
    gist_mtp: &'a Proof,
    signature: &'a Signature,
    challenge: U256,
}

impl AuthV2Inputs {
    fn parts(&self) -> Result<Parts<'_>, CircuitError> {
        Ok(Parts {
            genesis_id: self
                .genesis_id
                .as_ref()
                .ok_or(CircuitError::EmptyId(CIRCUIT))?,
            inc_mtp: self
                .auth_claim_inc_mtp
                .as_ref()
                .ok_or(CircuitError::EmptyAuthClaimProof(CIRCUIT))?,
            non_rev_mtp: self
                .auth_claim_non_rev_mtp
                .as_ref()
                .ok_or(CircuitError::EmptyAuthClaimNonRevProof(CIRCUIT))?,
            gist_mtp: self
                .gist_proof
                .proof
                .as_ref()
                .ok_or(CircuitError::EmptyGistProof(CIRCUIT))?,
            signature: self
                .signature
                .as_ref()
                .ok_or(CircuitError::EmptyChallengeSignature(CIRCUIT))?,
            challenge: self.challenge.ok_or(CircuitError::EmptyChallenge(CIRCUIT))?,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthV2CircuitInputs<'a> {
    #[serde(rename = "genesisID")]
    genesis_id: String,
    profile_nonce: String,
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
    claims_tree_root: Hash,
    rev_tree_root: Hash,
    roots_tree_root: Hash,
    state: Hash,
    gist_root: Hash,
    gist_mtp: Vec<String>,
    gist_mtp_aux_hi: Hash,
    gist_mtp_aux_hv: Hash,
    gist_mtp_no_aux: &'static str,
}

impl CircuitInputs for AuthV2Inputs {
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
        let (gist_mtp, gist_aux) =
            encode_with_aux(CIRCUIT, "gistMtp", parts.gist_mtp, config.mt_level_on_chain)?;

        let inputs = AuthV2CircuitInputs {
            genesis_id: parts.genesis_id.big_int().to_string(),
            profile_nonce: self.profile_nonce.to_string(),
            auth_claim: &self.auth_claim,
            auth_claim_inc_mtp: encode_siblings(
                CIRCUIT,
                "authClaimIncMtp",
                parts.inc_mtp,
                config.mt_level,
            )?,
            auth_claim_non_rev_mtp: non_rev_mtp,
            auth_claim_non_rev_mtp_aux_hi: non_rev_aux.key,
            auth_claim_non_rev_mtp_aux_hv: non_rev_aux.value,
            auth_claim_non_rev_mtp_no_aux: flag(non_rev_aux.no_aux),
            challenge: parts.challenge.to_string(),
            challenge_signature_r8x: parts.signature.r8_x.to_string(),
            challenge_signature_r8y: parts.signature.r8_y.to_string(),
            challenge_signature_s: parts.signature.s.to_string(),
            claims_tree_root: self.tree_state.claims_root(),
            rev_tree_root: self.tree_state.revocation_root(),
            roots_tree_root: self.tree_state.root_of_roots(),
            state: self.tree_state.state(),
            gist_root: self.gist_proof.root,
            gist_mtp,
            gist_mtp_aux_hi: gist_aux.key,
            gist_mtp_aux_hv: gist_aux.value,
            gist_mtp_no_aux: flag(gist_aux.no_aux),
        };
        Ok(serde_json::to_vec(&inputs)?)
    }
}

/// Public outputs: userID, challenge, gistRoot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthV2PubSignals {
    pub user_id: Id,
    pub challenge: U256,
    pub gist_root: Hash,
}

impl AuthV2PubSignals {
    pub const SIGNALS: usize = 3;
}

impl PubSignals for AuthV2PubSignals {
    fn unmarshal(data: &[u8], _config: &CircuitConfig) -> Result<Self, CircuitError> {
        let mut r = SignalReader::parse(CIRCUIT, data, Self::SIGNALS)?;
        Ok(Self {
            user_id: r.id()?,
            challenge: r.big_int()?,
            gist_root: r.hash()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        claim::SchemaHash,
        id::IdType,
    };

    fn h(v: u64) -> Hash {
        Hash::from_u64(v)
    }

    fn inputs() -> AuthV2Inputs {
        let tree_state = TreeState::new(h(1), h(2), h(3));
        AuthV2Inputs {
            genesis_id: Some(Id::from_genesis_state(IdType::new(0x02, 0x13), &tree_state.state())),
            profile_nonce: U256::ZERO,
            auth_claim: Claim::with_schema(SchemaHash::new([7; 16]), 0),
            auth_claim_inc_mtp: Some(Proof::new(true, &[h(10), h(0), h(11)], None).unwrap()),
            auth_claim_non_rev_mtp: Some(Proof::non_existence()),
            tree_state,
            gist_proof: GistProof {
                root: h(99),
                proof: Some(Proof::new(true, &[h(5)], None).unwrap()),
            },
            signature: Some(Signature::new(U256::from(1u64), U256::from(2u64), U256::from(3u64))),
            challenge: Some(U256::from(42u64)),
        }
    }

    #[test]
    fn test_required_fields_in_order() {
        let mut i = inputs();
        i.genesis_id = None;
        i.challenge = None;
        assert!(matches!(i.validate(), Err(CircuitError::EmptyId(CircuitId::AuthV2))));

        let mut i = inputs();
        i.auth_claim_inc_mtp = None;
        assert!(matches!(i.validate(), Err(CircuitError::EmptyAuthClaimProof(_))));

        let mut i = inputs();
        i.auth_claim_non_rev_mtp = None;
        assert!(matches!(i.validate(), Err(CircuitError::EmptyAuthClaimNonRevProof(_))));

        let mut i = inputs();
        i.gist_proof.proof = None;
        assert!(matches!(i.validate(), Err(CircuitError::EmptyGistProof(_))));

        let mut i = inputs();
        i.signature = None;
        assert!(matches!(i.validate(), Err(CircuitError::EmptyChallengeSignature(_))));

        let mut i = inputs();
        i.challenge = None;
        assert!(matches!(i.validate(), Err(CircuitError::EmptyChallenge(_))));

        assert!(inputs().validate().is_ok());
    }

    #[test]
    fn test_marshal_layout() {
        let config = CircuitConfig {
            mt_level: 4,
            mt_level_on_chain: 3,
            ..CircuitConfig::default()
        };
        let bytes = inputs().marshal(&config).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(json["authClaimIncMtp"], serde_json::json!(["10", "0", "11", "0"]));
        assert_eq!(json["authClaimNonRevMtp"], serde_json::json!(["0", "0", "0", "0"]));
        assert_eq!(json["authClaimNonRevMtpNoAux"], "1");
        assert_eq!(json["gistMtp"], serde_json::json!(["5", "0", "0"]));
        assert_eq!(json["gistMtpNoAux"], "0");
        assert_eq!(json["challenge"], "42");
        assert_eq!(json["challengeSignatureR8x"], "1");
        assert_eq!(json["claimsTreeRoot"], "1");
        assert_eq!(json["gistRoot"], "99");
        assert_eq!(json["authClaim"].as_array().unwrap().len(), 8);

        let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        assert!(keys.contains(&"genesisID"));
        assert_eq!(keys.len(), 21);
    }

    #[test]
    fn test_marshal_field_order() {
        let bytes = inputs().marshal(&CircuitConfig::default()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let order = [
            "\"genesisID\"",
            "\"profileNonce\"",
            "\"authClaim\"",
            "\"authClaimIncMtp\"",
            "\"authClaimNonRevMtp\"",
            "\"authClaimNonRevMtpAuxHi\"",
            "\"challenge\"",
            "\"challengeSignatureS\"",
            "\"claimsTreeRoot\"",
            "\"state\"",
            "\"gistRoot\"",
            "\"gistMtpNoAux\"",
        ];
        let positions: Vec<usize> = order.iter().map(|k| text.find(k).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_levels_below_depth_fail() {
        let config = CircuitConfig {
            mt_level: 2,
            ..CircuitConfig::default()
        };
        assert!(matches!(
            inputs().marshal(&config),
            Err(CircuitError::ArraySize {
                field: "authClaimIncMtp",
                ..
            })
        ));
    }

    #[test]
    fn test_unmarshal() {
        let signals =
            AuthV2PubSignals::unmarshal(br#"["5","42","7"]"#, &CircuitConfig::default()).unwrap();
        assert_eq!(signals.user_id.big_int(), U256::from(5u64));
        assert_eq!(signals.challenge, U256::from(42u64));
        assert_eq!(signals.gist_root, h(7));

        assert!(matches!(
            AuthV2PubSignals::unmarshal(br#"["5","42"]"#, &CircuitConfig::default()),
            Err(CircuitError::ArrayLength {
                expected: 3,
                got: 2,
                ..
            })
        ));
    }
}
