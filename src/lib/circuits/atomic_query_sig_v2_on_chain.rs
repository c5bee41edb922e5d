use alloy_primitives::U256;
use serde::Serialize;

use super::{
    atomic_query_sig_v2::{
        AtomicQuerySigV2CircuitInputs,
        AtomicQuerySigV2Inputs,
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

const CIRCUIT: CircuitId = CircuitId::AtomicQuerySigV2OnChain;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomicQuerySigV2OnChainInputs {
    pub query: AtomicQuerySigV2Inputs,
    pub auth: UserAuthInputs,
}

#[derive(Serialize)]
struct OnChainCircuitInputs<'a> {
    #[serde(flatten)]
    query: AtomicQuerySigV2CircuitInputs<'a>,
    #[serde(flatten)]
    auth: UserAuthCircuitInputs<'a>,
}

impl CircuitInputs for AtomicQuerySigV2OnChainInputs {
    fn circuit_id(&self) -> CircuitId {
        CIRCUIT
    }

    fn validate(&self) -> Result<(), CircuitError> {
        let request_id = self.query.require_request_id(CIRCUIT)?;
        self.query.claim_parts(CIRCUIT, request_id)?;
        self.auth.parts(CIRCUIT)?;
        Ok(())
    }

    fn marshal(&self, config: &CircuitConfig) -> Result<Vec<u8>, CircuitError> {
        let request_id = self.query.require_request_id(CIRCUIT)?;
        let claim = self.query.claim_parts(CIRCUIT, request_id)?;
        let auth = self.auth.parts(CIRCUIT)?;

        let inputs = OnChainCircuitInputs {
            query: AtomicQuerySigV2CircuitInputs::new(CIRCUIT, &self.query, &claim, config)?,
            auth: UserAuthCircuitInputs::new(CIRCUIT, &auth, config)?,
        };
        Ok(serde_json::to_vec(&inputs)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomicQuerySigV2OnChainPubSignals {
    pub merklized: bool,
    pub user_id: Id,
    pub issuer_auth_state: Hash,
    pub circuit_query_hash: U256,
    pub request_id: U256,
    pub challenge: U256,
    pub gist_root: Hash,
    pub issuer_id: Id,
    pub is_revocation_checked: bool,
    pub issuer_claim_non_rev_state: Hash,
    pub timestamp: u64,
}

impl AtomicQuerySigV2OnChainPubSignals {
    pub const SIGNALS: usize = 11;
}

impl PubSignals for AtomicQuerySigV2OnChainPubSignals {
    fn unmarshal(data: &[u8], _config: &CircuitConfig) -> Result<Self, CircuitError> {
        let mut r = SignalReader::parse(CIRCUIT, data, Self::SIGNALS)?;
        Ok(Self {
            merklized: r.flag()?,
            user_id: r.id()?,
            issuer_auth_state: r.hash()?,
            circuit_query_hash: r.big_int()?,
            request_id: r.big_int()?,
            challenge: r.big_int()?,
            gist_root: r.hash()?,
            issuer_id: r.id()?,
            is_revocation_checked: r.flag()?,
            issuer_claim_non_rev_state: r.hash()?,
            timestamp: r.u64()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        circuits::{
            atomic_query_sig_v2::tests::inputs as sig_inputs,
            types::GistProof,
        },
        domain::{
            claim::{
                Claim,
                SchemaHash,
            },
            proof::Proof,
            signature::Signature,
            tree_state::TreeState,
        },
    };

    fn inputs() -> AtomicQuerySigV2OnChainInputs {
        AtomicQuerySigV2OnChainInputs {
            query: sig_inputs(),
            auth: UserAuthInputs {
                auth_claim: Claim::with_schema(SchemaHash::new([2; 16]), 0),
                auth_claim_inc_mtp: Some(Proof::new(true, &[], None).unwrap()),
                auth_claim_non_rev_mtp: Some(Proof::non_existence()),
                tree_state: TreeState::new(Hash::from_u64(8), Hash::ZERO, Hash::ZERO),
                gist_proof: GistProof {
                    root: Hash::from_u64(31),
                    proof: Some(Proof::non_existence()),
                },
                signature: Some(Signature::new(U256::from(1u64), U256::from(1u64), U256::from(1u64))),
                challenge: Some(U256::from(9u64)),
            },
        }
    }

    #[test]
    fn test_validate_sig_table_before_auth() {
        let mut i = inputs();
        i.query.claim.signature_proof.signature = None;
        i.auth.challenge = None;
        assert!(matches!(i.validate(), Err(CircuitError::EmptyClaimSignature(CIRCUIT))));

        let mut i = inputs();
        i.auth.auth_claim_non_rev_mtp = None;
        assert!(matches!(i.validate(), Err(CircuitError::EmptyAuthClaimNonRevProof(_))));

        let mut i = inputs();
        i.auth.signature = None;
        assert!(matches!(i.validate(), Err(CircuitError::EmptyChallengeSignature(_))));
    }

    #[test]
    fn test_marshal() {
        let bytes = inputs().marshal(&CircuitConfig::default()).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["issuerClaimSignatureR8x"], "11");
        assert_eq!(json["userState"], TreeState::new(Hash::from_u64(8), Hash::ZERO, Hash::ZERO).state().to_string());
        assert_eq!(json["gistMtpNoAux"], "1");
        assert_eq!(json["challenge"], "9");
    }

    #[test]
    fn test_skip_revocation_check() {
        let mut i = inputs();
        i.query.skip_claim_revocation_check = true;
        let bytes = i.marshal(&CircuitConfig::default()).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["isRevocationChecked"], "0");
        assert_eq!(json["challenge"], "9");
    }

    #[test]
    fn test_unmarshal() {
        let data = br#"["0","2","3","4","5","6","7","8","1","9","10"]"#;
        let s = AtomicQuerySigV2OnChainPubSignals::unmarshal(data, &CircuitConfig::default())
            .unwrap();
        assert!(!s.merklized);
        assert_eq!(s.issuer_auth_state, Hash::from_u64(3));
        assert_eq!(s.circuit_query_hash, U256::from(4u64));
        assert_eq!(s.request_id, U256::from(5u64));
        assert_eq!(s.challenge, U256::from(6u64));
        assert_eq!(s.gist_root, Hash::from_u64(7));
        assert_eq!(s.issuer_id.big_int(), U256::from(8u64));
        assert!(s.is_revocation_checked);
        assert_eq!(s.issuer_claim_non_rev_state, Hash::from_u64(9));
        assert_eq!(s.timestamp, 10);

        let long = br#"["0","2","3","4","5","6","7","8","1","9","10","11"]"#;
        assert!(matches!(
            AtomicQuerySigV2OnChainPubSignals::unmarshal(long, &CircuitConfig::default()),
            Err(CircuitError::ArrayLength {
                expected: 11,
                got: 12,
                ..
            })
        ));
    }
}
