use alloy_primitives::U256;

use crate::domain::{
    claim::Claim,
    hash::Hash,
    proof::Proof,
    signature::Signature,
    tree_state::TreeState,
};

/// A Merkle proof together with the identity state it was generated against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MtProof {
    pub proof: Option<Proof>,
    pub tree_state: TreeState,
}

/// Proof of an identity state inside the global identity state tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GistProof {
    pub root: Hash,
    pub proof: Option<Proof>,
}

/// A credential proven by inclusion in the issuer's claims tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimWithMtpProof {
    pub claim: Claim,
    pub inc_proof: MtProof,
    pub non_rev_proof: MtProof,
}

/// Issuer signature over a credential plus proofs for the signing key's auth claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BjjSignatureProof {
    pub signature: Option<Signature>,
    pub issuer_auth_claim: Claim,
    pub issuer_auth_inc_proof: MtProof,
    pub issuer_auth_non_rev_proof: MtProof,
}

/// A credential proven by an issuer signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimWithSigProof {
    pub claim: Claim,
    pub non_rev_proof: MtProof,
    pub signature_proof: BjjSignatureProof,
}

/// Comparison the query circuits apply to the selected claim value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Operator {
    Noop = 0,
    Eq = 1,
    Lt = 2,
    Gt = 3,
    In = 4,
    Nin = 5,
    Ne = 6,
    Lte = 7,
    Gte = 8,
    Between = 9,
    NonBetween = 10,
    Exists = 11,
    SelectiveDisclosure = 16,
    Nullify = 17,
}

impl Operator {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u64) -> Option<Self> {
        let op = match code {
            0 => Operator::Noop,
            1 => Operator::Eq,
            2 => Operator::Lt,
            3 => Operator::Gt,
            4 => Operator::In,
            5 => Operator::Nin,
            6 => Operator::Ne,
            7 => Operator::Lte,
            8 => Operator::Gte,
            9 => Operator::Between,
            10 => Operator::NonBetween,
            11 => Operator::Exists,
            16 => Operator::SelectiveDisclosure,
            17 => Operator::Nullify,
            _ => return None,
        };
        Some(op)
    }
}

/// Proof that a JSON-LD path/value pair is part of a merklized credential.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValueProof {
    pub path: Option<U256>,
    pub value: Option<U256>,
    pub mtp: Option<Proof>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub slot_index: u32,
    pub values: Option<Vec<U256>>,
    pub operator: Operator,
    pub value_proof: Option<ValueProof>,
}

impl Query {
    pub fn values(&self) -> &[U256] {
        self.values.as_deref().unwrap_or(&[])
    }
}
