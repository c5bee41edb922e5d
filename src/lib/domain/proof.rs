use serde::{
    Deserialize,
    Serialize,
};

use super::{
    error::DomainError,
    hash::Hash,
};
use crate::crypto::poseidon::{
    poseidon2,
    poseidon3,
};

/// Deepest proof the sibling bitmap can describe.
pub const MAX_PROOF_DEPTH: usize = 240;

const NOT_EMPTIES_LEN: usize = MAX_PROOF_DEPTH / 8;

/// Siblings of a Merkle path with the zero levels elided.
///
/// Bit `i` of `not_empties` is set when the sibling at level `i` is non-zero;
/// `stored` holds exactly those siblings, root side first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SparseSiblings {
    depth: usize,
    not_empties: [u8; NOT_EMPTIES_LEN],
    stored: Vec<Hash>,
}

impl SparseSiblings {
    pub fn empty() -> Self {
        Self {
            depth: 0,
            not_empties: [0u8; NOT_EMPTIES_LEN],
            stored: Vec::new(),
        }
    }

    pub fn from_dense(all: &[Hash]) -> Result<Self, DomainError> {
        if all.len() > MAX_PROOF_DEPTH {
            return Err(DomainError::ProofTooDeep {
                depth: all.len(),
                max: MAX_PROOF_DEPTH,
            });
        }

        let mut not_empties = [0u8; NOT_EMPTIES_LEN];
        let mut stored = Vec::new();
        for (level, sibling) in all.iter().enumerate() {
            if !sibling.is_zero() {
                not_empties[level / 8] |= 1 << (level % 8);
                stored.push(*sibling);
            }
        }

        Ok(Self {
            depth: all.len(),
            not_empties,
            stored,
        })
    }

    /// Expand back to one sibling per level, zero where elided.
    pub fn to_dense(&self) -> Vec<Hash> {
        let mut stored = self.stored.iter();
        (0..self.depth)
            .map(|level| {
                if self.is_set(level) {
                    stored.next().copied().unwrap_or(Hash::ZERO)
                } else {
                    Hash::ZERO
                }
            })
            .collect()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_set(&self, level: usize) -> bool {
        level < self.depth && self.not_empties[level / 8] & (1 << (level % 8)) != 0
    }

    pub fn not_empties(&self) -> &[u8; NOT_EMPTIES_LEN] {
        &self.not_empties
    }

    pub fn stored(&self) -> &[Hash] {
        &self.stored
    }
}

impl Default for SparseSiblings {
    fn default() -> Self {
        Self::empty()
    }
}

/// The leaf a non-existence proof ran into instead of the queried key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeAux {
    pub key: Hash,
    pub value: Hash,
}

/// Merkle inclusion or non-inclusion proof in the iden3 sparse tree layout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ProofJson", into = "ProofJson")]
pub struct Proof {
    existence: bool,
    siblings: SparseSiblings,
    node_aux: Option<NodeAux>,
}

impl Proof {
    pub fn new(
        existence: bool,
        all_siblings: &[Hash],
        node_aux: Option<NodeAux>,
    ) -> Result<Self, DomainError> {
        if existence && node_aux.is_some() {
            return Err(DomainError::AuxOnExistenceProof);
        }
        Ok(Self {
            existence,
            siblings: SparseSiblings::from_dense(all_siblings)?,
            node_aux,
        })
    }

    /// Non-inclusion proof against an empty tree.
    pub fn non_existence() -> Self {
        Self {
            existence: false,
            siblings: SparseSiblings::empty(),
            node_aux: None,
        }
    }

    pub fn existence(&self) -> bool {
        self.existence
    }

    pub fn node_aux(&self) -> Option<&NodeAux> {
        self.node_aux.as_ref()
    }

    pub fn siblings(&self) -> &SparseSiblings {
        &self.siblings
    }

    pub fn all_siblings(&self) -> Vec<Hash> {
        self.siblings.to_dense()
    }

    pub fn depth(&self) -> usize {
        self.siblings.depth()
    }

    /// Recompute the root this proof commits to for `key`/`value`.
    pub fn root_from_proof(&self, key: &Hash, value: &Hash) -> Result<Hash, DomainError> {
        let mut mid = if self.existence {
            leaf_key(key, value)
        } else {
            match &self.node_aux {
                None => Hash::ZERO,
                Some(aux) => {
                    if aux.key == *key {
                        return Err(DomainError::AuxKeyMatchesQuery);
                    }
                    leaf_key(&aux.key, &aux.value)
                }
            }
        };

        let siblings = self.siblings.to_dense();
        for level in (0..siblings.len()).rev() {
            let sibling = &siblings[level];
            mid = if key.test_bit(level) {
                poseidon2(sibling, &mid)
            } else {
                poseidon2(&mid, sibling)
            };
        }
        Ok(mid)
    }

    pub fn verify(&self, root: &Hash, key: &Hash, value: &Hash) -> bool {
        matches!(self.root_from_proof(key, value), Ok(computed) if computed == *root)
    }
}

/// Hash of a leaf node: Poseidon(key, value, 1).
pub fn leaf_key(key: &Hash, value: &Hash) -> Hash {
    poseidon3(key, value, &Hash::ONE)
}

#[derive(Serialize, Deserialize)]
struct ProofJson {
    existence: bool,
    siblings: Vec<Hash>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    node_aux: Option<NodeAux>,
}

impl TryFrom<ProofJson> for Proof {
    type Error = DomainError;

    fn try_from(json: ProofJson) -> Result<Self, Self::Error> {
        Proof::new(json.existence, &json.siblings, json.node_aux)
    }
}

impl From<Proof> for ProofJson {
    fn from(proof: Proof) -> Self {
        ProofJson {
            existence: proof.existence,
            siblings: proof.all_siblings(),
            node_aux: proof.node_aux,
        }
    }
}
