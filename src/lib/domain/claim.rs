use alloy_primitives::U256;
use serde::{
    Deserialize,
    Serialize,
};

use super::{
    error::DomainError,
    hash::Hash,
};
use crate::crypto::poseidon::poseidon4;

pub const SCHEMA_HASH_SIZE: usize = 16;

/// Identifier of a claim's schema, stored in the low 16 bytes of index slot 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct SchemaHash([u8; SCHEMA_HASH_SIZE]);

impl SchemaHash {
    pub fn new(bytes: [u8; SCHEMA_HASH_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn from_big_int(value: U256) -> Result<Self, DomainError> {
        if value.bit_len() > SCHEMA_HASH_SIZE * 8 {
            return Err(DomainError::InvalidLength {
                expected: SCHEMA_HASH_SIZE,
                got: value.byte_len(),
            });
        }
        let le = value.to_le_bytes::<32>();
        let mut bytes = [0u8; SCHEMA_HASH_SIZE];
        bytes.copy_from_slice(&le[..SCHEMA_HASH_SIZE]);
        Ok(Self(bytes))
    }

    pub fn big_int(&self) -> U256 {
        let mut le = [0u8; 32];
        le[..SCHEMA_HASH_SIZE].copy_from_slice(&self.0);
        U256::from_le_bytes(le)
    }

    pub fn as_bytes(&self) -> &[u8; SCHEMA_HASH_SIZE] {
        &self.0
    }
}

/// An iden3 claim: four index slots and four value slots, each a field element.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Hash>", into = "Vec<Hash>")]
pub struct Claim {
    index: [Hash; 4],
    value: [Hash; 4],
}

impl Claim {
    pub fn new(index: [Hash; 4], value: [Hash; 4]) -> Self {
        Self { index, value }
    }

    pub fn from_slots(slots: [U256; 8]) -> Result<Self, DomainError> {
        let mut hashes = [Hash::ZERO; 8];
        for (out, slot) in hashes.iter_mut().zip(slots) {
            *out = Hash::from_big_int(slot)?;
        }
        Ok(Self::from_hashes(hashes))
    }

    fn from_hashes(h: [Hash; 8]) -> Self {
        Self {
            index: [h[0], h[1], h[2], h[3]],
            value: [h[4], h[5], h[6], h[7]],
        }
    }

    /// Claim with only the schema hash and revocation nonce set.
    pub fn with_schema(schema: SchemaHash, revocation_nonce: u64) -> Self {
        let index0 = Hash::from_u128(u128::from_le_bytes(schema.0));
        Self {
            index: [index0, Hash::ZERO, Hash::ZERO, Hash::ZERO],
            value: [
                Hash::from_u64(revocation_nonce),
                Hash::ZERO,
                Hash::ZERO,
                Hash::ZERO,
            ],
        }
    }

    /// Replace one of the four index slots.
    pub fn set_index_slot(&mut self, slot: usize, value: Hash) -> Result<(), DomainError> {
        let target = self
            .index
            .get_mut(slot)
            .ok_or(DomainError::InvalidSlot(slot))?;
        *target = value;
        Ok(())
    }

    pub fn index_slots(&self) -> &[Hash; 4] {
        &self.index
    }

    pub fn value_slots(&self) -> &[Hash; 4] {
        &self.value
    }

    /// Index hash, the key of the claim in the claims tree.
    pub fn hi(&self) -> Hash {
        let [a, b, c, d] = &self.index;
        poseidon4(a, b, c, d)
    }

    /// Value hash, the leaf value in the claims tree.
    pub fn hv(&self) -> Hash {
        let [a, b, c, d] = &self.value;
        poseidon4(a, b, c, d)
    }

    pub fn schema_hash(&self) -> SchemaHash {
        let mut bytes = [0u8; SCHEMA_HASH_SIZE];
        bytes.copy_from_slice(&self.index[0].as_bytes()[..SCHEMA_HASH_SIZE]);
        SchemaHash(bytes)
    }

    pub fn revocation_nonce(&self) -> u64 {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&self.value[0].as_bytes()[..8]);
        u64::from_le_bytes(bytes)
    }

    /// All eight slots, index first, as circuits expect them.
    pub fn slots(&self) -> [Hash; 8] {
        let [i0, i1, i2, i3] = self.index;
        let [v0, v1, v2, v3] = self.value;
        [i0, i1, i2, i3, v0, v1, v2, v3]
    }
}

impl TryFrom<Vec<Hash>> for Claim {
    type Error = DomainError;

    fn try_from(slots: Vec<Hash>) -> Result<Self, Self::Error> {
        let got = slots.len();
        let slots: [Hash; 8] = slots
            .try_into()
            .map_err(|_| DomainError::InvalidLength { expected: 8, got })?;
        Ok(Self::from_hashes(slots))
    }
}

impl From<Claim> for Vec<Hash> {
    fn from(claim: Claim) -> Self {
        claim.slots().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_and_nonce_layout() {
        let schema = SchemaHash::new([0xAB; 16]);
        let claim = Claim::with_schema(schema, 0x0102_0304);
        assert_eq!(claim.schema_hash(), schema);
        assert_eq!(claim.revocation_nonce(), 0x0102_0304);
        assert_eq!(claim.value_slots()[0], Hash::from_u64(0x0102_0304));
    }

    #[test]
    fn test_schema_hash_big_int_is_little_endian() {
        let mut bytes = [0u8; 16];
        bytes[0] = 1;
        bytes[1] = 2;
        let schema = SchemaHash::new(bytes);
        assert_eq!(schema.big_int(), U256::from(0x0201u64));
        assert_eq!(SchemaHash::from_big_int(schema.big_int()), Ok(schema));
        assert!(SchemaHash::from_big_int(U256::from(1u64) << 128).is_err());
    }

    #[test]
    fn test_hi_hv_use_poseidon4() {
        let claim = Claim::from_slots([
            U256::from(1u64),
            U256::from(2u64),
            U256::from(3u64),
            U256::from(4u64),
            U256::from(5u64),
            U256::from(6u64),
            U256::from(7u64),
            U256::from(8u64),
        ])
        .unwrap();
        let h = Hash::from_u64;
        assert_eq!(claim.hi(), poseidon4(&h(1), &h(2), &h(3), &h(4)));
        assert_eq!(claim.hv(), poseidon4(&h(5), &h(6), &h(7), &h(8)));
    }

    #[test]
    fn test_set_index_slot_bounds() {
        let mut claim = Claim::with_schema(SchemaHash::default(), 1);
        claim.set_index_slot(2, Hash::from_u64(9)).unwrap();
        assert_eq!(claim.index_slots()[2], Hash::from_u64(9));
        assert_eq!(
            claim.set_index_slot(4, Hash::ZERO),
            Err(DomainError::InvalidSlot(4))
        );
        assert!(DomainError::InvalidSlot(4).to_string().contains("out of range"));
    }

    #[test]
    fn test_serde_eight_decimal_strings() {
        let claim = Claim::with_schema(SchemaHash::default(), 7);
        let json = serde_json::to_value(&claim).unwrap();
        assert_eq!(
            json,
            serde_json::json!(["0", "0", "0", "0", "7", "0", "0", "0"])
        );
        let back: Claim = serde_json::from_value(json).unwrap();
        assert_eq!(back, claim);

        let short = serde_json::json!(["0", "0"]);
        assert!(serde_json::from_value::<Claim>(short).is_err());
    }
}
