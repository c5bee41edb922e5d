use std::{
    fmt,
    str::FromStr,
};

use alloy_primitives::U256;
use ark_bn254::Fr;
use ark_ff::{
    BigInt,
    BigInteger,
    PrimeField,
};
use serde::{
    Deserialize,
    Deserializer,
    Serialize,
    Serializer,
};

use super::error::DomainError;

pub const HASH_SIZE: usize = 32;

/// Number of key bits a tree path can consume.
pub const HASH_BITS: usize = HASH_SIZE * 8;

/// A BN254 field element as stored in iden3 sparse Merkle trees.
///
/// The bytes are kept little-endian, so `hex()` shows the stored byte order
/// while `big_int()` and `Display` show the numeric value.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Hash([u8; HASH_SIZE]);

/// Returns true when `value` is strictly below the BN254 scalar modulus.
pub fn is_field_element(value: &U256) -> bool {
    Fr::from_bigint(BigInt::new(value.into_limbs())).is_some()
}

impl Hash {
    pub const ZERO: Hash = Hash([0u8; HASH_SIZE]);

    /// Third child of every leaf node.
    pub const ONE: Hash = Hash([
        1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        0, 0, 0, 0,
    ]);

    /// Build from little-endian bytes, rejecting values outside the field.
    pub fn from_le_bytes(bytes: [u8; HASH_SIZE]) -> Result<Self, DomainError> {
        Self::from_big_int(U256::from_le_bytes(bytes))
    }

    pub fn from_big_int(value: U256) -> Result<Self, DomainError> {
        if !is_field_element(&value) {
            return Err(DomainError::NotInField(value.to_string()));
        }
        Ok(Self(value.to_le_bytes::<HASH_SIZE>()))
    }

    pub fn from_u64(value: u64) -> Self {
        Self(U256::from(value).to_le_bytes::<HASH_SIZE>())
    }

    pub fn from_u128(value: u128) -> Self {
        Self(U256::from(value).to_le_bytes::<HASH_SIZE>())
    }

    pub fn from_fr(value: Fr) -> Self {
        let bytes = value.into_bigint().to_bytes_le();
        let mut out = [0u8; HASH_SIZE];
        out[..bytes.len()].copy_from_slice(&bytes);
        Self(out)
    }

    pub fn to_fr(&self) -> Fr {
        Fr::from_le_bytes_mod_order(&self.0)
    }

    pub fn big_int(&self) -> U256 {
        U256::from_le_bytes(self.0)
    }

    pub fn as_bytes(&self) -> &[u8; HASH_SIZE] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Hex of the stored (little-endian) bytes.
    pub fn hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, DomainError> {
        Self::from_le_bytes(decode_fixed(s)?)
    }

    /// Big-endian hex of the numeric value.
    pub fn to_be_hex(&self) -> String {
        let mut bytes = self.0;
        bytes.reverse();
        hex::encode(bytes)
    }

    pub fn from_be_hex(s: &str) -> Result<Self, DomainError> {
        let mut bytes = decode_fixed(s)?;
        bytes.reverse();
        Self::from_le_bytes(bytes)
    }

    /// Bit `n` of the little-endian representation. Tree paths branch right
    /// at level `n` when this bit is set.
    pub fn test_bit(&self, n: usize) -> bool {
        n < HASH_BITS && self.0[n / 8] & (1 << (n % 8)) != 0
    }
}

fn decode_fixed(s: &str) -> Result<[u8; HASH_SIZE], DomainError> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(s).map_err(|e| DomainError::InvalidHex(e.to_string()))?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| DomainError::InvalidLength {
            expected: HASH_SIZE,
            got: bytes.len(),
        })
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.big_int())
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", self.big_int())
    }
}

impl FromStr for Hash {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_big_int(parse_decimal(s)?)
    }
}

/// Parse a base-10 big integer the way circuit payloads encode field elements.
pub fn parse_decimal(s: &str) -> Result<U256, DomainError> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DomainError::InvalidDecimal(s.to_string()));
    }
    U256::from_str_radix(s, 10).map_err(|e| DomainError::InvalidDecimal(format!("{s}: {e}")))
}

impl From<Fr> for Hash {
    fn from(value: Fr) -> Self {
        Self::from_fr(value)
    }
}

impl TryFrom<U256> for Hash {
    type Error = DomainError;

    fn try_from(value: U256) -> Result<Self, Self::Error> {
        Self::from_big_int(value)
    }
}

impl Serialize for Hash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
