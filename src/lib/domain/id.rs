use std::fmt;

use alloy_primitives::U256;

use super::{
    error::DomainError,
    hash::Hash,
};

pub const ID_SIZE: usize = 31;
const GENESIS_SIZE: usize = 27;

/// Two-byte identity type: DID method byte followed by blockchain/network byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IdType([u8; 2]);

impl IdType {
    pub const METHOD_IDEN3: u8 = 0x01;
    pub const METHOD_POLYGON_ID: u8 = 0x02;

    pub const NETWORK_POLYGON_MAIN: u8 = 0x11;
    pub const NETWORK_POLYGON_MUMBAI: u8 = 0x12;
    pub const NETWORK_POLYGON_AMOY: u8 = 0x13;
    pub const NETWORK_ETHEREUM_MAIN: u8 = 0x21;
    pub const NETWORK_ETHEREUM_SEPOLIA: u8 = 0x23;

    pub const fn new(method: u8, network: u8) -> Self {
        Self([method, network])
    }

    pub fn method(&self) -> u8 {
        self.0[0]
    }

    pub fn network(&self) -> u8 {
        self.0[1]
    }

    pub fn as_bytes(&self) -> &[u8; 2] {
        &self.0
    }
}

/// Identity identifier: `type(2) | genesis(27) | checksum(2)`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id([u8; ID_SIZE]);

impl Id {
    pub fn from_bytes(bytes: [u8; ID_SIZE]) -> Self {
        Self(bytes)
    }

    /// Identifier derived from a genesis state: the trailing 27 bytes of the
    /// state's little-endian representation.
    pub fn from_genesis_state(id_type: IdType, state: &Hash) -> Self {
        let mut genesis = [0u8; GENESIS_SIZE];
        genesis.copy_from_slice(&state.as_bytes()[32 - GENESIS_SIZE..]);
        Self::new(id_type, genesis)
    }

    fn new(id_type: IdType, genesis: [u8; GENESIS_SIZE]) -> Self {
        let mut bytes = [0u8; ID_SIZE];
        bytes[..2].copy_from_slice(id_type.as_bytes());
        bytes[2..2 + GENESIS_SIZE].copy_from_slice(&genesis);
        let [hi, lo] = checksum(&bytes[..2 + GENESIS_SIZE]);
        bytes[29] = hi;
        bytes[30] = lo;
        Self(bytes)
    }

    /// Little-endian big-int view, the form circuits consume.
    pub fn big_int(&self) -> U256 {
        let mut le = [0u8; 32];
        le[..ID_SIZE].copy_from_slice(&self.0);
        U256::from_le_bytes(le)
    }

    /// Parse the big-int view. The checksum is not verified here.
    pub fn from_big_int(value: U256) -> Result<Self, DomainError> {
        let le = value.to_le_bytes::<32>();
        if le[ID_SIZE] != 0 {
            return Err(DomainError::IdTooLarge(value.to_string()));
        }
        let mut bytes = [0u8; ID_SIZE];
        bytes.copy_from_slice(&le[..ID_SIZE]);
        Ok(Self(bytes))
    }

    pub fn id_type(&self) -> IdType {
        IdType([self.0[0], self.0[1]])
    }

    pub fn as_bytes(&self) -> &[u8; ID_SIZE] {
        &self.0
    }

    pub fn has_valid_checksum(&self) -> bool {
        checksum(&self.0[..2 + GENESIS_SIZE]) == [self.0[29], self.0[30]]
    }

    /// True when `id` is exactly the identifier a genesis `state` yields under
    /// `id_type`. The type is an explicit input so a state can never match an
    /// identifier from another network.
    pub fn is_genesis_state(id: &Id, state: &Hash, id_type: IdType) -> bool {
        Self::from_genesis_state(id_type, state) == *id
    }
}

fn checksum(bytes: &[u8]) -> [u8; 2] {
    let sum = bytes
        .iter()
        .fold(0u16, |acc, b| acc.wrapping_add(u16::from(*b)));
    sum.to_be_bytes()
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.big_int())
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", hex::encode(self.0))
    }
}
