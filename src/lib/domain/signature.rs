use alloy_primitives::U256;

/// BabyJubJub EdDSA signature components as circuits consume them.
///
/// Produced by external key management; this crate only forwards them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Signature {
    pub r8_x: U256,
    pub r8_y: U256,
    pub s: U256,
}

impl Signature {
    pub fn new(r8_x: U256, r8_y: U256, s: U256) -> Self {
        Self { r8_x, r8_y, s }
    }
}
