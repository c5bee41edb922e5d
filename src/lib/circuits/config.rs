use serde::{
    Deserialize,
    Serialize,
};

/// Tree depths and value-array width the deployed circuits were compiled with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircuitConfig {
    /// Auth-claim proofs of the prover and issuer auth-claim proofs.
    pub mt_level: usize,
    /// The credential's inclusion and non-revocation proofs.
    pub mt_level_claim: usize,
    /// GIST proofs.
    pub mt_level_on_chain: usize,
    /// Merklized value-path proofs.
    pub mt_level_claims_merklization: usize,
    pub value_array_size: usize,
}

impl Default for CircuitConfig {
    fn default() -> Self {
        Self {
            mt_level: 40,
            mt_level_claim: 40,
            mt_level_on_chain: 64,
            mt_level_claims_merklization: 32,
            value_array_size: 64,
        }
    }
}
