use std::fmt;

use thiserror::Error;

/// Circuit identities with a fixed input and output layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CircuitId {
    AuthV2,
    AtomicQueryMtpV2,
    AtomicQueryMtpV2OnChain,
    AtomicQuerySigV2,
    AtomicQuerySigV2OnChain,
    StateTransition,
}

impl CircuitId {
    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitId::AuthV2 => "authV2",
            CircuitId::AtomicQueryMtpV2 => "credentialAtomicQueryMTPV2",
            CircuitId::AtomicQueryMtpV2OnChain => "credentialAtomicQueryMTPV2OnChain",
            CircuitId::AtomicQuerySigV2 => "credentialAtomicQuerySigV2",
            CircuitId::AtomicQuerySigV2OnChain => "credentialAtomicQuerySigV2OnChain",
            CircuitId::StateTransition => "stateTransition",
        }
    }
}

impl fmt::Display for CircuitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A list did not fit into the fixed number of circuit wires.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("array size {got} is bigger than max expected size {max}")]
pub struct ArraySizeError {
    pub max: usize,
    pub got: usize,
}

#[derive(Debug, Error)]
pub enum CircuitError {
    // ========== Missing inputs ==========
    #[error("{0}: empty ID")]
    EmptyId(CircuitId),

    #[error("{0}: empty request ID")]
    EmptyRequestId(CircuitId),

    #[error("{0}: empty challenge")]
    EmptyChallenge(CircuitId),

    #[error("{0}: empty challenge signature")]
    EmptyChallengeSignature(CircuitId),

    #[error("{0}: empty auth claim proof")]
    EmptyAuthClaimProof(CircuitId),

    #[error("{0}: empty auth claim non-revocation proof")]
    EmptyAuthClaimNonRevProof(CircuitId),

    #[error("{0}: empty auth claim proof in the new state")]
    EmptyAuthClaimProofInTheNewState(CircuitId),

    #[error("{0}: empty GIST proof")]
    EmptyGistProof(CircuitId),

    #[error("{0}: empty claim proof")]
    EmptyClaimProof(CircuitId),

    #[error("{0}: empty claim non-revocation proof")]
    EmptyClaimNonRevProof(CircuitId),

    #[error("{0}: empty claim signature")]
    EmptyClaimSignature(CircuitId),

    #[error("{0}: empty issuer auth claim proof")]
    EmptyIssuerAuthClaimProof(CircuitId),

    #[error("{0}: empty issuer auth claim non-revocation proof")]
    EmptyIssuerAuthClaimNonRevProof(CircuitId),

    #[error("{0}: empty query value")]
    EmptyQueryValue(CircuitId),

    #[error("{0}: empty JSON-LD query path")]
    EmptyJsonLdQueryPath(CircuitId),

    #[error("{0}: empty JSON-LD query value")]
    EmptyJsonLdQueryValue(CircuitId),

    #[error("{0}: empty JSON-LD query proof")]
    EmptyJsonLdQueryProof(CircuitId),

    // ========== Size / shape ==========
    #[error("{circuit}: {field}: {source}")]
    ArraySize {
        circuit: CircuitId,
        field: &'static str,
        source: ArraySizeError,
    },

    #[error("{circuit}: invalid number of output values expected {expected} got {got}")]
    ArrayLength {
        circuit: CircuitId,
        expected: usize,
        got: usize,
    },

    #[error("{circuit}: invalid signal at position {position}: {reason}")]
    InvalidSignal {
        circuit: CircuitId,
        position: usize,
        reason: String,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CircuitError {
    pub(crate) fn array_size(circuit: CircuitId, field: &'static str) -> impl FnOnce(ArraySizeError) -> Self {
        move |source| CircuitError::ArraySize {
            circuit,
            field,
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circuit_names() {
        assert_eq!(CircuitId::AuthV2.to_string(), "authV2");
        assert_eq!(
            CircuitId::AtomicQuerySigV2OnChain.to_string(),
            "credentialAtomicQuerySigV2OnChain"
        );
    }

    #[test]
    fn test_messages_carry_context() {
        let err = CircuitError::ArrayLength {
            circuit: CircuitId::StateTransition,
            expected: 4,
            got: 3,
        };
        assert_eq!(
            err.to_string(),
            "stateTransition: invalid number of output values expected 4 got 3"
        );

        let err = CircuitError::array_size(CircuitId::AtomicQueryMtpV2, "value")(
            ArraySizeError { max: 64, got: 65 },
        );
        assert_eq!(
            err.to_string(),
            "credentialAtomicQueryMTPV2: value: array size 65 is bigger than max expected size 64"
        );
    }
}
