//! Circuit input encoders and public signal decoders.
//!
//! Every circuit has a fixed wire layout: encoders emit a JSON object whose
//! field names and order match the circuit inputs, decoders consume the
//! public signals strictly in output-wire order.

pub mod atomic_query_mtp_v2;
pub mod atomic_query_mtp_v2_on_chain;
pub mod atomic_query_sig_v2;
pub mod atomic_query_sig_v2_on_chain;
pub mod auth_v2;
pub mod common;
pub mod config;
pub mod error;
mod signals;
pub mod state_transition;
pub mod types;
pub mod user_auth;

pub use self::{
    config::CircuitConfig,
    error::{
        ArraySizeError,
        CircuitError,
        CircuitId,
    },
};

/// Prover-side inputs of one circuit.
pub trait CircuitInputs {
    fn circuit_id(&self) -> CircuitId;

    /// Check that every required input is present.
    fn validate(&self) -> Result<(), CircuitError>;

    /// Validate and encode the inputs as the prover's JSON payload.
    fn marshal(&self, config: &CircuitConfig) -> Result<Vec<u8>, CircuitError>;
}

/// Typed view of the public signals a circuit emits.
pub trait PubSignals: Sized {
    fn unmarshal(data: &[u8], config: &CircuitConfig) -> Result<Self, CircuitError>;
}
