//! Encoding toolkit shared by every circuit: non-inclusion aux values,
//! sibling padding, value-array padding and the merklized claim-path block.

use alloy_primitives::U256;
use serde::Serialize;

use super::{
    error::{
        ArraySizeError,
        CircuitError,
        CircuitId,
    },
    types::ValueProof,
};
use crate::domain::{
    hash::{
        is_field_element,
        Hash,
    },
    proof::Proof,
};

/// The three values a circuit needs to express (non-)inclusion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeAuxValue {
    pub key: Hash,
    pub value: Hash,
    pub no_aux: bool,
}

impl NodeAuxValue {
    pub fn no_aux_flag(&self) -> &'static str {
        flag(self.no_aux)
    }
}

pub fn derive_node_aux(proof: &Proof) -> NodeAuxValue {
    if proof.existence() {
        return NodeAuxValue {
            key: Hash::ZERO,
            value: Hash::ZERO,
            no_aux: false,
        };
    }
    match proof.node_aux() {
        Some(aux) => NodeAuxValue {
            key: aux.key,
            value: aux.value,
            no_aux: false,
        },
        None => NodeAuxValue {
            key: Hash::ZERO,
            value: Hash::ZERO,
            no_aux: true,
        },
    }
}

/// Right-pad a dense sibling list with zero hashes to exactly `levels` entries.
pub fn pad_siblings(siblings: &[Hash], levels: usize) -> Result<Vec<Hash>, ArraySizeError> {
    if siblings.len() > levels {
        return Err(ArraySizeError {
            max: levels,
            got: siblings.len(),
        });
    }
    let mut padded = siblings.to_vec();
    padded.resize(levels, Hash::ZERO);
    Ok(padded)
}

/// Dense siblings of `proof` padded to `levels`, as decimal strings.
pub fn prepare_siblings(proof: &Proof, levels: usize) -> Result<Vec<String>, ArraySizeError> {
    let padded = pad_siblings(&proof.all_siblings(), levels)?;
    Ok(padded.iter().map(Hash::to_string).collect())
}

/// Pad query values with zeros up to the circuit's value-wire count.
pub fn prepare_circuit_array_values(
    values: &[U256],
    size: usize,
) -> Result<Vec<String>, ArraySizeError> {
    if values.len() > size {
        return Err(ArraySizeError {
            max: size,
            got: values.len(),
        });
    }
    let mut padded = values.to_vec();
    padded.resize(size, U256::ZERO);
    Ok(padded.iter().map(U256::to_string).collect())
}

pub(crate) fn flag(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

pub(crate) fn encode_siblings(
    circuit: CircuitId,
    field: &'static str,
    proof: &Proof,
    levels: usize,
) -> Result<Vec<String>, CircuitError> {
    prepare_siblings(proof, levels).map_err(CircuitError::array_size(circuit, field))
}

/// Siblings plus aux values for a proof that may be a non-inclusion proof.
pub(crate) fn encode_with_aux(
    circuit: CircuitId,
    field: &'static str,
    proof: &Proof,
    levels: usize,
) -> Result<(Vec<String>, NodeAuxValue), CircuitError> {
    Ok((
        encode_siblings(circuit, field, proof, levels)?,
        derive_node_aux(proof),
    ))
}

pub(crate) fn encode_values(
    circuit: CircuitId,
    values: &[U256],
    size: usize,
) -> Result<Vec<String>, CircuitError> {
    prepare_circuit_array_values(values, size).map_err(CircuitError::array_size(circuit, "value"))
}

/// Validated view of a merklized value proof.
pub(crate) struct CheckedValueProof<'a> {
    path: U256,
    value: U256,
    mtp: &'a Proof,
}

pub(crate) fn check_value_proof(
    circuit: CircuitId,
    value_proof: &ValueProof,
) -> Result<CheckedValueProof<'_>, CircuitError> {
    let path = value_proof
        .path
        .filter(is_field_element)
        .ok_or(CircuitError::EmptyJsonLdQueryPath(circuit))?;
    let value = value_proof
        .value
        .filter(is_field_element)
        .ok_or(CircuitError::EmptyJsonLdQueryValue(circuit))?;
    let mtp = value_proof
        .mtp
        .as_ref()
        .ok_or(CircuitError::EmptyJsonLdQueryProof(circuit))?;
    Ok(CheckedValueProof { path, value, mtp })
}

/// The `claimPath*` block of the query circuits.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ClaimPathInputs {
    claim_path_not_exists: &'static str,
    claim_path_mtp: Vec<String>,
    claim_path_mtp_no_aux: &'static str,
    claim_path_mtp_aux_hi: Hash,
    claim_path_mtp_aux_hv: Hash,
    claim_path_key: String,
    claim_path_value: String,
}

impl ClaimPathInputs {
    pub(crate) fn new(
        circuit: CircuitId,
        value_proof: Option<&ValueProof>,
        levels: usize,
    ) -> Result<Self, CircuitError> {
        let Some(value_proof) = value_proof else {
            // No merklized path: an empty non-existence proof.
            return Self::build(circuit, &Proof::non_existence(), U256::ZERO, U256::ZERO, levels);
        };
        let checked = check_value_proof(circuit, value_proof)?;
        Self::build(circuit, checked.mtp, checked.path, checked.value, levels)
    }

    fn build(
        circuit: CircuitId,
        mtp: &Proof,
        key: U256,
        value: U256,
        levels: usize,
    ) -> Result<Self, CircuitError> {
        let (siblings, aux) = encode_with_aux(circuit, "claimPathMtp", mtp, levels)?;
        Ok(Self {
            claim_path_not_exists: flag(!mtp.existence()),
            claim_path_mtp: siblings,
            claim_path_mtp_no_aux: aux.no_aux_flag(),
            claim_path_mtp_aux_hi: aux.key,
            claim_path_mtp_aux_hv: aux.value,
            claim_path_key: key.to_string(),
            claim_path_value: value.to_string(),
        })
    }
}
