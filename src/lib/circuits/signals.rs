//! Strict left-to-right reader over a circuit's public signal array.

use alloy_primitives::U256;

use super::{
    error::{
        CircuitError,
        CircuitId,
    },
    types::Operator,
};
use crate::domain::{
    claim::SchemaHash,
    hash::{
        parse_decimal,
        Hash,
    },
    id::Id,
};

pub(crate) struct SignalReader {
    circuit: CircuitId,
    values: std::vec::IntoIter<String>,
    position: usize,
}

impl SignalReader {
    /// Parse a JSON array of decimal strings, requiring exactly `expected` entries.
    pub(crate) fn parse(
        circuit: CircuitId,
        data: &[u8],
        expected: usize,
    ) -> Result<Self, CircuitError> {
        let values: Vec<String> = serde_json::from_slice(data)?;
        if values.len() != expected {
            return Err(CircuitError::ArrayLength {
                circuit,
                expected,
                got: values.len(),
            });
        }
        Ok(Self {
            circuit,
            values: values.into_iter(),
            position: 0,
        })
    }

    fn invalid(&self, reason: impl Into<String>) -> CircuitError {
        CircuitError::InvalidSignal {
            circuit: self.circuit,
            position: self.position,
            reason: reason.into(),
        }
    }

    fn next_raw(&mut self) -> Result<String, CircuitError> {
        let raw = self.values.next().ok_or_else(|| self.invalid("missing signal"))?;
        self.position += 1;
        Ok(raw)
    }

    pub(crate) fn big_int(&mut self) -> Result<U256, CircuitError> {
        let raw = self.next_raw()?;
        parse_decimal(&raw).map_err(|e| self.invalid_prev(e.to_string()))
    }

    // Errors raised after `next_raw` point at the signal just consumed.
    fn invalid_prev(&self, reason: String) -> CircuitError {
        CircuitError::InvalidSignal {
            circuit: self.circuit,
            position: self.position.saturating_sub(1),
            reason,
        }
    }

    pub(crate) fn hash(&mut self) -> Result<Hash, CircuitError> {
        let value = self.big_int()?;
        Hash::from_big_int(value).map_err(|e| self.invalid_prev(e.to_string()))
    }

    pub(crate) fn id(&mut self) -> Result<Id, CircuitError> {
        let value = self.big_int()?;
        Id::from_big_int(value).map_err(|e| self.invalid_prev(e.to_string()))
    }

    pub(crate) fn flag(&mut self) -> Result<bool, CircuitError> {
        match self.next_raw()?.as_str() {
            "0" => Ok(false),
            "1" => Ok(true),
            other => Err(self.invalid_prev(format!("expected 0 or 1, got {other}"))),
        }
    }

    pub(crate) fn u64(&mut self) -> Result<u64, CircuitError> {
        let value = self.big_int()?;
        u64::try_from(value).map_err(|_| self.invalid_prev(format!("{value} overflows u64")))
    }

    pub(crate) fn u32(&mut self) -> Result<u32, CircuitError> {
        let value = self.big_int()?;
        u32::try_from(value).map_err(|_| self.invalid_prev(format!("{value} overflows u32")))
    }

    pub(crate) fn schema(&mut self) -> Result<SchemaHash, CircuitError> {
        let value = self.big_int()?;
        SchemaHash::from_big_int(value).map_err(|e| self.invalid_prev(e.to_string()))
    }

    pub(crate) fn operator(&mut self) -> Result<Operator, CircuitError> {
        let value = self.u64()?;
        Operator::from_code(value)
            .ok_or_else(|| self.invalid_prev(format!("unknown operator {value}")))
    }

    /// Consume every remaining signal as a big integer.
    pub(crate) fn rest(mut self) -> Result<Vec<U256>, CircuitError> {
        let mut out = Vec::with_capacity(self.values.len());
        while !self.values.as_slice().is_empty() {
            out.push(self.big_int()?);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_checked_first() {
        let err = SignalReader::parse(CircuitId::AuthV2, br#"["1","2"]"#, 3).err();
        assert!(matches!(
            err,
            Some(CircuitError::ArrayLength {
                expected: 3,
                got: 2,
                ..
            })
        ));
    }

    #[test]
    fn test_position_in_errors() {
        let mut reader =
            SignalReader::parse(CircuitId::StateTransition, br#"["1","2","x"]"#, 3).unwrap();
        reader.big_int().unwrap();
        reader.big_int().unwrap();
        let err = reader.big_int().unwrap_err();
        assert!(matches!(
            err,
            CircuitError::InvalidSignal { position: 2, .. }
        ));
    }

    #[test]
    fn test_flag_rejects_other_values() {
        let mut reader = SignalReader::parse(CircuitId::AuthV2, br#"["2"]"#, 1).unwrap();
        assert!(matches!(
            reader.flag(),
            Err(CircuitError::InvalidSignal { position: 0, .. })
        ));
    }

    #[test]
    fn test_rest_collects_tail() {
        let mut reader =
            SignalReader::parse(CircuitId::AtomicQueryMtpV2, br#"["1","2","3"]"#, 3).unwrap();
        reader.hash().unwrap();
        assert_eq!(reader.rest().unwrap(), vec![U256::from(2u64), U256::from(3u64)]);
    }

    #[test]
    fn test_non_json_payload() {
        assert!(matches!(
            SignalReader::parse(CircuitId::AuthV2, b"not json", 3),
            Err(CircuitError::Serialization(_))
        ));
    }
}
