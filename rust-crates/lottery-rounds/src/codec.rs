//! Lossless conversion between ledger integers, their decimal-string encoding, and
//! arbitrary-precision decimals.
//!
//! Ledger words are wider than any machine integer, so every value is carried as a
//! [`BigUint`] on the way in and as a base-10 string at rest. The empty string is
//! reserved for "value unknown" and is the only encoding that is not a number.

use crate::error::CodecError;
use bigdecimal::{
    BigDecimal,
    num_bigint::{
        BigInt,
        BigUint,
    },
};
use serde::{
    Deserialize,
    Serialize,
};
use serde_json::Value;
use std::{
    fmt,
    str::FromStr,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DecimalString(String);

impl DecimalString {
    /// The "unknown" sentinel carried by placeholder records.
    pub fn empty() -> Self {
        Self(String::new())
    }

    pub fn encode(value: &BigUint) -> Self {
        Self(value.to_str_radix(10))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Exact decimal value of the string.
    ///
    /// The empty sentinel decodes to zero, so a zero returned here only means "zero"
    /// when the owning record is not loading.
    pub fn decode(&self) -> BigDecimal {
        self.to_biguint()
            .map(|value| BigDecimal::new(BigInt::from(value), 0))
            .unwrap_or_default()
    }

    pub fn to_biguint(&self) -> Option<BigUint> {
        if self.is_empty() {
            return None;
        }
        // digits were validated on construction
        BigUint::parse_bytes(self.0.as_bytes(), 10)
    }
}

impl From<u64> for DecimalString {
    fn from(value: u64) -> Self {
        Self::encode(&BigUint::from(value))
    }
}

impl From<&BigUint> for DecimalString {
    fn from(value: &BigUint) -> Self {
        Self::encode(value)
    }
}

impl TryFrom<String> for DecimalString {
    type Error = CodecError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        if raw.is_empty() {
            return Ok(Self::empty());
        }
        let value = parse_decimal(&raw)?;
        Ok(Self::encode(&value))
    }
}

impl FromStr for DecimalString {
    type Err = CodecError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::try_from(raw.to_string())
    }
}

impl From<DecimalString> for String {
    fn from(value: DecimalString) -> Self {
        value.0
    }
}

impl fmt::Display for DecimalString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reads a non-negative integer in any of the encodings the ledger gateway emits:
/// a JSON integer, a decimal string, a `0x` hex string, or a `{"hex": "0x.."}`
/// big-number object.
///
/// JSON numbers above `u64::MAX` lose precision before they reach this function,
/// so gateways send wide values as strings.
pub fn ledger_uint(value: &Value) -> Result<BigUint, CodecError> {
    match value {
        Value::Number(number) => number
            .as_u64()
            .map(BigUint::from)
            .ok_or_else(|| CodecError::NotInteger(number.to_string())),
        Value::String(text) => {
            let text = text.trim();
            match text
                .strip_prefix("0x")
                .or_else(|| text.strip_prefix("0X"))
            {
                Some(hex) => parse_hex(hex, text),
                None => parse_decimal(text),
            }
        }
        Value::Object(fields) => match fields.get("hex") {
            Some(hex @ Value::String(_)) => ledger_uint(hex),
            _ => Err(CodecError::NotNumeric("object".to_string())),
        },
        Value::Null => Err(CodecError::NotNumeric("null".to_string())),
        Value::Bool(_) => Err(CodecError::NotNumeric("bool".to_string())),
        Value::Array(_) => Err(CodecError::NotNumeric("array".to_string())),
    }
}

fn parse_decimal(text: &str) -> Result<BigUint, CodecError> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CodecError::NotDecimal(text.to_string()));
    }
    BigUint::parse_bytes(text.as_bytes(), 10)
        .ok_or_else(|| CodecError::NotDecimal(text.to_string()))
}

fn parse_hex(digits: &str, original: &str) -> Result<BigUint, CodecError> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(CodecError::NotHex(original.to_string()));
    }
    BigUint::parse_bytes(digits.as_bytes(), 16)
        .ok_or_else(|| CodecError::NotHex(original.to_string()))
}
