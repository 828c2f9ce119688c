use crate::{
    codec::DecimalString,
    error::DecodeError,
};
use bigdecimal::num_bigint::BigInt;
use serde::{
    Deserialize,
    Serialize,
};
use std::{
    fmt,
    str::FromStr,
};

/// Lottery round identifier as carried by the ledger, in base 10.
///
/// Not validated: ids produced by the window walk may be negative, and a failed
/// fetch must still echo whatever id it was asked for. Numeric ids are held in
/// canonical form, so `"007"` and `"7"` name the same round.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct RoundId(String);

impl RoundId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn numeric(&self) -> Option<BigInt> {
        BigInt::from_str(&self.0).ok()
    }
}

impl From<String> for RoundId {
    fn from(value: String) -> Self {
        match BigInt::from_str(value.trim()) {
            Ok(number) => Self(number.to_string()),
            Err(_) => Self(value),
        }
    }
}

impl From<&str> for RoundId {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<RoundId> for String {
    fn from(value: RoundId) -> Self {
        value.0
    }
}

impl From<u64> for RoundId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for RoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundStatus {
    #[default]
    Pending,
    Open,
    Close,
    Claimable,
}

impl RoundStatus {
    pub fn from_code(code: u64) -> Result<Self, DecodeError> {
        match code {
            0 => Ok(RoundStatus::Pending),
            1 => Ok(RoundStatus::Open),
            2 => Ok(RoundStatus::Close),
            3 => Ok(RoundStatus::Claimable),
            other => Err(DecodeError::UnknownStatus(other)),
        }
    }
}

/// Normalized lottery round, identical in shape whether or not the read succeeded.
///
/// Consumers branch on `is_loading` only. Every numeric field is a base-10 string,
/// empty when the round could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundRecord {
    pub is_loading: bool,
    pub round_id: RoundId,
    pub status: RoundStatus,
    pub start_time: DecimalString,
    pub end_time: DecimalString,
    pub ticket_price: DecimalString,
    pub discount_divisor: DecimalString,
    pub treasury_fee: DecimalString,
    pub first_ticket_id: DecimalString,
    pub last_ticket_id: DecimalString,
    pub amount_collected: DecimalString,
    pub final_number: Option<u32>,
    pub reward_per_bracket: Vec<DecimalString>,
    pub count_winners_per_bracket: Vec<DecimalString>,
    pub rewards_breakdown: Vec<DecimalString>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: String,
    pub number: u32,
    pub claimed: bool,
}

/// Tickets one account holds in a round.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundUserTickets {
    pub is_loading: bool,
    pub tickets: Vec<Ticket>,
}
