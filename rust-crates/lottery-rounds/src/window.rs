use crate::{
    NUM_ROUNDS_TO_FETCH_FROM_NODES,
    error::CodecError,
    record::RoundId,
};
use bigdecimal::num_bigint::BigInt;
use std::str::FromStr;

/// `W` round ids counting down from `current`: `[current, current - 1, ..]`.
///
/// No lower bound is applied. Ids below the first round come out negative and are
/// expected to fail their lookup.
pub fn round_id_window<const W: usize>(current: &str) -> Result<[RoundId; W], CodecError> {
    let current = BigInt::from_str(current.trim())
        .map_err(|_| CodecError::NotInteger(current.to_string()))?;
    Ok(std::array::from_fn(|offset| {
        RoundId::from((&current - BigInt::from(offset)).to_string())
    }))
}

pub fn recent_round_ids(
    current: &RoundId,
) -> Result<[RoundId; NUM_ROUNDS_TO_FETCH_FROM_NODES], CodecError> {
    round_id_window(current.as_str())
}
