use crate::{
    NUM_BRACKETS,
    codec::{
        DecimalString,
        ledger_uint,
    },
    error::DecodeError,
    record::{
        RoundId,
        RoundRecord,
        RoundStatus,
    },
};
use bigdecimal::num_bigint::BigUint;
use serde_json::Value;
use std::fmt;

/// `viewLottery` answer as the ledger returns it, before any validation of its
/// meaning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRoundResponse {
    pub status: u64,
    pub start_time: BigUint,
    pub end_time: BigUint,
    pub ticket_price: BigUint,
    pub discount_divisor: BigUint,
    pub treasury_fee: BigUint,
    pub first_ticket_id: BigUint,
    pub last_ticket_id: BigUint,
    pub amount_collected: BigUint,
    pub final_number: Option<u32>,
    pub reward_per_bracket: Vec<BigUint>,
    pub count_winners_per_bracket: Vec<BigUint>,
    pub rewards_breakdown: Vec<BigUint>,
}

// Positional order of the `viewLottery` output tuple.
const FIELDS: [&str; 13] = [
    "status",
    "startTime",
    "endTime",
    "priceTicket",
    "discountDivisor",
    "treasuryFee",
    "firstTicketId",
    "lastTicketId",
    "amountCollected",
    "finalNumber",
    "rewardPerBracket",
    "countWinnersPerBracket",
    "rewardsBreakdown",
];

impl RawRoundResponse {
    /// Reads the loosely typed gateway answer. Accepts both the positional tuple and
    /// the named-field object form, bare or wrapped in a one-element result tuple.
    pub fn from_json(value: &Value) -> Result<Self, DecodeError> {
        let fields = RawFields::new(value)?;
        let status = fields.uint(0)?;
        let status = u64::try_from(&status).map_err(|_| DecodeError::OutOfRange {
            field: FIELDS[0],
            target: "u64",
        })?;
        Ok(Self {
            status,
            start_time: fields.uint(1)?,
            end_time: fields.uint(2)?,
            ticket_price: fields.uint(3)?,
            discount_divisor: fields.uint(4)?,
            treasury_fee: fields.uint(5)?,
            first_ticket_id: fields.uint(6)?,
            last_ticket_id: fields.uint(7)?,
            amount_collected: fields.uint(8)?,
            final_number: fields.final_number(9)?,
            reward_per_bracket: fields.uints(10)?,
            count_winners_per_bracket: fields.uints(11)?,
            rewards_breakdown: fields.uints(12)?,
        })
    }
}

struct RawFields<'a> {
    value: &'a Value,
}

impl<'a> RawFields<'a> {
    fn new(value: &'a Value) -> Result<Self, DecodeError> {
        match value {
            // contract outputs wrapped as a one-element result tuple
            Value::Array(items)
                if items.len() == 1
                    && matches!(items[0], Value::Array(_) | Value::Object(_)) =>
            {
                Ok(Self { value: &items[0] })
            }
            Value::Array(_) | Value::Object(_) => Ok(Self { value }),
            other => Err(DecodeError::Shape(json_kind(other).to_string())),
        }
    }

    fn get(&self, index: usize) -> Option<&'a Value> {
        match self.value {
            Value::Array(items) => items.get(index),
            Value::Object(fields) => fields.get(FIELDS[index]),
            _ => None,
        }
    }

    fn required(&self, index: usize) -> Result<&'a Value, DecodeError> {
        self.get(index)
            .ok_or(DecodeError::MissingField(FIELDS[index]))
    }

    fn uint(&self, index: usize) -> Result<BigUint, DecodeError> {
        ledger_uint(self.required(index)?).map_err(|source| DecodeError::Field {
            field: FIELDS[index],
            source,
        })
    }

    fn final_number(&self, index: usize) -> Result<Option<u32>, DecodeError> {
        match self.get(index) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => {
                let number =
                    ledger_uint(value).map_err(|source| DecodeError::Field {
                        field: FIELDS[index],
                        source,
                    })?;
                u32::try_from(&number)
                    .map(Some)
                    .map_err(|_| DecodeError::OutOfRange {
                        field: FIELDS[index],
                        target: "u32",
                    })
            }
        }
    }

    fn uints(&self, index: usize) -> Result<Vec<BigUint>, DecodeError> {
        match self.required(index)? {
            Value::Array(items) => items
                .iter()
                .map(|item| {
                    ledger_uint(item).map_err(|source| DecodeError::Field {
                        field: FIELDS[index],
                        source,
                    })
                })
                .collect(),
            other => Err(DecodeError::Shape(format!(
                "{} in `{}`",
                json_kind(other),
                FIELDS[index]
            ))),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Maps a successful ledger read onto the canonical record.
pub fn normalize_success(
    raw: &RawRoundResponse,
    round_id: RoundId,
) -> Result<RoundRecord, DecodeError> {
    let status = RoundStatus::from_code(raw.status)?;
    Ok(RoundRecord {
        is_loading: false,
        round_id,
        status,
        start_time: DecimalString::encode(&raw.start_time),
        end_time: DecimalString::encode(&raw.end_time),
        ticket_price: DecimalString::encode(&raw.ticket_price),
        discount_divisor: DecimalString::encode(&raw.discount_divisor),
        treasury_fee: DecimalString::encode(&raw.treasury_fee),
        first_ticket_id: DecimalString::encode(&raw.first_ticket_id),
        last_ticket_id: DecimalString::encode(&raw.last_ticket_id),
        amount_collected: DecimalString::encode(&raw.amount_collected),
        final_number: raw.final_number,
        reward_per_bracket: encode_brackets(&raw.reward_per_bracket, FIELDS[10])?,
        count_winners_per_bracket: encode_brackets(
            &raw.count_winners_per_bracket,
            FIELDS[11],
        )?,
        rewards_breakdown: encode_brackets(&raw.rewards_breakdown, FIELDS[12])?,
    })
}

fn encode_brackets(
    values: &[BigUint],
    field: &'static str,
) -> Result<Vec<DecimalString>, DecodeError> {
    if values.len() != NUM_BRACKETS {
        return Err(DecodeError::BracketCount {
            field,
            found: values.len(),
            expected: NUM_BRACKETS,
        });
    }
    Ok(values.iter().map(DecimalString::encode).collect())
}

/// Placeholder for a round that could not be read. Depends on `round_id` only.
pub fn normalize_failure(round_id: RoundId) -> RoundRecord {
    RoundRecord {
        is_loading: true,
        round_id,
        status: RoundStatus::Pending,
        start_time: DecimalString::empty(),
        end_time: DecimalString::empty(),
        ticket_price: DecimalString::empty(),
        discount_divisor: DecimalString::empty(),
        treasury_fee: DecimalString::empty(),
        first_ticket_id: DecimalString::empty(),
        last_ticket_id: DecimalString::empty(),
        amount_collected: DecimalString::empty(),
        final_number: None,
        reward_per_bracket: Vec::new(),
        count_winners_per_bracket: Vec::new(),
        rewards_breakdown: Vec::new(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The read, or the whole batch carrying it, never produced an answer.
    Transport(String),
    /// The batch answered but flagged this call as failed.
    Absent,
    /// The batch answered with fewer slots than calls.
    MissingSlot,
    Decode(DecodeError),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Transport(message) => write!(f, "transport: {message}"),
            FailureReason::Absent => write!(f, "call failed inside batch"),
            FailureReason::MissingSlot => write!(f, "no result slot in batch"),
            FailureReason::Decode(err) => write!(f, "decode: {err}"),
        }
    }
}

/// Result of reading one round, before it is flattened into a [`RoundRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundOutcome {
    Loaded(RoundRecord),
    Failed {
        round_id: RoundId,
        reason: FailureReason,
    },
}

impl RoundOutcome {
    pub fn failed(round_id: RoundId, reason: FailureReason) -> Self {
        RoundOutcome::Failed { round_id, reason }
    }

    /// Decodes a ledger answer for `round_id`; `None` is a call the batch flagged
    /// as failed.
    pub fn from_response(round_id: RoundId, response: Option<&Value>) -> Self {
        let Some(response) = response else {
            return Self::failed(round_id, FailureReason::Absent);
        };
        let decoded = RawRoundResponse::from_json(response)
            .and_then(|raw| normalize_success(&raw, round_id.clone()));
        match decoded {
            Ok(record) => RoundOutcome::Loaded(record),
            Err(err) => Self::failed(round_id, FailureReason::Decode(err)),
        }
    }

    pub fn round_id(&self) -> &RoundId {
        match self {
            RoundOutcome::Loaded(record) => &record.round_id,
            RoundOutcome::Failed { round_id, .. } => round_id,
        }
    }

    pub fn failure(&self) -> Option<&FailureReason> {
        match self {
            RoundOutcome::Loaded(_) => None,
            RoundOutcome::Failed { reason, .. } => Some(reason),
        }
    }

    pub fn into_record(self) -> RoundRecord {
        match self {
            RoundOutcome::Loaded(record) => record,
            RoundOutcome::Failed { round_id, .. } => normalize_failure(round_id),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn named_response() -> Value {
        json!({
            "status": 3,
            "startTime": "1700000000",
            "endTime": 1700043200u64,
            "priceTicket": "5000000000000000000",
            "discountDivisor": "2000",
            "treasuryFee": 300,
            "firstTicketId": "0x64",
            "lastTicketId": "0xc7",
            "amountCollected": {"type": "BigNumber", "hex": "0x0de0b6b3a7640000"},
            "finalNumber": 1327465,
            "rewardPerBracket": ["1", "2", "3", "4", "5", "6"],
            "countWinnersPerBracket": [0, 0, 1, 0, 2, 0],
            "rewardsBreakdown": [250, 375, 625, 1250, 2500, 5000],
        })
    }

    #[test]
    fn normalize_success__encodes_every_field_as_decimal() {
        // given
        let raw = RawRoundResponse::from_json(&named_response()).unwrap();

        // when
        let record = normalize_success(&raw, RoundId::from("7")).unwrap();

        // then
        assert!(!record.is_loading);
        assert_eq!(record.round_id, RoundId::from("7"));
        assert_eq!(record.status, RoundStatus::Claimable);
        assert_eq!(record.start_time.as_str(), "1700000000");
        assert_eq!(record.end_time.as_str(), "1700043200");
        assert_eq!(record.ticket_price.as_str(), "5000000000000000000");
        assert_eq!(record.treasury_fee.as_str(), "300");
        assert_eq!(record.first_ticket_id.as_str(), "100");
        assert_eq!(record.last_ticket_id.as_str(), "199");
        assert_eq!(record.amount_collected.as_str(), "1000000000000000000");
        assert_eq!(record.final_number, Some(1327465));
        assert_eq!(
            record
                .count_winners_per_bracket
                .iter()
                .map(DecimalString::as_str)
                .collect::<Vec<_>>(),
            vec!["0", "0", "1", "0", "2", "0"]
        );
        assert_eq!(record.rewards_breakdown.len(), NUM_BRACKETS);
    }

    #[test]
    fn from_json__reads_positional_tuple_like_named_object() {
        // given
        let named = named_response();
        let positional = Value::Array(
            FIELDS
                .iter()
                .map(|name| named[*name].clone())
                .collect(),
        );

        // when
        let from_named = RawRoundResponse::from_json(&named).unwrap();
        let from_tuple = RawRoundResponse::from_json(&positional).unwrap();

        // then
        assert_eq!(from_named, from_tuple);
    }

    #[test]
    fn from_json__unresolved_final_number_is_none() {
        // given
        let mut response = named_response();
        response["finalNumber"] = Value::Null;

        // when
        let raw = RawRoundResponse::from_json(&response).unwrap();

        // then
        assert_eq!(raw.final_number, None);
    }

    #[test]
    fn from_json__reports_missing_and_malformed_fields() {
        let mut missing = named_response();
        missing.as_object_mut().unwrap().remove("priceTicket");
        assert_eq!(
            RawRoundResponse::from_json(&missing),
            Err(DecodeError::MissingField("priceTicket"))
        );

        let mut malformed = named_response();
        malformed["endTime"] = json!("soon");
        assert!(matches!(
            RawRoundResponse::from_json(&malformed),
            Err(DecodeError::Field {
                field: "endTime",
                ..
            })
        ));

        assert_eq!(
            RawRoundResponse::from_json(&json!("0x01")),
            Err(DecodeError::Shape("string".to_string()))
        );
    }

    #[test]
    fn normalize_success__rejects_unknown_status_instead_of_guessing() {
        // given
        let mut raw = RawRoundResponse::from_json(&named_response()).unwrap();
        raw.status = 9;

        // when
        let result = normalize_success(&raw, RoundId::from("7"));

        // then
        assert_eq!(result, Err(DecodeError::UnknownStatus(9)));
    }

    #[test]
    fn normalize_success__rejects_short_bracket_sequences() {
        // given
        let mut raw = RawRoundResponse::from_json(&named_response()).unwrap();
        raw.rewards_breakdown.pop();

        // when
        let result = normalize_success(&raw, RoundId::from("7"));

        // then
        assert_eq!(
            result,
            Err(DecodeError::BracketCount {
                field: "rewardsBreakdown",
                found: NUM_BRACKETS - 1,
                expected: NUM_BRACKETS,
            })
        );
    }

    #[test]
    fn normalize_failure__is_a_function_of_the_id_only() {
        // when
        let first = normalize_failure(RoundId::from("11"));
        let second = normalize_failure(RoundId::from("11"));

        // then
        assert_eq!(first, second);
        assert!(first.is_loading);
        assert_eq!(first.round_id, RoundId::from("11"));
        assert_eq!(first.status, RoundStatus::Pending);
        assert!(first.ticket_price.is_empty());
        assert!(first.amount_collected.is_empty());
        assert_eq!(first.final_number, None);
        assert!(first.reward_per_bracket.is_empty());
    }

    #[test]
    fn from_response__keeps_failure_reason_inspectable() {
        // given
        let mut bad_status = named_response();
        bad_status["status"] = json!(4);

        // when
        let absent = RoundOutcome::from_response(RoundId::from("1"), None);
        let undecodable =
            RoundOutcome::from_response(RoundId::from("2"), Some(&bad_status));

        // then
        assert_eq!(absent.failure(), Some(&FailureReason::Absent));
        assert_eq!(
            undecodable.failure(),
            Some(&FailureReason::Decode(DecodeError::UnknownStatus(4)))
        );
        assert_eq!(undecodable.into_record(), normalize_failure(RoundId::from("2")));
    }

    #[test]
    fn serialize__uses_camel_case_store_shape() {
        // given
        let record = normalize_failure(RoundId::from("3"));

        // when
        let json = serde_json::to_value(&record).unwrap();

        // then
        assert_eq!(json["isLoading"], json!(true));
        assert_eq!(json["roundId"], json!("3"));
        assert_eq!(json["status"], json!("pending"));
        assert_eq!(json["ticketPrice"], json!(""));
        assert_eq!(json["finalNumber"], Value::Null);
        assert_eq!(json["rewardPerBracket"], json!([]));
        let back: RoundRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn from_response__unwraps_one_element_result_tuple() {
        // given
        let named = named_response();
        let positional = Value::Array(
            FIELDS
                .iter()
                .map(|name| named[*name].clone())
                .collect(),
        );
        let bare = RoundOutcome::from_response(RoundId::from("7"), Some(&named));

        // when
        let wrapped_named = RoundOutcome::from_response(
            RoundId::from("7"),
            Some(&json!([named.clone()])),
        );
        let wrapped_tuple = RoundOutcome::from_response(
            RoundId::from("7"),
            Some(&json!([positional])),
        );

        // then
        assert!(matches!(bare, RoundOutcome::Loaded(_)));
        assert_eq!(wrapped_named, bare);
        assert_eq!(wrapped_tuple, bare);
    }

    #[test]
    fn from_json__one_element_scalar_tuple_is_not_unwrapped() {
        assert_eq!(
            RawRoundResponse::from_json(&json!(["3"])),
            Err(DecodeError::MissingField("startTime"))
        );
    }

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::from),
            any::<u64>().prop_map(Value::from),
            any::<f64>().prop_map(Value::from),
            "(0x)?[0-9a-fA-F]{0,20}".prop_map(Value::String),
            "\\PC{0,12}".prop_map(Value::String),
        ];
        leaf.prop_recursive(4, 64, 14, |inner| {
            let key = prop_oneof![
                prop::sample::select(FIELDS.to_vec()).prop_map(String::from),
                "[a-zA-Z]{1,12}".prop_map(String::from),
            ];
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..14).prop_map(Value::Array),
                prop::collection::hash_map(key, inner, 0..14)
                    .prop_map(|fields| Value::Object(fields.into_iter().collect())),
            ]
        })
    }

    // A well-formed answer with one field replaced, in any of the accepted framings.
    fn near_valid_response() -> impl Strategy<Value = Value> {
        (
            prop::sample::select(FIELDS.to_vec()),
            arb_json(),
            any::<bool>(),
            any::<bool>(),
        )
            .prop_map(|(field, replacement, positional, wrapped)| {
                let mut response = named_response();
                response[field] = replacement;
                let response = if positional {
                    Value::Array(
                        FIELDS
                            .iter()
                            .map(|name| response[*name].clone())
                            .collect(),
                    )
                } else {
                    response
                };
                if wrapped {
                    Value::Array(vec![response])
                } else {
                    response
                }
            })
    }

    fn arb_uint() -> impl Strategy<Value = BigUint> {
        prop::collection::vec(any::<u32>(), 0..9).prop_map(BigUint::new)
    }

    fn arb_brackets() -> impl Strategy<Value = Vec<BigUint>> {
        prop::collection::vec(arb_uint(), NUM_BRACKETS - 1..=NUM_BRACKETS + 1)
    }

    fn arb_raw_response() -> impl Strategy<Value = RawRoundResponse> {
        (
            prop_oneof![0u64..5, any::<u64>()],
            prop::collection::vec(arb_uint(), 8),
            prop::option::of(any::<u32>()),
            arb_brackets(),
            arb_brackets(),
            arb_brackets(),
        )
            .prop_map(
                |(
                    status,
                    scalars,
                    final_number,
                    reward_per_bracket,
                    count_winners_per_bracket,
                    rewards_breakdown,
                )| {
                    let mut scalars = scalars.into_iter();
                    let mut next = || scalars.next().unwrap_or_default();
                    RawRoundResponse {
                        status,
                        start_time: next(),
                        end_time: next(),
                        ticket_price: next(),
                        discount_divisor: next(),
                        treasury_fee: next(),
                        first_ticket_id: next(),
                        last_ticket_id: next(),
                        amount_collected: next(),
                        final_number,
                        reward_per_bracket,
                        count_winners_per_bracket,
                        rewards_breakdown,
                    }
                },
            )
    }

    proptest! {
        #[test]
        fn from_response__is_total_and_deterministic(
            response in prop_oneof![arb_json(), near_valid_response()],
            id in any::<i64>(),
        ) {
            let round_id = RoundId::from(id.to_string());

            let first = RoundOutcome::from_response(round_id.clone(), Some(&response));
            let second = RoundOutcome::from_response(round_id.clone(), Some(&response));

            prop_assert_eq!(&first, &second);
            prop_assert_eq!(first.round_id(), &round_id);
            prop_assert_eq!(first.into_record().round_id, round_id);
        }

        #[test]
        fn normalize_success__equal_inputs_give_equal_records(
            raw in arb_raw_response(),
            id in any::<i64>(),
        ) {
            let round_id = RoundId::from(id.to_string());
            let well_formed = raw.status <= 3
                && [
                    &raw.reward_per_bracket,
                    &raw.count_winners_per_bracket,
                    &raw.rewards_breakdown,
                ]
                .iter()
                .all(|brackets| brackets.len() == NUM_BRACKETS);

            let first = normalize_success(&raw, round_id.clone());
            let second = normalize_success(&raw.clone(), round_id.clone());

            prop_assert_eq!(&first, &second);
            prop_assert_eq!(first.is_ok(), well_formed);
            if let Ok(record) = first {
                prop_assert!(!record.is_loading);
                prop_assert_eq!(record.round_id, round_id);
                prop_assert_eq!(record.ticket_price.to_biguint(), Some(raw.ticket_price));
            }
        }
    }
}
