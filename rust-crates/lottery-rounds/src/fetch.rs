use crate::{
    codec::{
        DecimalString,
        ledger_uint,
    },
    normalize::{
        FailureReason,
        RoundOutcome,
    },
    record::{
        RoundId,
        RoundRecord,
    },
    transport::{
        LedgerTransport,
        ReadCall,
    },
    window::recent_round_ids,
};
use fuels::types::ContractId;
use serde::{
    Deserialize,
    Serialize,
};
use serde_json::Value;
use tracing::{
    debug,
    warn,
};


pub const VIEW_LOTTERY: &str = "viewLottery";
pub const CURRENT_LOTTERY_ID: &str = "currentLotteryId";
pub const MAX_NUMBER_TICKETS_PER_BUY_OR_CLAIM: &str = "maxNumberTicketsPerBuyOrClaim";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentRoundInfo {
    pub current_round_id: Option<RoundId>,
    pub max_number_tickets_per_buy_or_claim: Option<DecimalString>,
}

/// Reads lottery rounds from one lottery contract.
///
/// Every fetch settles with a record per requested id. Failures surface as
/// loading placeholders, never as errors.
#[derive(Clone)]
pub struct LotteryReader<T> {
    transport: T,
    lottery: ContractId,
}

impl<T> LotteryReader<T> {
    pub fn new(transport: T, lottery: ContractId) -> Self {
        Self { transport, lottery }
    }

    pub fn lottery(&self) -> &ContractId {
        &self.lottery
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn view_round_call(&self, round_id: &RoundId) -> ReadCall {
        ReadCall::new(self.lottery, VIEW_LOTTERY).with_param(round_id.as_str())
    }
}

impl<T: LedgerTransport> LotteryReader<T> {
    pub async fn fetch_round_outcome(&self, round_id: &RoundId) -> RoundOutcome {
        match self.transport.read(self.view_round_call(round_id)).await {
            Ok(response) => RoundOutcome::from_response(round_id.clone(), Some(&response)),
            Err(err) => RoundOutcome::failed(
                round_id.clone(),
                FailureReason::Transport(format!("{err:#}")),
            ),
        }
    }

    pub async fn fetch_round(&self, round_id: &RoundId) -> RoundRecord {
        let outcome = self.fetch_round_outcome(round_id).await;
        log_failure(&outcome);
        outcome.into_record()
    }

    /// Reads all `round_ids` in one batched round-trip. The i-th outcome belongs to
    /// the i-th id whatever happens to the other calls.
    pub async fn fetch_round_outcomes(&self, round_ids: &[RoundId]) -> Vec<RoundOutcome> {
        if round_ids.is_empty() {
            return Vec::new();
        }
        let calls = round_ids
            .iter()
            .map(|round_id| self.view_round_call(round_id))
            .collect();
        debug!(count = round_ids.len(), "fetching lottery rounds");
        match self.transport.read_batch(calls, false).await {
            Ok(slots) => {
                if slots.len() > round_ids.len() {
                    warn!(
                        requested = round_ids.len(),
                        received = slots.len(),
                        "ignoring surplus multicall slots"
                    );
                }
                let mut slots = slots.into_iter();
                round_ids
                    .iter()
                    .map(|round_id| match slots.next() {
                        Some(slot) => {
                            RoundOutcome::from_response(round_id.clone(), slot.as_ref())
                        }
                        None => RoundOutcome::failed(
                            round_id.clone(),
                            FailureReason::MissingSlot,
                        ),
                    })
                    .collect()
            }
            Err(err) => {
                warn!(?err, count = round_ids.len(), "batched round fetch failed");
                let reason = FailureReason::Transport(format!("{err:#}"));
                round_ids
                    .iter()
                    .map(|round_id| RoundOutcome::failed(round_id.clone(), reason.clone()))
                    .collect()
            }
        }
    }

    pub async fn fetch_rounds(&self, round_ids: &[RoundId]) -> Vec<RoundRecord> {
        self.fetch_round_outcomes(round_ids)
            .await
            .into_iter()
            .map(|outcome| {
                log_failure(&outcome);
                outcome.into_record()
            })
            .collect()
    }

    pub async fn fetch_current_round_id_and_max_buy(&self) -> CurrentRoundInfo {
        let calls = vec![
            ReadCall::new(self.lottery, CURRENT_LOTTERY_ID),
            ReadCall::new(self.lottery, MAX_NUMBER_TICKETS_PER_BUY_OR_CLAIM),
        ];
        let slots = match self.transport.read_batch(calls, true).await {
            Ok(slots) => slots,
            Err(err) => {
                warn!(?err, "failed to fetch current lottery id");
                return CurrentRoundInfo::default();
            }
        };
        let mut slots = slots.into_iter();
        let current_round_id = slots
            .next()
            .flatten()
            .as_ref()
            .and_then(|value| single_uint(value, CURRENT_LOTTERY_ID))
            .map(|id| RoundId::from(id.to_string()));
        let max_number_tickets_per_buy_or_claim = slots
            .next()
            .flatten()
            .as_ref()
            .and_then(|value| single_uint(value, MAX_NUMBER_TICKETS_PER_BUY_OR_CLAIM));
        CurrentRoundInfo {
            current_round_id,
            max_number_tickets_per_buy_or_claim,
        }
    }

    /// The current round and the rounds before it, newest first. Empty when the
    /// current round id cannot be read.
    pub async fn fetch_recent_rounds(&self) -> Vec<RoundRecord> {
        let Some(current) = self
            .fetch_current_round_id_and_max_buy()
            .await
            .current_round_id
        else {
            return Vec::new();
        };
        match recent_round_ids(&current) {
            Ok(round_ids) => self.fetch_rounds(&round_ids).await,
            Err(err) => {
                warn!(%err, "current lottery id is not a number");
                Vec::new()
            }
        }
    }
}

// Single-output calls come back either bare or wrapped in a one-element tuple.
fn single_uint(value: &Value, method: &str) -> Option<DecimalString> {
    let value = match value {
        Value::Array(items) => items.first()?,
        other => other,
    };
    match ledger_uint(value) {
        Ok(number) => Some(DecimalString::encode(&number)),
        Err(err) => {
            warn!(%err, method, "unreadable lottery counter");
            None
        }
    }
}

fn log_failure(outcome: &RoundOutcome) {
    if let Some(reason) = outcome.failure() {
        warn!(round_id = %outcome.round_id(), %reason, "lottery round unavailable");
    }
}
