use fuels::types::ContractId;
use serde_json::Value;

pub mod gateway;

/// One read-only contract call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadCall {
    pub target: ContractId,
    pub method: String,
    pub params: Vec<Value>,
}

impl ReadCall {
    pub fn new(target: ContractId, method: impl Into<String>) -> Self {
        Self {
            target,
            method: method.into(),
            params: Vec::new(),
        }
    }

    pub fn with_param(mut self, param: impl Into<Value>) -> Self {
        self.params.push(param.into());
        self
    }
}

/// Access to ledger state. Results come back as the decoded, loosely typed output
/// of each call.
pub trait LedgerTransport {
    fn read(&self, call: ReadCall) -> impl Future<Output = anyhow::Result<Value>>;

    /// Sends every call in a single round-trip.
    ///
    /// `Err` means the batch as a whole never got an answer. Otherwise the result
    /// has one slot per call, in call order. With `require_success == false` a
    /// failing call yields a `None` slot; with `true` it fails the whole batch.
    fn read_batch(
        &self,
        calls: Vec<ReadCall>,
        require_success: bool,
    ) -> impl Future<Output = anyhow::Result<Vec<Option<Value>>>>;
}
