use crate::record::{
    RoundId,
    RoundRecord,
};

pub mod in_memory_round_store;

pub use in_memory_round_store::InMemoryRoundStore;

pub trait RoundStore {
    /// write records, replacing any held for the same round id
    fn upsert_rounds(&mut self, records: Vec<RoundRecord>) -> anyhow::Result<()>;

    /// retrieve the latest record for the given round id
    fn round(&self, round_id: &RoundId) -> anyhow::Result<Option<RoundRecord>>;

    /// retrieve every held record, newest round first
    fn rounds(&self) -> anyhow::Result<Vec<RoundRecord>>;
}
