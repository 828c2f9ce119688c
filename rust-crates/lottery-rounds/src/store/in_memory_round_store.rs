use crate::{
    record::{
        RoundId,
        RoundRecord,
    },
    store::RoundStore,
};
use anyhow::anyhow;
use std::{
    collections::HashMap,
    sync::{
        Arc,
        Mutex,
        MutexGuard,
    },
};

#[derive(Clone, Default)]
pub struct InMemoryRoundStore {
    rounds: Arc<Mutex<HashMap<RoundId, RoundRecord>>>,
}

impl InMemoryRoundStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> anyhow::Result<MutexGuard<'_, HashMap<RoundId, RoundRecord>>> {
        self.rounds
            .lock()
            .map_err(|_| anyhow!("round store lock poisoned"))
    }
}

impl RoundStore for InMemoryRoundStore {
    fn upsert_rounds(&mut self, records: Vec<RoundRecord>) -> anyhow::Result<()> {
        let mut guard = self.lock()?;
        for record in records {
            guard.insert(record.round_id.clone(), record);
        }
        Ok(())
    }

    fn round(&self, round_id: &RoundId) -> anyhow::Result<Option<RoundRecord>> {
        Ok(self.lock()?.get(round_id).cloned())
    }

    fn rounds(&self) -> anyhow::Result<Vec<RoundRecord>> {
        let mut records: Vec<RoundRecord> = self.lock()?.values().cloned().collect();
        // non-numeric ids sort last
        records.sort_by(|a, b| b.round_id.numeric().cmp(&a.round_id.numeric()));
        Ok(records)
    }
}
