use crate::{
    claims::has_round_been_claimed,
    codec::DecimalString,
    record::{
        RoundId,
        RoundRecord,
        RoundStatus,
        RoundUserTickets,
    },
};
use bigdecimal::BigDecimal;
use std::{
    collections::HashMap,
    sync::{
        Arc,
        Mutex,
        PoisonError,
        atomic::{
            AtomicUsize,
            Ordering,
        },
    },
};

/// Decoded decimals keyed by their string encoding. Clones share one table.
#[derive(Clone, Default)]
pub struct DecimalCache {
    entries: Arc<Mutex<HashMap<DecimalString, BigDecimal>>>,
    misses: Arc<AtomicUsize>,
}

impl DecimalCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decode(&self, value: &DecimalString) -> BigDecimal {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(decoded) = entries.get(value) {
            return decoded.clone();
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        let decoded = value.decode();
        entries.insert(value.clone(), decoded.clone());
        decoded
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of decodes that had to parse their input.
    pub fn misses(&self) -> usize {
        self.misses.load(Ordering::Relaxed)
    }
}

/// A round with its monetary amounts materialized for arithmetic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundView {
    pub is_loading: bool,
    pub round_id: RoundId,
    pub user_tickets: Option<RoundUserTickets>,
    pub status: RoundStatus,
    pub start_time: DecimalString,
    pub end_time: DecimalString,
    pub ticket_price: BigDecimal,
    pub discount_divisor: BigDecimal,
    pub treasury_fee: DecimalString,
    pub first_ticket_id: DecimalString,
    pub last_ticket_id: DecimalString,
    pub amount_collected: BigDecimal,
    pub final_number: Option<u32>,
    pub reward_per_bracket: Vec<DecimalString>,
    pub count_winners_per_bracket: Vec<DecimalString>,
    pub rewards_breakdown: Vec<DecimalString>,
}

impl RoundView {
    // Placeholder amounts read as zero; these return `None` instead.
    pub fn ticket_price_if_loaded(&self) -> Option<&BigDecimal> {
        (!self.is_loading).then_some(&self.ticket_price)
    }

    pub fn discount_divisor_if_loaded(&self) -> Option<&BigDecimal> {
        (!self.is_loading).then_some(&self.discount_divisor)
    }

    pub fn amount_collected_if_loaded(&self) -> Option<&BigDecimal> {
        (!self.is_loading).then_some(&self.amount_collected)
    }

    /// Whether the attached user has claimed anything in this round.
    pub fn user_has_claimed(&self) -> Option<bool> {
        self.user_tickets
            .as_ref()
            .map(|user| has_round_been_claimed(&user.tickets))
    }
}

#[derive(Clone, Default)]
pub struct RoundViewProjector {
    cache: DecimalCache,
}

impl RoundViewProjector {
    pub fn new(cache: DecimalCache) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &DecimalCache {
        &self.cache
    }

    pub fn project(
        &self,
        record: &RoundRecord,
        user_tickets: Option<&RoundUserTickets>,
    ) -> RoundView {
        RoundView {
            is_loading: record.is_loading,
            round_id: record.round_id.clone(),
            user_tickets: user_tickets.cloned(),
            status: record.status,
            start_time: record.start_time.clone(),
            end_time: record.end_time.clone(),
            ticket_price: self.cache.decode(&record.ticket_price),
            discount_divisor: self.cache.decode(&record.discount_divisor),
            treasury_fee: record.treasury_fee.clone(),
            first_ticket_id: record.first_ticket_id.clone(),
            last_ticket_id: record.last_ticket_id.clone(),
            amount_collected: self.cache.decode(&record.amount_collected),
            final_number: record.final_number,
            reward_per_bracket: record.reward_per_bracket.clone(),
            count_winners_per_bracket: record.count_winners_per_bracket.clone(),
            rewards_breakdown: record.rewards_breakdown.clone(),
        }
    }
}
