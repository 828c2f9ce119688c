use crate::record::Ticket;

/// True once any of the tickets has been claimed.
pub fn has_round_been_claimed(tickets: &[Ticket]) -> bool {
    tickets.iter().any(|ticket| ticket.claimed)
}
