pub mod claims;
pub mod codec;
pub mod error;
pub mod fetch;
pub mod normalize;
pub mod record;
pub mod store;
pub mod transport;
pub mod view;
pub mod window;

pub use claims::has_round_been_claimed;
pub use codec::DecimalString;
pub use error::{
    CodecError,
    DecodeError,
};
pub use fetch::{
    CurrentRoundInfo,
    LotteryReader,
};
pub use normalize::{
    FailureReason,
    RawRoundResponse,
    RoundOutcome,
};
pub use record::{
    RoundId,
    RoundRecord,
    RoundStatus,
    RoundUserTickets,
    Ticket,
};
pub use transport::{
    LedgerTransport,
    ReadCall,
};
pub use view::{
    DecimalCache,
    RoundView,
    RoundViewProjector,
};

/// How many rounds back from the current one are read when no index service is
/// available.
pub const NUM_ROUNDS_TO_FETCH_FROM_NODES: usize = 8;

/// Reward tiers in every round.
pub const NUM_BRACKETS: usize = 6;
