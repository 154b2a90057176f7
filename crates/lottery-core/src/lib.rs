//! lottery-core
//!
//! Pure lottery client logic:
//! - bet records
//! - logical protocol messages (batches, finished notice, winners)
//!
//! Wire-level encoding lives in the `lottery-protocol` crate; this
//! crate is transport-agnostic.

pub mod bet;
pub mod messages;

pub use bet::Bet;

pub use messages::{
    Batch,
    FinishedSending,
    Outcome,
    WinnersReply,
    WinnersRequest,
};
