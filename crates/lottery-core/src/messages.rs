//! Logical messages exchanged with the lottery service.
//!
//! These are **transport-agnostic**: the text payload encoding and
//! the length-prefixed framing live elsewhere. Requests and replies
//! are paired by session sequencing, so none of these carries a
//! message-type discriminant of its own.

use crate::bet::Bet;

/// A bounded, ordered group of bets sent as one framed message.
///
/// Invariant: `bets` is never empty. `last` is set only on the batch
/// that exhausted the input source; its final record carries the
/// terminal flag on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub bets: Vec<Bet>,
    pub last: bool,
}

/// Notice that an agency has no more batches to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishedSending {
    pub agency_id: String,
}

/// Request for the lottery result of one agency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WinnersRequest {
    pub agency_id: String,
}

/// Binary application-level acknowledgment for a batch or for the
/// finished-sending notice. Any other payload is a protocol error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Accepted,
    Rejected,
}

impl Outcome {
    pub fn is_accepted(self) -> bool {
        matches!(self, Outcome::Accepted)
    }
}

/// Decoded reply to a [`WinnersRequest`].
///
/// `NotReady` is a retry signal, not an error: the lottery has not
/// been drawn yet and the client should ask again later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WinnersReply {
    NotReady,
    /// Document ids of the winning bets, possibly empty.
    Winners(Vec<String>),
}
