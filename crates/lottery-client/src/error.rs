//! Error taxonomy for one client session.
//!
//! Everything here is fatal for the session: a batch the server
//! answers with `"error"` is only a logged warning and never becomes
//! a `ClientError`, and the not-ready poll reply is consumed inside
//! the winners poller.

use lottery_protocol::ProtocolError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The initial connect failed. There is no retry at this layer.
    #[error("failed to connect to {addr}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// A request was attempted without an open connection.
    #[error("not connected")]
    NotConnected,

    /// The peer closed the stream before a full frame was transferred.
    #[error("connection closed by peer")]
    ConnectionClosed,

    /// The transport failed mid-transfer.
    #[error("connection broken")]
    ConnectionBroken(#[source] std::io::Error),

    /// The peer declared a frame larger than we are willing to read.
    #[error("declared frame length {declared} exceeds limit {limit}")]
    FrameTooLarge { declared: usize, limit: usize },

    /// The payload cannot be described by a 32-bit length prefix.
    #[error("payload of {0} bytes does not fit in a frame")]
    PayloadTooLarge(usize),

    /// The peer sent a malformed or unexpected payload.
    #[error("protocol violation")]
    Protocol(#[from] ProtocolError),

    /// The server rejected the finished-sending notice.
    #[error("server rejected the finished-sending notice")]
    FinishedRejected,
}
