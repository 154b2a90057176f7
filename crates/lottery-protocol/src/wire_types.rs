//! Low-level wire constants.
//!
//! This module defines:
//! - Header sizes for frames and batch records.
//! - The literal ack / not-ready / winners payloads.
//! - The default ceiling for declared frame lengths.
//!
//! The actual encode/decode logic lives in `text_codec`; the
//! length-prefixed framing itself lives in the client crate.

/// Size of the big-endian `u32` length prefix of every frame.
pub const HEADER_LEN: usize = 4;

/// Size of the per-record sub-header inside a batch payload:
/// `[u32 record length][u8 last-record flag]`.
pub const RECORD_HEADER_LEN: usize = 5;

/// Flag value marking the final record of the final batch.
pub const LAST_RECORD: u8 = 1;

/// Default ceiling for declared frame lengths.
///
/// The length prefix allows up to `u32::MAX` bytes, but a peer
/// declaring anything near that is misbehaving; receivers reject
/// larger declarations before allocating.
pub const MAX_FRAME_LEN: usize = 8 * 1024 * 1024;

/// Positive acknowledgment payload.
pub const SUCCESS_STR: &str = "success";

/// Negative acknowledgment payload.
pub const ERROR_STR: &str = "error";

/// Payload signalling that the lottery has not been drawn yet.
pub const NOT_READY_STR: &str = "NOT_READY";

/// Key of the winners response payload (`WINNERS=<csv>`).
pub const WINNERS_KEY: &str = "WINNERS";

/// Key carried by the finished notice and the winners request.
pub const AGENCY_KEY: &str = "AGENCY_ID";
