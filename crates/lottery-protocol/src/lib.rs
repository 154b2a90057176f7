//! lottery-protocol
//!
//! Payload-level encoding/decoding for the lottery client.
//!
//! This crate turns logical messages (`lottery_core` types) into
//! payload bytes and back again:
//!
//! - [`wire_types`] : sizes, flags and literal payload constants
//! - [`text_codec`] : the text payload codec itself
//!
//! The length-prefixed stream framing around these payloads lives in
//! the client crate, next to the socket it frames.

pub mod text_codec;
pub mod wire_types;

pub use text_codec::{
    decode_batch,
    decode_outcome,
    decode_winners_reply,
    encode_batch,
    encode_bet,
    encode_finished,
    encode_winners_request,
    parse_bet,
    ProtocolError,
};
