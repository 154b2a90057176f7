//! Text encoding/decoding for lottery client messages.
//!
//! This module converts between raw payload bytes (`&[u8]`) and the
//! logical types in `lottery_core`. Payloads are UTF-8 text; batch
//! payloads additionally carry a small binary sub-header per record.
//!
//! Payload formats:
//!
//! ```text
//! Client → server
//! ---------------
//! Batch:
//!   one or more records, each encoded as
//!   [0..4] record length (u32 BE)
//!   [4]    last-record flag (1 only on the final record of the
//!          final batch of the whole run, 0 otherwise)
//!   [5..]  record text:
//!          "AGENCY_ID=%s,NOMBRE=%s,APELLIDO=%s,DOCUMENTO=%s,NACIMIENTO=%s,NUMERO=%s"
//!
//! FinishedSending / WinnersRequest:
//!   "AGENCY_ID=%s"
//!
//! Server → client
//! ---------------
//! Outcome (ack for a batch or the finished notice):
//!   "success" | "error"            (ascii, trimmed)
//!
//! Winners reply:
//!   "NOT_READY"                    (lottery not drawn yet; retry)
//!   "WINNERS=<csv of documents>"   (possibly empty after the '=')
//! ```
//!
//! Keys are matched case-insensitively and values are trimmed.
//! Values are **not** escaped: a value containing `,` or `=` would
//! corrupt parsing, and rejecting such input is the record source's
//! responsibility.
//!
//! NOTE: This module encodes/decodes **one payload per buffer**. The
//! length-prefixed stream framing around these payloads lives in the
//! client crate.

use std::convert::TryFrom;
use std::fmt;

use lottery_core::{Batch, Bet, FinishedSending, Outcome, WinnersReply, WinnersRequest};

use crate::wire_types::{
    AGENCY_KEY, ERROR_STR, LAST_RECORD, NOT_READY_STR, RECORD_HEADER_LEN, SUCCESS_STR,
    WINNERS_KEY,
};

/// Errors that can arise when encoding/decoding a payload.
#[derive(Debug)]
pub enum ProtocolError {
    /// Buffer too short for the expected fields.
    Truncated,
    /// Payload is not valid UTF-8 where text was expected.
    InvalidUtf8,
    /// Response payload is none of the defined replies.
    UnknownResponse(String),
    /// A required key=value field is missing from a record.
    MissingField(&'static str),
    /// A field is present but semantically invalid.
    InvalidField(&'static str),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::Truncated => write!(f, "Buffer truncated"),
            ProtocolError::InvalidUtf8 => write!(f, "Payload is not valid UTF-8"),
            ProtocolError::UnknownResponse(payload) => {
                write!(f, "Unknown response payload: {:?}", payload)
            }
            ProtocolError::MissingField(field) => write!(f, "Missing field: {}", field),
            ProtocolError::InvalidField(field) => write!(f, "Invalid field: {}", field),
        }
    }
}

impl std::error::Error for ProtocolError {}

// ============================================================================
// Client → server
// ============================================================================

/// Encode one bet as its text record (without the sub-header).
pub fn encode_bet(bet: &Bet) -> Vec<u8> {
    format!(
        "AGENCY_ID={},NOMBRE={},APELLIDO={},DOCUMENTO={},NACIMIENTO={},NUMERO={}",
        bet.agency_id, bet.first_name, bet.last_name, bet.document, bet.birth_date, bet.number,
    )
    .into_bytes()
}

/// Parse a bet record back out of its text form.
///
/// This is the receiving side of [`encode_bet`]; the client itself
/// never decodes bets, but tests and tooling do.
pub fn parse_bet(text: &str) -> Result<Bet, ProtocolError> {
    let mut agency_id = None;
    let mut first_name = None;
    let mut last_name = None;
    let mut document = None;
    let mut birth_date = None;
    let mut number = None;

    for part in text.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let (key, value) = match part.split_once('=') {
            Some(kv) => kv,
            None => continue,
        };
        let value = value.trim().to_string();
        match key.trim().to_ascii_uppercase().as_str() {
            "AGENCY_ID" => agency_id = Some(value),
            "NOMBRE" => first_name = Some(value),
            "APELLIDO" => last_name = Some(value),
            "DOCUMENTO" => document = Some(value),
            "NACIMIENTO" => birth_date = Some(value),
            "NUMERO" => number = Some(value),
            _ => {}
        }
    }

    Ok(Bet {
        agency_id: agency_id.ok_or(ProtocolError::MissingField("AGENCY_ID"))?,
        first_name: first_name.ok_or(ProtocolError::MissingField("NOMBRE"))?,
        last_name: last_name.ok_or(ProtocolError::MissingField("APELLIDO"))?,
        document: document.ok_or(ProtocolError::MissingField("DOCUMENTO"))?,
        birth_date: birth_date.ok_or(ProtocolError::MissingField("NACIMIENTO"))?,
        number: number.ok_or(ProtocolError::MissingField("NUMERO"))?,
    })
}

/// Encode a batch payload: every record with its `[len][flag]`
/// sub-header. The encoded bytes are appended to `out`.
pub fn encode_batch(batch: &Batch, out: &mut Vec<u8>) -> Result<(), ProtocolError> {
    if batch.bets.is_empty() {
        return Err(ProtocolError::InvalidField("batch"));
    }

    let final_idx = batch.bets.len() - 1;
    for (idx, bet) in batch.bets.iter().enumerate() {
        let text = encode_bet(bet);
        let len =
            u32::try_from(text.len()).map_err(|_| ProtocolError::InvalidField("record length"))?;

        out.extend_from_slice(&len.to_be_bytes());
        out.push(if batch.last && idx == final_idx {
            LAST_RECORD
        } else {
            0
        });
        out.extend_from_slice(&text);
    }

    Ok(())
}

/// Decode a batch payload back into its bets.
///
/// Rejects truncated sub-headers, unknown flag values and a terminal
/// flag on anything but the final record.
pub fn decode_batch(buf: &[u8]) -> Result<Batch, ProtocolError> {
    let mut bets = Vec::new();
    let mut last = false;
    let mut offset = 0;

    while offset < buf.len() {
        if last {
            // A flagged record must be the final one in the payload.
            return Err(ProtocolError::InvalidField("last-record flag"));
        }
        if buf.len() - offset < RECORD_HEADER_LEN {
            return Err(ProtocolError::Truncated);
        }

        let len = read_u32_be(&buf[offset..offset + 4]) as usize;
        let flag = buf[offset + 4];
        offset += RECORD_HEADER_LEN;

        last = match flag {
            0 => false,
            LAST_RECORD => true,
            _ => return Err(ProtocolError::InvalidField("last-record flag")),
        };

        if buf.len() - offset < len {
            return Err(ProtocolError::Truncated);
        }

        let text =
            std::str::from_utf8(&buf[offset..offset + len]).map_err(|_| ProtocolError::InvalidUtf8)?;
        bets.push(parse_bet(text)?);
        offset += len;
    }

    if bets.is_empty() {
        return Err(ProtocolError::InvalidField("batch"));
    }

    Ok(Batch { bets, last })
}

/// Encode the finished-sending notice. Appended to `out`.
pub fn encode_finished(msg: &FinishedSending, out: &mut Vec<u8>) -> Result<(), ProtocolError> {
    out.extend_from_slice(format!("{}={}", AGENCY_KEY, msg.agency_id).as_bytes());
    Ok(())
}

/// Encode a winners request. Appended to `out`.
pub fn encode_winners_request(msg: &WinnersRequest, out: &mut Vec<u8>) -> Result<(), ProtocolError> {
    out.extend_from_slice(format!("{}={}", AGENCY_KEY, msg.agency_id).as_bytes());
    Ok(())
}

// ============================================================================
// Server → client
// ============================================================================

/// Decode the acknowledgment payload for a batch or the finished
/// notice: trimmed `"success"` or `"error"`, anything else is a
/// protocol violation.
pub fn decode_outcome(buf: &[u8]) -> Result<Outcome, ProtocolError> {
    let text = std::str::from_utf8(buf).map_err(|_| ProtocolError::InvalidUtf8)?;

    match text.trim() {
        SUCCESS_STR => Ok(Outcome::Accepted),
        ERROR_STR => Ok(Outcome::Rejected),
        other => Err(ProtocolError::UnknownResponse(other.to_string())),
    }
}

/// Decode the reply to a winners request.
///
/// `"NOT_READY"` means retry later; `"WINNERS=<csv>"` carries the
/// winner documents (an empty value is an empty list, not an error).
pub fn decode_winners_reply(buf: &[u8]) -> Result<WinnersReply, ProtocolError> {
    let text = std::str::from_utf8(buf).map_err(|_| ProtocolError::InvalidUtf8)?;
    let trimmed = text.trim();

    if trimmed.eq_ignore_ascii_case(NOT_READY_STR) {
        return Ok(WinnersReply::NotReady);
    }

    let (key, value) = trimmed
        .split_once('=')
        .ok_or_else(|| ProtocolError::UnknownResponse(trimmed.to_string()))?;

    if !key.trim().eq_ignore_ascii_case(WINNERS_KEY) {
        return Err(ProtocolError::UnknownResponse(trimmed.to_string()));
    }

    let value = value.trim();
    if value.is_empty() {
        return Ok(WinnersReply::Winners(Vec::new()));
    }

    let winners = value.split(',').map(|doc| doc.trim().to_string()).collect();
    Ok(WinnersReply::Winners(winners))
}

// -----------------------------------------------------------------------------
// Helpers
// -----------------------------------------------------------------------------

fn read_u32_be(bytes: &[u8]) -> u32 {
    let arr: [u8; 4] = bytes[0..4].try_into().expect("slice with incorrect length");
    u32::from_be_bytes(arr)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bet(n: u32) -> Bet {
        Bet {
            agency_id: "1".to_string(),
            first_name: format!("Name{}", n),
            last_name: format!("Surname{}", n),
            document: format!("3000000{}", n),
            birth_date: "1990-01-01".to_string(),
            number: format!("{}", 7000 + n),
        }
    }

    #[test]
    fn bet_text_has_fixed_field_order() {
        let text = encode_bet(&bet(1));
        assert_eq!(
            text,
            b"AGENCY_ID=1,NOMBRE=Name1,APELLIDO=Surname1,DOCUMENTO=30000001,NACIMIENTO=1990-01-01,NUMERO=7001"
        );
    }

    #[test]
    fn bet_round_trips_through_text() {
        let original = bet(2);
        let text = encode_bet(&original);
        let parsed = parse_bet(std::str::from_utf8(&text).unwrap()).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn parse_bet_rejects_missing_fields() {
        let err = parse_bet("AGENCY_ID=1,NOMBRE=a,APELLIDO=b").unwrap_err();
        assert!(matches!(err, ProtocolError::MissingField("DOCUMENTO")));
    }

    #[test]
    fn batch_payload_round_trips() {
        let batch = Batch {
            bets: vec![bet(1), bet(2), bet(3)],
            last: true,
        };
        let mut payload = Vec::new();
        encode_batch(&batch, &mut payload).unwrap();

        let decoded = decode_batch(&payload).unwrap();
        assert_eq!(decoded, batch);
    }

    #[test]
    fn only_final_record_of_last_batch_is_flagged() {
        let batch = Batch {
            bets: vec![bet(1), bet(2)],
            last: true,
        };
        let mut payload = Vec::new();
        encode_batch(&batch, &mut payload).unwrap();

        let first_len = read_u32_be(&payload[0..4]) as usize;
        assert_eq!(payload[4], 0);
        assert_eq!(payload[RECORD_HEADER_LEN + first_len + 4], LAST_RECORD);
    }

    #[test]
    fn non_last_batch_has_no_flagged_record() {
        let batch = Batch {
            bets: vec![bet(1), bet(2)],
            last: false,
        };
        let mut payload = Vec::new();
        encode_batch(&batch, &mut payload).unwrap();

        let decoded = decode_batch(&payload).unwrap();
        assert!(!decoded.last);
    }

    #[test]
    fn empty_batch_is_an_encode_error() {
        let batch = Batch {
            bets: Vec::new(),
            last: true,
        };
        let mut payload = Vec::new();
        assert!(encode_batch(&batch, &mut payload).is_err());
    }

    #[test]
    fn decode_batch_rejects_truncated_sub_header() {
        assert!(matches!(
            decode_batch(&[0, 0, 0]),
            Err(ProtocolError::Truncated)
        ));
    }

    #[test]
    fn decode_batch_rejects_short_record_body() {
        let mut payload = Vec::new();
        payload.extend_from_slice(&100u32.to_be_bytes());
        payload.push(0);
        payload.extend_from_slice(b"too short");
        assert!(matches!(
            decode_batch(&payload),
            Err(ProtocolError::Truncated)
        ));
    }

    #[test]
    fn decode_batch_rejects_flag_on_non_final_record() {
        let flagged = Batch {
            bets: vec![bet(1)],
            last: true,
        };
        let trailing = Batch {
            bets: vec![bet(2)],
            last: false,
        };
        let mut payload = Vec::new();
        encode_batch(&flagged, &mut payload).unwrap();
        encode_batch(&trailing, &mut payload).unwrap();

        assert!(matches!(
            decode_batch(&payload),
            Err(ProtocolError::InvalidField("last-record flag"))
        ));
    }

    #[test]
    fn finished_and_winners_request_carry_the_agency() {
        let mut finished = Vec::new();
        encode_finished(
            &FinishedSending {
                agency_id: "3".to_string(),
            },
            &mut finished,
        )
        .unwrap();
        assert_eq!(finished, b"AGENCY_ID=3");

        let mut request = Vec::new();
        encode_winners_request(
            &WinnersRequest {
                agency_id: "3".to_string(),
            },
            &mut request,
        )
        .unwrap();
        assert_eq!(request, b"AGENCY_ID=3");
    }

    #[test]
    fn outcome_decoding() {
        assert_eq!(decode_outcome(b"success").unwrap(), Outcome::Accepted);
        assert_eq!(decode_outcome(b"error").unwrap(), Outcome::Rejected);
        assert_eq!(decode_outcome(b"  success\n").unwrap(), Outcome::Accepted);
        assert!(matches!(
            decode_outcome(b"maybe"),
            Err(ProtocolError::UnknownResponse(_))
        ));
    }

    #[test]
    fn winners_reply_decoding() {
        assert_eq!(
            decode_winners_reply(b"NOT_READY").unwrap(),
            WinnersReply::NotReady
        );
        assert_eq!(
            decode_winners_reply(b"not_ready\n").unwrap(),
            WinnersReply::NotReady
        );
        assert_eq!(
            decode_winners_reply(b"WINNERS=").unwrap(),
            WinnersReply::Winners(Vec::new())
        );
        assert_eq!(
            decode_winners_reply(b"WINNERS=111,222").unwrap(),
            WinnersReply::Winners(vec!["111".to_string(), "222".to_string()])
        );
        assert_eq!(
            decode_winners_reply(b" winners = 111 , 222 ").unwrap(),
            WinnersReply::Winners(vec!["111".to_string(), "222".to_string()])
        );
    }

    #[test]
    fn winners_reply_rejects_other_payloads() {
        assert!(matches!(
            decode_winners_reply(b"LOSERS=111"),
            Err(ProtocolError::UnknownResponse(_))
        ));
        assert!(matches!(
            decode_winners_reply(b"111,222"),
            Err(ProtocolError::UnknownResponse(_))
        ));
    }
}
