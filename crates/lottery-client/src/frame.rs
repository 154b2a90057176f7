//! Length-prefixed framing over a byte stream.
//!
//! One frame is `[u32 BE length][payload]`. Both directions loop
//! across partial transfers: a single read or write moving fewer
//! bytes than requested is normal stream behavior, not completion
//! and not failure. Only zero progress or an OS error breaks a
//! transfer (`ConnectionBroken`); end-of-stream before the expected
//! byte count is `ConnectionClosed`.
//!
//! The functions are stateless across calls and generic over the
//! stream so tests can drive them through in-memory transports.

use std::convert::TryFrom;
use std::io::ErrorKind;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::trace;

use lottery_protocol::wire_types::HEADER_LEN;

use crate::error::ClientError;

/// Write one frame: the 4-byte big-endian length, then the payload.
pub async fn send_frame<W>(stream: &mut W, payload: &[u8]) -> Result<(), ClientError>
where
    W: AsyncWrite + Unpin,
{
    let len = u32::try_from(payload.len())
        .map_err(|_| ClientError::PayloadTooLarge(payload.len()))?;

    // write_all loops until every byte is flushed into the stream;
    // a short write never surfaces here as success.
    stream
        .write_all(&len.to_be_bytes())
        .await
        .map_err(map_write_err)?;
    stream.write_all(payload).await.map_err(map_write_err)?;
    stream.flush().await.map_err(map_write_err)?;

    trace!(action = "send_frame", result = "success", bytes = payload.len());
    Ok(())
}

/// Read one frame: exactly 4 header bytes, then exactly the declared
/// number of payload bytes.
///
/// Declared lengths above `max_len` are rejected before any
/// allocation happens.
pub async fn receive_frame<R>(stream: &mut R, max_len: usize) -> Result<Vec<u8>, ClientError>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; HEADER_LEN];
    stream.read_exact(&mut header).await.map_err(map_read_err)?;

    let declared = u32::from_be_bytes(header) as usize;
    if declared > max_len {
        return Err(ClientError::FrameTooLarge {
            declared,
            limit: max_len,
        });
    }

    let mut payload = vec![0u8; declared];
    stream.read_exact(&mut payload).await.map_err(map_read_err)?;

    trace!(action = "receive_frame", result = "success", bytes = declared);
    Ok(payload)
}

fn map_read_err(err: std::io::Error) -> ClientError {
    if err.kind() == ErrorKind::UnexpectedEof {
        ClientError::ConnectionClosed
    } else {
        ClientError::ConnectionBroken(err)
    }
}

fn map_write_err(err: std::io::Error) -> ClientError {
    // WriteZero is tokio's signal for a write making no progress.
    ClientError::ConnectionBroken(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::duplex;

    #[tokio::test]
    async fn round_trips_a_payload() {
        let (mut a, mut b) = duplex(1024);

        send_frame(&mut a, b"hello frame").await.unwrap();
        let payload = receive_frame(&mut b, 1024).await.unwrap();
        assert_eq!(payload, b"hello frame");
    }

    #[tokio::test]
    async fn round_trips_the_empty_payload() {
        let (mut a, mut b) = duplex(64);

        send_frame(&mut a, b"").await.unwrap();
        let payload = receive_frame(&mut b, 64).await.unwrap();
        assert!(payload.is_empty());
    }

    #[tokio::test]
    async fn survives_one_byte_transfers() {
        // A duplex with a 1-byte buffer forces every read and write
        // to move a single byte, so both loops must keep going until
        // the frame is complete.
        let (mut a, mut b) = duplex(1);
        let payload: Vec<u8> = (0..=255u8).collect();

        let (sent, received) = tokio::join!(
            send_frame(&mut a, &payload),
            receive_frame(&mut b, 4096),
        );

        sent.unwrap();
        assert_eq!(received.unwrap(), payload);
    }

    #[tokio::test]
    async fn rejects_an_implausible_declared_length() {
        let (mut a, mut b) = duplex(64);

        a.write_all(&u32::MAX.to_be_bytes()).await.unwrap();

        let err = receive_frame(&mut b, 1024).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::FrameTooLarge { declared, limit: 1024 } if declared == u32::MAX as usize
        ));
    }

    #[tokio::test]
    async fn eof_before_the_header_is_connection_closed() {
        let (a, mut b) = duplex(64);
        drop(a);

        let err = receive_frame(&mut b, 1024).await.unwrap_err();
        assert!(matches!(err, ClientError::ConnectionClosed));
    }

    #[tokio::test]
    async fn eof_mid_payload_is_connection_closed() {
        let (mut a, mut b) = duplex(64);

        a.write_all(&10u32.to_be_bytes()).await.unwrap();
        a.write_all(b"abc").await.unwrap();
        drop(a);

        let err = receive_frame(&mut b, 1024).await.unwrap_err();
        assert!(matches!(err, ClientError::ConnectionClosed));
    }

    #[tokio::test]
    async fn chunked_and_whole_transports_agree() {
        let payload = b"same frame either way".to_vec();

        let (mut a, mut b) = duplex(8192);
        send_frame(&mut a, &payload).await.unwrap();
        let whole = receive_frame(&mut b, 8192).await.unwrap();

        let (mut c, mut d) = duplex(1);
        let (sent, chunked) =
            tokio::join!(send_frame(&mut c, &payload), receive_frame(&mut d, 8192));
        sent.unwrap();

        assert_eq!(whole, chunked.unwrap());
    }
}
