//! Polls the lottery service until the winners are available.
//!
//! The not-ready reply is a defined retry signal, not an error: the
//! poller sleeps a fixed interval (no backoff) and asks again on the
//! same connection, which the peer keeps open across not-ready
//! replies. Retries are unbounded; only cancellation ends the loop
//! early, and it is checked before each request, never mid-sleep.

use tokio::net::TcpStream;
use tokio::time::sleep;
use tracing::{debug, info};

use lottery_core::{WinnersReply, WinnersRequest};
use lottery_protocol::text_codec;

use crate::cancel::CancelToken;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::frame;

/// How a polling loop ended, short of a fatal error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The lottery was drawn; these are the agency's winners.
    Winners(Vec<String>),
    /// Cancellation was requested before the result arrived.
    Cancelled,
}

/// Issue winners requests until the service has a result.
pub async fn poll_until_ready(
    stream: &mut TcpStream,
    config: &ClientConfig,
    cancel: &CancelToken,
) -> Result<PollOutcome, ClientError> {
    let request = WinnersRequest {
        agency_id: config.agency_id.clone(),
    };
    let mut payload = Vec::new();
    text_codec::encode_winners_request(&request, &mut payload)?;

    loop {
        if cancel.is_cancelled() {
            info!(
                action = "poll_winners",
                result = "cancelled",
                agency_id = %config.agency_id,
            );
            return Ok(PollOutcome::Cancelled);
        }

        frame::send_frame(stream, &payload).await?;
        let reply = frame::receive_frame(stream, config.max_frame_len).await?;

        match text_codec::decode_winners_reply(&reply)? {
            WinnersReply::NotReady => {
                debug!(
                    action = "poll_winners",
                    result = "not_ready",
                    agency_id = %config.agency_id,
                );
                sleep(config.poll_interval()).await;
            }
            WinnersReply::Winners(winners) => {
                info!(
                    action = "poll_winners",
                    result = "success",
                    agency_id = %config.agency_id,
                    winners = winners.len(),
                );
                return Ok(PollOutcome::Winners(winners));
            }
        }
    }
}
