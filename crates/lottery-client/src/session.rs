//! One client session against the lottery service.
//!
//! A session owns exactly one connection and drives it end-to-end:
//! connect, send every batch (each with a synchronous acknowledgment),
//! send the finished notice, poll for winners, terminate. One request
//! is in flight at a time; every send is followed by a blocking
//! receive before the next step.
//!
//! A batch the server answers with `"error"` is logged and skipped,
//! not fatal. Transport failures, malformed replies and a rejected
//! finished notice are fatal. Cancellation is checked between
//! discrete steps only, and the connection is closed on every exit
//! path, attempting a write-side shutdown first.

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{debug, error, info, warn};

use lottery_core::{Batch, Bet, FinishedSending, Outcome};
use lottery_protocol::text_codec;

use crate::batch::BatchAssembler;
use crate::cancel::CancelToken;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::frame;
use crate::poller::{self, PollOutcome};

/// How a session ended, short of a fatal error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Every batch was sent and the winners arrived.
    Completed { winners: Vec<String> },
    /// Cancellation stopped the session before completion.
    Cancelled,
}

/// Result of a finished session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub outcome: SessionOutcome,
    pub batches_sent: usize,
}

/// A single client run. The connection handle is exclusively owned
/// here; no other component closes or reuses it.
pub struct Session {
    config: ClientConfig,
    stream: Option<TcpStream>,
}

impl Session {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            stream: None,
        }
    }

    /// Drive the whole session. The connection is closed before this
    /// returns, on every path.
    pub async fn run(
        &mut self,
        bets: impl Iterator<Item = Bet>,
        cancel: &CancelToken,
    ) -> Result<SessionReport, ClientError> {
        let result = self.run_inner(bets, cancel).await;
        self.close_connection().await;

        match &result {
            Ok(report) => info!(
                action = "session",
                result = "success",
                agency_id = %self.config.agency_id,
                batches_sent = report.batches_sent,
            ),
            Err(err) => error!(
                action = "session",
                result = "fail",
                agency_id = %self.config.agency_id,
                error = %err,
            ),
        }

        result
    }

    async fn run_inner(
        &mut self,
        bets: impl Iterator<Item = Bet>,
        cancel: &CancelToken,
    ) -> Result<SessionReport, ClientError> {
        self.connect().await?;

        let mut batches_sent = 0;
        for batch in BatchAssembler::new(bets, self.config.batch_size) {
            if cancel.is_cancelled() {
                return Ok(self.cancelled_report(batches_sent));
            }

            match self.send_batch(&batch).await? {
                Outcome::Accepted => info!(
                    action = "batch_sent",
                    result = "success",
                    agency_id = %self.config.agency_id,
                    records = batch.bets.len(),
                ),
                // A per-batch rejection does not abort the run.
                Outcome::Rejected => warn!(
                    action = "batch_sent",
                    result = "rejected",
                    agency_id = %self.config.agency_id,
                    records = batch.bets.len(),
                ),
            }
            batches_sent += 1;
        }

        if cancel.is_cancelled() {
            return Ok(self.cancelled_report(batches_sent));
        }

        self.send_finished().await?;

        if cancel.is_cancelled() {
            return Ok(self.cancelled_report(batches_sent));
        }

        let stream = self.stream.as_mut().ok_or(ClientError::NotConnected)?;
        match poller::poll_until_ready(stream, &self.config, cancel).await? {
            PollOutcome::Winners(winners) => Ok(SessionReport {
                outcome: SessionOutcome::Completed { winners },
                batches_sent,
            }),
            PollOutcome::Cancelled => Ok(self.cancelled_report(batches_sent)),
        }
    }

    async fn connect(&mut self) -> Result<(), ClientError> {
        let addr = &self.config.server_addr;
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|source| ClientError::Connect {
                addr: addr.clone(),
                source,
            })?;

        info!(
            action = "connect",
            result = "success",
            agency_id = %self.config.agency_id,
            server = %addr,
        );
        self.stream = Some(stream);
        Ok(())
    }

    /// Send one batch and block for its acknowledgment.
    async fn send_batch(&mut self, batch: &Batch) -> Result<Outcome, ClientError> {
        let mut payload = Vec::new();
        text_codec::encode_batch(batch, &mut payload)?;

        let max_frame_len = self.config.max_frame_len;
        let stream = self.stream.as_mut().ok_or(ClientError::NotConnected)?;

        frame::send_frame(stream, &payload).await?;
        let reply = frame::receive_frame(stream, max_frame_len).await?;
        Ok(text_codec::decode_outcome(&reply)?)
    }

    /// Send the finished notice; anything but a positive
    /// acknowledgment is fatal.
    async fn send_finished(&mut self) -> Result<(), ClientError> {
        let notice = FinishedSending {
            agency_id: self.config.agency_id.clone(),
        };
        let mut payload = Vec::new();
        text_codec::encode_finished(&notice, &mut payload)?;

        let max_frame_len = self.config.max_frame_len;
        let stream = self.stream.as_mut().ok_or(ClientError::NotConnected)?;

        frame::send_frame(stream, &payload).await?;
        let reply = frame::receive_frame(stream, max_frame_len).await?;

        match text_codec::decode_outcome(&reply)? {
            Outcome::Accepted => {
                info!(
                    action = "finished_sent",
                    result = "success",
                    agency_id = %self.config.agency_id,
                );
                Ok(())
            }
            Outcome::Rejected => Err(ClientError::FinishedRejected),
        }
    }

    fn cancelled_report(&self, batches_sent: usize) -> SessionReport {
        info!(
            action = "session",
            result = "cancelled",
            agency_id = %self.config.agency_id,
            batches_sent,
        );
        SessionReport {
            outcome: SessionOutcome::Cancelled,
            batches_sent,
        }
    }

    /// Half-close the write side, then drop the socket. Both steps
    /// are best-effort and only logged.
    async fn close_connection(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            match stream.shutdown().await {
                Ok(()) => debug!(
                    action = "close_write",
                    result = "success",
                    agency_id = %self.config.agency_id,
                ),
                Err(err) => debug!(
                    action = "close_write",
                    result = "fail",
                    agency_id = %self.config.agency_id,
                    error = %err,
                ),
            }
            // Dropping the stream closes the socket.
            debug!(
                action = "close_connection",
                result = "success",
                agency_id = %self.config.agency_id,
            );
        }
    }
}
