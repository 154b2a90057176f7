//! lottery-client
//!
//! The runnable lottery agency client: length-prefixed framing over
//! TCP, batch assembly, the session state machine and the winners
//! poller.

pub mod batch;
pub mod cancel;
pub mod config;
pub mod error;
pub mod frame;
pub mod poller;
pub mod records;
pub mod session;
