//! Errors raised by the job record.

use std::time::Duration;

use thiserror::Error;

use crate::ports::{BrokerError, CodecError, QueueError};

#[derive(Debug, Error)]
pub enum JobError {
    /// Malformed input at construction (e.g. job id length).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Operation not valid in the job's current state.
    #[error("illegal state: {0}")]
    IllegalState(String),

    /// No result appeared before the deadline.
    #[error("timed out after {0:?} waiting for job result")]
    Timeout(Duration),

    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),

    #[error(transparent)]
    Broker(#[from] BrokerError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Delivery(#[from] QueueError),
}

/// Failure of a job that ran elsewhere.
///
/// Only the message text crosses the broker; the original error type and any
/// backtrace are gone.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("remote execution failed: {message}")]
pub struct RemoteExecutionError {
    message: String,
}

impl RemoteExecutionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
