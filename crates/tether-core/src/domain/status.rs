//! Job status as persisted in the broker's `status` field.

use std::fmt;

use super::keys::{FIELD_FINISHED_AT, FIELD_QUEUED_AT, FIELD_STARTED_AT};

/// Lifecycle stage of a job.
///
/// State transitions:
/// - Queued -> Started -> Success
/// - Queued -> Started -> Failure
/// - any -> Deleted (explicit delete)
///
/// `Cancelled` is reserved; nothing in this crate transitions into it.
/// `Unknown` is what a reader sees when the field is absent or unparseable.
/// It is never written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobStatus {
    Queued,
    Started,
    Success,
    Failure,
    Cancelled,
    Deleted,
    Unknown,
}

impl JobStatus {
    /// Decode the raw field value. Never fails.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("QUEUED") => JobStatus::Queued,
            Some("STARTED") => JobStatus::Started,
            Some("SUCCESS") => JobStatus::Success,
            Some("FAILURE") => JobStatus::Failure,
            Some("CANCELLED") => JobStatus::Cancelled,
            Some("DELETED") => JobStatus::Deleted,
            _ => JobStatus::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Queued => "QUEUED",
            JobStatus::Started => "STARTED",
            JobStatus::Success => "SUCCESS",
            JobStatus::Failure => "FAILURE",
            JobStatus::Cancelled => "CANCELLED",
            JobStatus::Deleted => "DELETED",
            JobStatus::Unknown => "UNKNOWN",
        }
    }

    /// Is this a terminal state (no further transitions)?
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobStatus::Success | JobStatus::Failure | JobStatus::Cancelled | JobStatus::Deleted
        )
    }

    /// Timestamp field annotated when transitioning into this status.
    pub fn timestamp_field(self) -> Option<&'static str> {
        match self {
            JobStatus::Queued => Some(FIELD_QUEUED_AT),
            JobStatus::Started => Some(FIELD_STARTED_AT),
            JobStatus::Success | JobStatus::Failure => Some(FIELD_FINISHED_AT),
            _ => None,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
