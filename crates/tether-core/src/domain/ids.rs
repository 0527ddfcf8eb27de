//! Job identifiers.
//!
//! A `JobId` is either supplied by the caller (and validated) or produced by
//! an [`IdGenerator`](crate::ports::IdGenerator). Once built it never changes,
//! and neither does the broker key derived from it.

use std::fmt;

use serde::{Deserialize, Serialize};
use ulid::Ulid;

use super::errors::JobError;

/// Shortest identifier a caller may supply.
pub const MIN_JOB_ID_LEN: usize = 4;

/// Longest identifier a caller may supply.
pub const MAX_JOB_ID_LEN: usize = 128;

/// Identifier of a job (submit/status/result unit).
///
/// Deserializing goes through [`JobId::parse`], so a stored id is held to the
/// same length rule as one passed in by a caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct JobId(String);

impl JobId {
    /// Validate a caller-supplied identifier.
    ///
    /// Length is counted in characters and must lie in
    /// `MIN_JOB_ID_LEN..=MAX_JOB_ID_LEN`.
    pub fn parse(value: impl Into<String>) -> Result<Self, JobError> {
        let value = value.into();
        let len = value.chars().count();
        if !(MIN_JOB_ID_LEN..=MAX_JOB_ID_LEN).contains(&len) {
            return Err(JobError::InvalidArgument(format!(
                "job id length must be between {MIN_JOB_ID_LEN} and {MAX_JOB_ID_LEN} characters, got {len}"
            )));
        }
        Ok(Self(value))
    }

    /// Wrap a ULID. Always valid: the textual form is 26 characters.
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self(ulid.to_string())
    }

    /// Identifier used where no validation is wanted (existence checks).
    pub(crate) fn unchecked(value: &str) -> Self {
        Self(value.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<Ulid> for JobId {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

impl TryFrom<String> for JobId {
    type Error = JobError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<JobId> for String {
    fn from(id: JobId) -> Self {
        id.0
    }
}

impl AsRef<str> for JobId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
