/// Namespace token prepended to every job id to form its broker key.
pub const JOB_KEY_PREFIX: &str = "jq:job:";

pub const FIELD_STATUS: &str = "status";
pub const FIELD_QUEUED_AT: &str = "queued_at";
pub const FIELD_STARTED_AT: &str = "started_at";
pub const FIELD_FINISHED_AT: &str = "finished_at";
pub const FIELD_RESULT: &str = "result";
pub const FIELD_ERROR: &str = "error";

pub const FIELD_TASK: &str = "task";
pub const FIELD_WORKER_ID: &str = "worker";

pub const FIELD_DESCRIPTION: &str = "description";
pub const FIELD_TIMEOUT: &str = "timeout";
pub const FIELD_TTL: &str = "ttl";
pub const FIELD_RESULT_TTL: &str = "result_ttl";
pub const FIELD_FAILURE_TTL: &str = "fail_ttl";

/// The broker key holding a job's field map.
pub fn job_key(job_id: &str) -> String {
    format!("{JOB_KEY_PREFIX}{job_id}")
}
