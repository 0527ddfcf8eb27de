//! Job record: a typed view over one broker field map.
//!
//! A `Job` holds only its identity, its options and (on the producer or after
//! a restore) its task descriptor. Status, timestamps, result and error live
//! in the broker and are read on every call. Several actors may hold their
//! own `Job` for the same id at once; they coordinate through the broker's
//! per-field atomicity alone, never through a lock.

use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use tokio::task::JoinError;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::queue::JobQueue;
use crate::domain::keys::{
    FIELD_DESCRIPTION, FIELD_ERROR, FIELD_FAILURE_TTL, FIELD_FINISHED_AT, FIELD_QUEUED_AT,
    FIELD_RESULT, FIELD_RESULT_TTL, FIELD_STARTED_AT, FIELD_STATUS, FIELD_TASK, FIELD_TIMEOUT,
    FIELD_TTL, FIELD_WORKER_ID, job_key,
};
use crate::domain::options::{secs_from_field, secs_to_field};
use crate::domain::{JobError, JobId, JobOptions, JobStatus, RemoteExecutionError, TaskEnvelope};
use crate::ports::{FieldMap, decode_typed, encode_typed};

/// Interval between two reads of the `result` field in [`Job::wait_for_result`].
pub const RESULT_POLL_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug)]
pub struct Job {
    id: JobId,
    key: String,
    task: Option<TaskEnvelope>,
    options: JobOptions,
    queue: JobQueue,
}

impl Job {
    /// A new job carrying `task`. Nothing is written until [`init_new_job`](Self::init_new_job).
    pub fn new(queue: &JobQueue, task: TaskEnvelope, options: JobOptions) -> Result<Self, JobError> {
        Self::build(queue, Some(task), options)
    }

    /// A handle on an existing job. Call [`restore_from_broker`](Self::restore_from_broker)
    /// to load its options and task, or use it as-is for status queries.
    pub fn lookup(queue: &JobQueue, job_id: &str) -> Result<Self, JobError> {
        Self::build(queue, None, JobOptions::new().with_job_id(job_id))
    }

    /// [`lookup`](Self::lookup) followed by a restore.
    pub async fn fetch(queue: &JobQueue, job_id: &str) -> Result<Self, JobError> {
        let mut job = Self::lookup(queue, job_id)?;
        job.restore_from_broker().await?;
        Ok(job)
    }

    fn build(
        queue: &JobQueue,
        task: Option<TaskEnvelope>,
        options: JobOptions,
    ) -> Result<Self, JobError> {
        let id = match options.job_id.as_deref() {
            Some(raw) => JobId::parse(raw)?,
            None => queue.id_generator().generate_job_id(),
        };
        let key = job_key(id.as_str());
        debug!(job_id = %id, queue = %queue.name(), "job created");
        Ok(Self {
            id,
            key,
            task,
            options,
            queue: queue.clone(),
        })
    }

    /// Does the broker hold a recognisable status for `job_id`?
    ///
    /// A deleted job still exists in this sense until the residual status
    /// field is collected.
    pub async fn exists(queue: &JobQueue, job_id: &str) -> Result<bool, JobError> {
        let status = Self::read_status(queue, job_id).await?;
        Ok(status != JobStatus::Unknown)
    }

    /// Like [`exists`](Self::exists), but a deleted job is not alive.
    pub async fn is_alive(queue: &JobQueue, job_id: &str) -> Result<bool, JobError> {
        let status = Self::read_status(queue, job_id).await?;
        Ok(!matches!(status, JobStatus::Unknown | JobStatus::Deleted))
    }

    async fn read_status(queue: &JobQueue, job_id: &str) -> Result<JobStatus, JobError> {
        let key = job_key(JobId::unchecked(job_id).as_str());
        let raw = queue.broker().get_field(&key, FIELD_STATUS).await?;
        Ok(JobStatus::parse(raw.as_deref()))
    }

    pub fn id(&self) -> &JobId {
        &self.id
    }

    /// Broker key of this job's field map.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Name of the queue this job belongs to.
    pub fn origin(&self) -> &str {
        self.queue.name()
    }

    pub fn options(&self) -> &JobOptions {
        &self.options
    }

    /// The task descriptor, if this job was created with one or restored.
    pub fn task(&self) -> Option<&TaskEnvelope> {
        self.task.as_ref()
    }

    /// Write the options and the encoded task in one batch, then mark the job
    /// QUEUED. The two steps are separate broker calls.
    pub async fn init_new_job(&self) -> Result<(), JobError> {
        let task = self.task.as_ref().ok_or_else(|| {
            JobError::IllegalState("only a job created with a task can be initialised".into())
        })?;
        let encoded_task = encode_typed(self.queue.codec(), task)?;

        let mut fields = FieldMap::new();
        fields.insert(FIELD_DESCRIPTION.into(), self.options.description.clone());
        fields.insert(FIELD_TIMEOUT.into(), secs_to_field(self.options.job_timeout));
        fields.insert(FIELD_TTL.into(), secs_to_field(self.options.ttl));
        fields.insert(FIELD_RESULT_TTL.into(), secs_to_field(self.options.result_ttl));
        fields.insert(FIELD_FAILURE_TTL.into(), secs_to_field(self.options.failure_ttl));
        fields.insert(FIELD_TASK.into(), encoded_task);

        self.queue.broker().put_all_fields(&self.key, fields).await?;
        self.set_status(JobStatus::Queued).await
    }

    /// Reload options and the task descriptor from the broker.
    ///
    /// Best effort: the numeric options are read in order and the first one
    /// that is missing or not an integer stops the restore. Fields after it,
    /// the task included, keep their current values and no error is raised.
    pub async fn restore_from_broker(&mut self) -> Result<(), JobError> {
        let fields = self.queue.broker().get_all_fields(&self.key).await?;

        if let Some(description) = fields.get(FIELD_DESCRIPTION) {
            self.options.description = description.clone();
        }

        let durations: [(&str, fn(&mut JobOptions, Duration)); 4] = [
            (FIELD_TIMEOUT, |o, d| o.job_timeout = d),
            (FIELD_TTL, |o, d| o.ttl = d),
            (FIELD_RESULT_TTL, |o, d| o.result_ttl = d),
            (FIELD_FAILURE_TTL, |o, d| o.failure_ttl = d),
        ];
        for (field, set) in durations {
            match secs_from_field(fields.get(field)) {
                Some(d) => set(&mut self.options, d),
                None => {
                    warn!(job_id = %self.id, field, "restore stopped at unreadable field");
                    return Ok(());
                }
            }
        }

        if let Some(text) = fields.get(FIELD_TASK) {
            self.task = Some(decode_typed(self.queue.codec(), text)?);
        }
        Ok(())
    }

    /// Stamp the transition's timestamp field (if it has one), then write the
    /// status. Readers may see either write without the other.
    pub async fn set_status(&self, status: JobStatus) -> Result<(), JobError> {
        if status == JobStatus::Unknown {
            return Err(JobError::InvalidArgument(
                "UNKNOWN is a read-side status and is never written".into(),
            ));
        }
        if let Some(field) = status.timestamp_field() {
            let now = self.queue.clock().now();
            self.put(field, &format_timestamp(now)).await?;
        }
        self.put(FIELD_STATUS, status.as_str()).await?;
        debug!(job_id = %self.id, %status, "status changed");
        Ok(())
    }

    /// Record which worker is running this job.
    pub async fn set_worker_id(&self, worker_id: &str) -> Result<(), JobError> {
        self.put(FIELD_WORKER_ID, worker_id).await
    }

    /// Run the task on this worker and persist the outcome.
    ///
    /// On success the encoded value goes to `result`, the job becomes SUCCESS
    /// and the value is returned. If the handler fails or panics, or no handler
    /// is registered, only the message text goes to `error`, the job becomes
    /// FAILURE and `Ok(None)` is returned. Broker and codec failures while
    /// persisting are the only errors surfaced.
    pub async fn perform(&self) -> Result<Option<serde_json::Value>, JobError> {
        let task = self.task.as_ref().ok_or_else(|| {
            JobError::IllegalState("job has no task; restore it from the broker first".into())
        })?;

        match self.execute(task).await {
            Ok(value) => {
                let text = self.queue.codec().encode_to_text(&value)?;
                self.put(FIELD_RESULT, &text).await?;
                self.set_status(JobStatus::Success).await?;
                Ok(Some(value))
            }
            Err(message) => {
                debug!(job_id = %self.id, error = %message, "task failed");
                self.fail(&message).await?;
                Ok(None)
            }
        }
    }

    /// Persist `message` as the job's error and mark it FAILURE without running anything.
    pub async fn fail(&self, message: &str) -> Result<(), JobError> {
        self.put(FIELD_ERROR, message).await?;
        self.set_status(JobStatus::Failure).await
    }

    async fn execute(&self, task: &TaskEnvelope) -> Result<serde_json::Value, String> {
        let handler = self
            .queue
            .registry()
            .resolve(task.task_type())
            .map_err(|e| e.to_string())?;
        let payload = task.payload().clone();

        // Spawned so a panicking handler becomes a failure instead of unwinding the worker.
        match tokio::spawn(async move { handler.handle_dyn(payload).await }).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(e.to_string()),
            Err(e) => Err(join_error_message(e)),
        }
    }

    /// Poll `result` every [`RESULT_POLL_INTERVAL`] until it appears, then decode it.
    ///
    /// A zero `timeout` checks once. Otherwise polling continues while the
    /// time elapsed since the call is below `timeout`.
    pub async fn wait_for_result<R: DeserializeOwned>(
        &self,
        timeout: Duration,
    ) -> Result<R, JobError> {
        let started = Instant::now();
        loop {
            if let Some(text) = self.get(FIELD_RESULT).await? {
                return Ok(decode_typed(self.queue.codec(), &text)?);
            }
            if timeout.is_zero() || started.elapsed() >= timeout {
                return Err(JobError::Timeout(timeout));
            }
            tokio::time::sleep(RESULT_POLL_INTERVAL).await;
        }
    }

    /// Remove the whole field map, then write DELETED onto the empty key.
    ///
    /// The key ends up holding a single `status` field.
    pub async fn delete(&self) -> Result<(), JobError> {
        self.queue.broker().remove_map(&self.key).await?;
        self.set_status(JobStatus::Deleted).await
    }

    /// Not implemented; always `Unsupported`.
    pub async fn cancel(&self) -> Result<bool, JobError> {
        Err(JobError::Unsupported("cancel"))
    }

    /// Current status. Absent or unparseable text reads as `Unknown`, and so
    /// does a broker failure, which is logged.
    pub async fn status(&self) -> JobStatus {
        match self.get(FIELD_STATUS).await {
            Ok(raw) => JobStatus::parse(raw.as_deref()),
            Err(e) => {
                warn!(job_id = %self.id, error = %e, "status read failed");
                JobStatus::Unknown
            }
        }
    }

    pub async fn enqueued_at(&self) -> Result<Option<DateTime<Utc>>, JobError> {
        self.timestamp(FIELD_QUEUED_AT).await
    }

    pub async fn started_at(&self) -> Result<Option<DateTime<Utc>>, JobError> {
        self.timestamp(FIELD_STARTED_AT).await
    }

    pub async fn finished_at(&self) -> Result<Option<DateTime<Utc>>, JobError> {
        self.timestamp(FIELD_FINISHED_AT).await
    }

    pub async fn worker_id(&self) -> Result<Option<String>, JobError> {
        self.get(FIELD_WORKER_ID).await
    }

    /// The persisted failure message. Empty when the job finished without one.
    pub async fn error(&self) -> Result<RemoteExecutionError, JobError> {
        self.ensure_finished().await?;
        let message = self.get(FIELD_ERROR).await?.unwrap_or_default();
        Ok(RemoteExecutionError::new(message))
    }

    /// The decoded result. `None` when the job finished without one.
    pub async fn result<R: DeserializeOwned>(&self) -> Result<Option<R>, JobError> {
        self.ensure_finished().await?;
        match self.get(FIELD_RESULT).await? {
            Some(text) => Ok(Some(decode_typed(self.queue.codec(), &text)?)),
            None => Ok(None),
        }
    }

    pub async fn is_started(&self) -> bool {
        self.status().await == JobStatus::Started
    }

    pub async fn is_done(&self) -> bool {
        self.status().await.is_terminal()
    }

    pub async fn is_cancelled(&self) -> bool {
        self.status().await == JobStatus::Cancelled
    }

    pub async fn is_success(&self) -> bool {
        self.status().await == JobStatus::Success
    }

    pub async fn is_failure(&self) -> bool {
        self.status().await == JobStatus::Failure
    }

    async fn ensure_finished(&self) -> Result<(), JobError> {
        let status = self.status().await;
        if status.is_terminal() {
            Ok(())
        } else {
            Err(JobError::IllegalState(format!(
                "job {} is not finished (status {status})",
                self.id
            )))
        }
    }

    async fn timestamp(&self, field: &str) -> Result<Option<DateTime<Utc>>, JobError> {
        Ok(self.get(field).await?.as_deref().and_then(parse_timestamp))
    }

    async fn get(&self, field: &str) -> Result<Option<String>, JobError> {
        Ok(self.queue.broker().get_field(&self.key, field).await?)
    }

    async fn put(&self, field: &str, value: &str) -> Result<(), JobError> {
        Ok(self.queue.broker().put_field(&self.key, field, value).await?)
    }
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|at| at.with_timezone(&Utc))
}

fn join_error_message(err: JoinError) -> String {
    if !err.is_panic() {
        return "task was cancelled".to_string();
    }
    let payload = err.into_panic();
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "task panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::TimeZone;
    use rstest::rstest;

    use super::*;
    use crate::app::JobQueueBuilder;
    use crate::impls::MemoryBroker;
    use crate::ports::{Broker, FixedClock};
    use crate::typed::Task;
    use crate::typed::task::fixtures::{Echo, EchoHandler, Explode, ExplodeHandler};

    fn queue_with(broker: Arc<MemoryBroker>) -> JobQueue {
        JobQueueBuilder::new("test")
            .broker(broker)
            .register::<Echo, _>(EchoHandler)
            .unwrap()
            .register::<Explode, _>(ExplodeHandler)
            .unwrap()
            .build()
            .unwrap()
    }

    fn queue() -> JobQueue {
        queue_with(Arc::new(MemoryBroker::new()))
    }

    fn echo(text: &str) -> TaskEnvelope {
        TaskEnvelope::from_task(&Echo { text: text.into() }).unwrap()
    }

    fn explode(message: &str, panic: bool) -> TaskEnvelope {
        TaskEnvelope::from_task(&Explode {
            message: message.into(),
            panic,
        })
        .unwrap()
    }

    fn with_id(id: &str) -> JobOptions {
        JobOptions::new().with_job_id(id)
    }

    #[rstest]
    #[case::min(4)]
    #[case::max(128)]
    fn key_is_prefix_plus_id(#[case] len: usize) {
        let id = "a".repeat(len);
        let job = Job::new(&queue(), echo("x"), with_id(&id)).unwrap();
        assert_eq!(job.id().as_str(), id);
        assert_eq!(job.key(), format!("jq:job:{id}"));
    }

    #[rstest]
    #[case::too_short(3)]
    #[case::too_long(129)]
    fn bad_id_length_is_rejected(#[case] len: usize) {
        let err = Job::new(&queue(), echo("x"), with_id(&"a".repeat(len))).unwrap_err();
        assert!(matches!(err, JobError::InvalidArgument(_)));

        let err = Job::lookup(&queue(), &"a".repeat(len)).unwrap_err();
        assert!(matches!(err, JobError::InvalidArgument(_)));
    }

    #[test]
    fn id_is_generated_when_not_given() {
        let q = queue();
        let a = Job::new(&q, echo("x"), JobOptions::new()).unwrap();
        let b = Job::new(&q, echo("x"), JobOptions::new()).unwrap();
        assert_ne!(a.id(), b.id());
        assert_eq!(a.key(), format!("jq:job:{}", a.id()));
        assert_eq!(a.origin(), "test");
    }

    #[tokio::test]
    async fn construction_does_not_touch_the_broker() {
        let broker = Arc::new(MemoryBroker::new());
        let job = Job::new(&queue_with(broker.clone()), echo("x"), with_id("job-0001")).unwrap();
        assert!(broker.is_empty());
        assert_eq!(job.status().await, JobStatus::Unknown);
        assert_eq!(job.enqueued_at().await.unwrap(), None);
    }

    #[tokio::test]
    async fn init_writes_options_task_and_queued_status() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let broker = Arc::new(MemoryBroker::new());
        let q = JobQueueBuilder::new("test")
            .broker(broker.clone())
            .clock(Arc::new(FixedClock::new(at)))
            .build()
            .unwrap();
        let options = with_id("job-0001")
            .with_description("demo")
            .with_job_timeout(Duration::from_secs(30))
            .with_ttl(Duration::from_secs(3600));
        let job = Job::new(&q, echo("x"), options).unwrap();

        job.init_new_job().await.unwrap();

        assert_eq!(job.status().await, JobStatus::Queued);
        assert_eq!(job.enqueued_at().await.unwrap(), Some(at));

        let fields = broker.get_all_fields("jq:job:job-0001").await.unwrap();
        assert_eq!(fields["description"], "demo");
        assert_eq!(fields["timeout"], "30");
        assert_eq!(fields["ttl"], "3600");
        assert_eq!(fields["result_ttl"], "500");
        assert_eq!(fields["fail_ttl"], "31536000");
        assert_eq!(fields["status"], "QUEUED");
        assert_eq!(fields["queued_at"], "2024-01-01T12:00:00.000000Z");
        assert!(fields.contains_key("task"));
        assert!(!fields.contains_key("result"));
    }

    #[tokio::test]
    async fn init_requires_a_task() {
        let job = Job::lookup(&queue(), "job-0001").unwrap();
        let err = job.init_new_job().await.unwrap_err();
        assert!(matches!(err, JobError::IllegalState(_)));
    }

    #[tokio::test]
    async fn fields_without_status_read_as_unknown() {
        // A reader racing init_new_job can see the batch before the status.
        let broker = Arc::new(MemoryBroker::new());
        let q = queue_with(broker.clone());
        let mut fields = FieldMap::new();
        fields.insert("description".into(), "half written".into());
        broker.put_all_fields("jq:job:job-0001", fields).await.unwrap();

        let job = Job::lookup(&q, "job-0001").unwrap();
        assert_eq!(job.status().await, JobStatus::Unknown);
        assert!(!Job::exists(&q, "job-0001").await.unwrap());
    }

    #[tokio::test]
    async fn status_without_timestamp_is_still_the_status() {
        let broker = Arc::new(MemoryBroker::new());
        let q = queue_with(broker.clone());
        broker
            .put_field("jq:job:job-0001", "status", "STARTED")
            .await
            .unwrap();

        let job = Job::lookup(&q, "job-0001").unwrap();
        assert_eq!(job.status().await, JobStatus::Started);
        assert_eq!(job.started_at().await.unwrap(), None);
    }

    #[tokio::test]
    async fn garbage_status_reads_as_unknown() {
        let broker = Arc::new(MemoryBroker::new());
        let q = queue_with(broker.clone());
        broker
            .put_field("jq:job:job-0001", "status", "RUNNING")
            .await
            .unwrap();
        let job = Job::lookup(&q, "job-0001").unwrap();
        assert_eq!(job.status().await, JobStatus::Unknown);
        assert!(!Job::exists(&q, "job-0001").await.unwrap());
    }

    #[tokio::test]
    async fn unreadable_timestamp_is_absent() {
        let broker = Arc::new(MemoryBroker::new());
        let q = queue_with(broker.clone());
        broker
            .put_field("jq:job:job-0001", "finished_at", "yesterday")
            .await
            .unwrap();
        let job = Job::lookup(&q, "job-0001").unwrap();
        assert_eq!(job.finished_at().await.unwrap(), None);
    }

    #[tokio::test]
    async fn started_then_success_stamps_both_in_order() {
        let job = Job::new(&queue(), echo("x"), with_id("job-0001")).unwrap();
        job.set_status(JobStatus::Started).await.unwrap();
        job.set_status(JobStatus::Success).await.unwrap();

        let started = job.started_at().await.unwrap().unwrap();
        let finished = job.finished_at().await.unwrap().unwrap();
        assert!(started <= finished);
        assert_eq!(job.status().await, JobStatus::Success);
    }

    #[tokio::test]
    async fn unknown_is_never_written() {
        let broker = Arc::new(MemoryBroker::new());
        let job = Job::new(&queue_with(broker.clone()), echo("x"), with_id("job-0001")).unwrap();
        let err = job.set_status(JobStatus::Unknown).await.unwrap_err();
        assert!(matches!(err, JobError::InvalidArgument(_)));
        assert!(broker.is_empty());
    }

    #[tokio::test]
    async fn perform_success_persists_result() {
        let job = Job::new(&queue(), echo("hello"), with_id("job-0001")).unwrap();
        job.init_new_job().await.unwrap();
        job.set_status(JobStatus::Started).await.unwrap();

        let value = job.perform().await.unwrap();

        assert_eq!(value, Some(serde_json::json!("hello")));
        assert_eq!(job.status().await, JobStatus::Success);
        assert!(job.is_success().await);
        assert!(job.is_done().await);
        assert_eq!(job.result::<String>().await.unwrap(), Some("hello".into()));
        assert!(job.finished_at().await.unwrap().is_some());
    }

    #[rstest]
    #[case::returned_error(false)]
    #[case::panic(true)]
    #[tokio::test]
    async fn perform_failure_persists_message(#[case] panic: bool) {
        let job = Job::new(&queue(), explode("disk on fire", panic), with_id("job-0001")).unwrap();
        job.init_new_job().await.unwrap();

        let value = job.perform().await.unwrap();

        assert_eq!(value, None);
        assert_eq!(job.status().await, JobStatus::Failure);
        assert!(job.is_failure().await);
        let err = job.error().await.unwrap();
        assert_eq!(err.message(), "disk on fire");
        assert_eq!(job.result::<()>().await.unwrap(), None);
    }

    #[tokio::test]
    async fn fail_records_the_message_without_running() {
        let job = Job::new(&queue(), echo("never run"), with_id("job-0001")).unwrap();
        job.init_new_job().await.unwrap();

        job.fail("gave up").await.unwrap();

        assert!(job.is_failure().await);
        assert_eq!(job.error().await.unwrap().message(), "gave up");
        assert_eq!(job.result::<String>().await.unwrap(), None);
        assert!(job.finished_at().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn perform_without_handler_fails_the_job() {
        let q = JobQueueBuilder::new("bare").build().unwrap();
        let job = Job::new(&q, echo("x"), with_id("job-0001")).unwrap();

        assert_eq!(job.perform().await.unwrap(), None);
        assert_eq!(job.status().await, JobStatus::Failure);
        let err = job.error().await.unwrap();
        assert!(err.message().contains("handler not found"));
        assert!(err.message().contains(Echo::TYPE));
    }

    #[tokio::test]
    async fn perform_requires_a_task() {
        let job = Job::lookup(&queue(), "job-0001").unwrap();
        let err = job.perform().await.unwrap_err();
        assert!(matches!(err, JobError::IllegalState(_)));
    }

    #[rstest]
    #[case::queued(JobStatus::Queued)]
    #[case::started(JobStatus::Started)]
    #[tokio::test]
    async fn result_and_error_need_a_finished_job(#[case] status: JobStatus) {
        let job = Job::new(&queue(), echo("x"), with_id("job-0001")).unwrap();
        job.set_status(status).await.unwrap();

        assert!(matches!(
            job.result::<String>().await,
            Err(JobError::IllegalState(_))
        ));
        assert!(matches!(job.error().await, Err(JobError::IllegalState(_))));
    }

    #[tokio::test]
    async fn zero_timeout_checks_once() {
        let job = Job::new(&queue(), echo("x"), with_id("job-0001")).unwrap();
        let start = std::time::Instant::now();
        let err = job.wait_for_result::<String>(Duration::ZERO).await.unwrap_err();
        assert!(matches!(err, JobError::Timeout(d) if d.is_zero()));
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[tokio::test]
    async fn zero_timeout_returns_a_present_result() {
        let job = Job::new(&queue(), echo("ready"), with_id("job-0001")).unwrap();
        job.perform().await.unwrap();
        let value: String = job.wait_for_result(Duration::ZERO).await.unwrap();
        assert_eq!(value, "ready");
    }

    #[tokio::test]
    async fn wait_times_out_within_one_poll_of_the_deadline() {
        let job = Job::new(&queue(), echo("x"), with_id("job-0001")).unwrap();
        let timeout = Duration::from_millis(30);
        // timer resolution and scheduling on a loaded test machine
        let slack = Duration::from_millis(20);
        let start = std::time::Instant::now();

        let err = job.wait_for_result::<String>(timeout).await.unwrap_err();
        let elapsed = start.elapsed();

        assert!(matches!(err, JobError::Timeout(t) if t == timeout));
        assert!(elapsed >= timeout, "gave up early after {elapsed:?}");
        assert!(
            elapsed < timeout + RESULT_POLL_INTERVAL + slack,
            "overshot the deadline: {elapsed:?}"
        );
    }

    #[tokio::test]
    async fn wait_sees_a_result_written_by_another_actor() {
        let q = queue();
        let producer = Job::new(&q, echo("from worker"), with_id("job-0001")).unwrap();
        producer.init_new_job().await.unwrap();

        let worker_queue = q.clone();
        let worker = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            let job = Job::fetch(&worker_queue, "job-0001").await.unwrap();
            job.set_status(JobStatus::Started).await.unwrap();
            job.perform().await.unwrap();
        });

        let value: String = producer
            .wait_for_result(Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(value, "from worker");
        worker.await.unwrap();
    }

    #[tokio::test]
    async fn restore_rebuilds_options_and_task() {
        let q = queue();
        let options = with_id("job-0001")
            .with_description("demo")
            .with_job_timeout(Duration::from_secs(30))
            .with_ttl(Duration::from_secs(3600))
            .with_result_ttl(Duration::from_secs(60))
            .with_failure_ttl(Duration::from_secs(120));
        Job::new(&q, echo("payload"), options.clone())
            .unwrap()
            .init_new_job()
            .await
            .unwrap();

        let job = Job::fetch(&q, "job-0001").await.unwrap();

        assert_eq!(job.options(), &options);
        assert_eq!(job.task(), Some(&echo("payload")));
    }

    #[tokio::test]
    async fn restore_stops_quietly_at_a_bad_number() {
        let broker = Arc::new(MemoryBroker::new());
        let q = queue_with(broker.clone());
        let mut fields = FieldMap::new();
        fields.insert("description".into(), "demo".into());
        fields.insert("timeout".into(), "30".into());
        fields.insert("ttl".into(), "forever".into());
        fields.insert("result_ttl".into(), "60".into());
        fields.insert("fail_ttl".into(), "120".into());
        fields.insert(
            "task".into(),
            encode_typed(q.codec(), &echo("x")).unwrap(),
        );
        broker.put_all_fields("jq:job:job-0001", fields).await.unwrap();

        let job = Job::fetch(&q, "job-0001").await.unwrap();

        let defaults = JobOptions::default();
        assert_eq!(job.options().description, "demo");
        assert_eq!(job.options().job_timeout, Duration::from_secs(30));
        assert_eq!(job.options().ttl, defaults.ttl);
        assert_eq!(job.options().result_ttl, defaults.result_ttl);
        assert_eq!(job.task(), None);
    }

    #[tokio::test]
    async fn restore_of_a_missing_job_leaves_defaults() {
        let job = Job::fetch(&queue(), "no-such-id").await.unwrap();
        assert_eq!(job.options().job_timeout, JobOptions::default().job_timeout);
        assert_eq!(job.task(), None);
    }

    #[tokio::test]
    async fn restore_surfaces_a_corrupt_task() {
        let broker = Arc::new(MemoryBroker::new());
        let q = queue_with(broker.clone());
        let mut fields = FieldMap::new();
        for field in ["timeout", "ttl", "result_ttl", "fail_ttl"] {
            fields.insert(field.into(), "1".into());
        }
        fields.insert("task".into(), "%%%".into());
        broker.put_all_fields("jq:job:job-0001", fields).await.unwrap();

        let err = Job::fetch(&q, "job-0001").await.unwrap_err();
        assert!(matches!(err, JobError::Codec(_)));
    }

    #[tokio::test]
    async fn worker_id_round_trips() {
        let job = Job::new(&queue(), echo("x"), with_id("job-0001")).unwrap();
        assert_eq!(job.worker_id().await.unwrap(), None);
        job.set_worker_id("test-worker-0").await.unwrap();
        assert_eq!(job.worker_id().await.unwrap().as_deref(), Some("test-worker-0"));
    }

    #[tokio::test]
    async fn delete_leaves_only_a_deleted_marker() {
        let broker = Arc::new(MemoryBroker::new());
        let q = queue_with(broker.clone());
        let job = Job::new(&q, echo("x"), with_id("job-0001")).unwrap();
        job.init_new_job().await.unwrap();
        job.perform().await.unwrap();

        job.delete().await.unwrap();

        let fields = broker.get_all_fields("jq:job:job-0001").await.unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields["status"], "DELETED");
        assert_eq!(job.status().await, JobStatus::Deleted);
        assert!(Job::exists(&q, "job-0001").await.unwrap());
        assert!(!Job::is_alive(&q, "job-0001").await.unwrap());
    }

    #[tokio::test]
    async fn existence_checks() {
        let q = queue();
        assert!(!Job::exists(&q, "no-such-id").await.unwrap());
        assert!(!Job::is_alive(&q, "no-such-id").await.unwrap());
        // Existence checks do not validate the id.
        assert!(!Job::exists(&q, "x").await.unwrap());

        let job = Job::new(&q, echo("x"), with_id("job-0001")).unwrap();
        job.init_new_job().await.unwrap();
        assert!(Job::exists(&q, "job-0001").await.unwrap());
        assert!(Job::is_alive(&q, "job-0001").await.unwrap());
    }

    #[tokio::test]
    async fn cancel_is_unsupported() {
        let job = Job::new(&queue(), echo("x"), with_id("job-0001")).unwrap();
        let err = job.cancel().await.unwrap_err();
        assert!(matches!(err, JobError::Unsupported("cancel")));
        assert!(!job.is_cancelled().await);
    }

    #[test]
    fn timestamps_use_rfc3339_utc() {
        let at = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
        let text = format_timestamp(at);
        assert_eq!(text, "2024-05-06T07:08:09.000000Z");
        assert_eq!(parse_timestamp(&text), Some(at));
        assert_eq!(parse_timestamp("2024-05-06T09:08:09+02:00"), Some(at));
    }
}
