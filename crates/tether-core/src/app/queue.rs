//! JobQueue - broker / codec / handler を束ねたハンドル
//!
//! The queue is what a `Job` needs from its surroundings: the broker it is
//! projected onto, the codec for its payloads, the handlers that can run it,
//! and a name reported as the job's origin. Cloning is cheap.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use super::job::Job;
use crate::domain::{JobError, JobOptions, TaskEnvelope};
use crate::ports::{Broker, Clock, CodecError, DeliveryQueue, IdGenerator, PayloadCodec};
use crate::typed::{Task, TypedRegistry};

#[derive(Clone)]
pub struct JobQueue {
    inner: Arc<QueueInner>,
}

pub(super) struct QueueInner {
    pub(super) name: String,
    pub(super) broker: Arc<dyn Broker>,
    pub(super) codec: Arc<dyn PayloadCodec>,
    pub(super) registry: TypedRegistry,
    pub(super) delivery: Arc<dyn DeliveryQueue>,
    pub(super) clock: Arc<dyn Clock>,
    pub(super) id_generator: Arc<dyn IdGenerator>,
}

impl JobQueue {
    pub(super) fn from_inner(inner: QueueInner) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn broker(&self) -> &dyn Broker {
        self.inner.broker.as_ref()
    }

    pub fn codec(&self) -> &dyn PayloadCodec {
        self.inner.codec.as_ref()
    }

    pub fn registry(&self) -> &TypedRegistry {
        &self.inner.registry
    }

    pub fn delivery(&self) -> &dyn DeliveryQueue {
        self.inner.delivery.as_ref()
    }

    pub fn clock(&self) -> &dyn Clock {
        self.inner.clock.as_ref()
    }

    pub fn id_generator(&self) -> &dyn IdGenerator {
        self.inner.id_generator.as_ref()
    }

    /// Persist a new job for `task` and hand its id to the workers.
    pub async fn enqueue<T: Task>(&self, task: &T, options: JobOptions) -> Result<Job, JobError> {
        let envelope =
            TaskEnvelope::from_task(task).map_err(|e| CodecError::Encode(e.to_string()))?;
        self.enqueue_envelope(envelope, options).await
    }

    /// Same as [`enqueue`](Self::enqueue) for an already-erased task.
    pub async fn enqueue_envelope(
        &self,
        envelope: TaskEnvelope,
        options: JobOptions,
    ) -> Result<Job, JobError> {
        let job = Job::new(self, envelope, options)?;
        job.init_new_job().await?;
        self.delivery().push(self.name(), job.id().clone()).await?;
        debug!(queue = %self.name(), job_id = %job.id(), "job enqueued");
        Ok(job)
    }

    /// Rebuild a job from the broker by id.
    pub async fn fetch_job(&self, job_id: &str) -> Result<Job, JobError> {
        Job::fetch(self, job_id).await
    }

    pub async fn exists(&self, job_id: &str) -> Result<bool, JobError> {
        Job::exists(self, job_id).await
    }

    pub async fn is_alive(&self, job_id: &str) -> Result<bool, JobError> {
        Job::is_alive(self, job_id).await
    }
}

impl fmt::Debug for JobQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobQueue")
            .field("name", &self.inner.name)
            .field("tasks", &self.inner.registry.task_types())
            .finish_non_exhaustive()
    }
}
