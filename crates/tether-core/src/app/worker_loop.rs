//! WorkerGroup - キューからジョブを取り出して実行するワーカー群
//!
//! Each worker pops a job id from the delivery queue, restores the job from
//! the broker, marks it STARTED and performs it. Outcomes are persisted by
//! [`Job::perform`]; the loop itself only logs.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::job::Job;
use super::queue::JobQueue;
use crate::domain::{JobError, JobId, JobStatus};

/// How long a single `pop` waits before the loop re-checks for shutdown.
const POP_TIMEOUT: Duration = Duration::from_millis(100);

/// Error recorded for a job whose task descriptor could not be read back.
pub const UNRESTORABLE_TASK: &str = "task could not be restored from the broker";

/// Worker group handle.
/// - `request_shutdown()` で新しいジョブの取得を止める
/// - `shutdown_and_join()` で全ワーカーの終了を待つ
pub struct WorkerGroup {
    shutdown_tx: watch::Sender<bool>,
    joins: Vec<JoinHandle<()>>,
}

impl WorkerGroup {
    /// Spawn `n` workers on `queue`.
    pub fn spawn(n: usize, queue: JobQueue) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let joins = (0..n)
            .map(|n| {
                let queue = queue.clone();
                let rx = shutdown_rx.clone();
                tokio::spawn(worker_loop(n, queue, rx))
            })
            .collect();

        info!(queue = %queue.name(), workers = n, "worker group started");
        Self { shutdown_tx, joins }
    }

    pub fn len(&self) -> usize {
        self.joins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joins.is_empty()
    }

    /// Stop taking new jobs. A job already running is finished first.
    pub fn request_shutdown(&self) {
        // receivers may already be gone
        let _ = self.shutdown_tx.send(true);
    }

    pub async fn shutdown_and_join(self) {
        self.request_shutdown();
        for join in self.joins {
            if let Err(e) = join.await {
                error!(error = %e, "worker task ended abnormally");
            }
        }
    }
}

async fn worker_loop(n: usize, queue: JobQueue, shutdown_rx: watch::Receiver<bool>) {
    let worker_id = format!("{}-worker-{n}", queue.name());
    debug!(%worker_id, "worker loop started");

    // The pop runs on a blocking thread and cannot be cancelled, so it is
    // never raced against shutdown: an id it returns is always handled.
    // POP_TIMEOUT bounds how long a shutdown request waits.
    while !shutdown_requested(&shutdown_rx) {
        let job_id = match queue.delivery().pop(queue.name(), POP_TIMEOUT).await {
            Ok(Some(job_id)) => job_id,
            Ok(None) => continue,
            Err(e) => {
                error!(%worker_id, error = %e, "delivery pop failed");
                tokio::time::sleep(POP_TIMEOUT).await;
                continue;
            }
        };

        if let Err(e) = run_one(&queue, &worker_id, &job_id).await {
            error!(%worker_id, %job_id, error = %e, "job could not be run");
        }
    }

    debug!(%worker_id, "worker loop stopped");
}

/// Also true once the group is dropped without a shutdown.
fn shutdown_requested(rx: &watch::Receiver<bool>) -> bool {
    *rx.borrow() || rx.has_changed().is_err()
}

async fn run_one(queue: &JobQueue, worker_id: &str, job_id: &JobId) -> Result<(), JobError> {
    let job = Job::fetch(queue, job_id.as_str()).await?;
    if job.status().await == JobStatus::Deleted {
        debug!(%worker_id, %job_id, "skipping deleted job");
        return Ok(());
    }

    job.set_worker_id(worker_id).await?;

    // Restore is best effort and may stop before the task. The id has left the
    // delivery queue, so fail the job here rather than leave it unfinished.
    if job.task().is_none() {
        warn!(%worker_id, %job_id, "task could not be restored");
        return job.fail(UNRESTORABLE_TASK).await;
    }

    job.set_status(JobStatus::Started).await?;
    info!(%worker_id, %job_id, "job started");

    match job.perform().await? {
        Some(_) => info!(%worker_id, %job_id, "job succeeded"),
        None => info!(%worker_id, %job_id, "job failed"),
    }
    Ok(())
}
