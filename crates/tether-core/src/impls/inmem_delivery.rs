//! InMemoryDeliveryQueue - 開発用の配送キュー
//!
//! - Mutex + Condvar による blocking pop
//! - Async での blocking 処理の扱い（spawn_blocking）
//! - namespace による複数キューの管理

use crate::domain::JobId;
use crate::ports::{DeliveryQueue, QueueError};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

/// InMemoryDeliveryQueue は開発用の配送キュー
///
/// # 実装詳細
/// - HashMap<String, VecDeque<JobId>> で namespace ごとにキューを管理
/// - Mutex で排他制御
/// - Condvar で push 時の通知
#[derive(Default)]
pub struct InMemoryDeliveryQueue {
    queues: Arc<Mutex<HashMap<String, VecDeque<JobId>>>>,
    condvar: Arc<Condvar>,
}

impl InMemoryDeliveryQueue {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> QueueError {
    QueueError::OperationFailed("delivery queue lock poisoned".to_string())
}

#[async_trait::async_trait]
impl DeliveryQueue for InMemoryDeliveryQueue {
    async fn push(&self, ns: &str, job_id: JobId) -> Result<(), QueueError> {
        let queues = self.queues.clone();
        let condvar = self.condvar.clone();
        let ns = ns.to_string();

        tokio::task::spawn_blocking(move || {
            let mut queues = queues.lock().map_err(|_| poisoned())?;
            queues.entry(ns).or_default().push_back(job_id);

            // Waiters may be parked on other namespaces.
            condvar.notify_all();
            Ok(())
        })
        .await
        .map_err(|e| QueueError::OperationFailed(format!("Push failed: {}", e)))?
    }

    async fn pop(&self, ns: &str, timeout: Duration) -> Result<Option<JobId>, QueueError> {
        let queues = self.queues.clone();
        let condvar = self.condvar.clone();
        let ns = ns.to_string();
        tokio::task::spawn_blocking(move || {
            let start = std::time::Instant::now();
            let mut guard = queues.lock().map_err(|_| poisoned())?;
            loop {
                if let Some(queue) = guard.get_mut(&ns)
                    && let Some(job_id) = queue.pop_front()
                {
                    return Ok(Some(job_id));
                }
                let elapsed = start.elapsed();
                if elapsed >= timeout {
                    return Ok(None);
                }
                let remaining = timeout.saturating_sub(elapsed);
                let (new_guard, _) = condvar
                    .wait_timeout(guard, remaining)
                    .map_err(|_| poisoned())?;
                guard = new_guard;
            }
        })
        .await
        .map_err(|e| QueueError::OperationFailed(format!("Pop failed: {}", e)))?
    }
}
