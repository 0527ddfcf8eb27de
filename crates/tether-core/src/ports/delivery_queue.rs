//! DeliveryQueue port - 配送キュー
//!
//! DeliveryQueue は job id のみを流します（状態や payload は broker 側）。

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::JobId;

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("queue operation failed: {0}")]
    OperationFailed(String),
}

/// DeliveryQueue は job id を配送するためのキュー
///
/// # 設計原則
/// - job id のみを保持
/// - namespace（queue 名）ごとに独立
/// - blocking pop（timeout 付き）
#[async_trait]
pub trait DeliveryQueue: Send + Sync {
    async fn push(&self, ns: &str, job_id: JobId) -> Result<(), QueueError>;

    /// `None` when nothing arrived within `timeout`.
    async fn pop(&self, ns: &str, timeout: Duration) -> Result<Option<JobId>, QueueError>;
}
