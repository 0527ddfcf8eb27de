//! Broker port - ジョブのフィールドを保持する外部 KV ストア
//!
//! The broker stores one field map per job key. Every operation is atomic on
//! its own; nothing spans two calls. A reader may therefore observe the
//! status of a transition without its timestamp, or the fields written by
//! `init_new_job` before the status that follows them.

use std::collections::HashMap;

use async_trait::async_trait;

/// A job's field map as returned by [`Broker::get_all_fields`].
pub type FieldMap = HashMap<String, String>;

#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    #[error("broker connection failed: {0}")]
    Connection(String),

    #[error("broker operation failed: {0}")]
    OperationFailed(String),
}

/// Map-of-maps store addressed by a namespaced key.
///
/// # 実装
/// - `MemoryBroker`: 開発・テスト用
/// - `RedisBroker`: hash コマンドで実装（`redis` feature）
#[async_trait]
pub trait Broker: Send + Sync {
    /// `None` when either the key or the field is missing.
    async fn get_field(&self, key: &str, field: &str) -> Result<Option<String>, BrokerError>;

    async fn put_field(&self, key: &str, field: &str, value: &str) -> Result<(), BrokerError>;

    /// Empty map when the key is missing.
    async fn get_all_fields(&self, key: &str) -> Result<FieldMap, BrokerError>;

    /// Batched write. Not atomic across fields.
    async fn put_all_fields(&self, key: &str, fields: FieldMap) -> Result<(), BrokerError>;

    /// Delete every field under `key`.
    async fn remove_map(&self, key: &str) -> Result<(), BrokerError>;
}
