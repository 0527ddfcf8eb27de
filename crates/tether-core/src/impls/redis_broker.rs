//! RedisBroker - Redis hash で実装した broker（`redis` feature）
//!
//! One Redis hash per job key. `HSET` with several pairs is atomic in Redis,
//! but callers must not rely on that: the port promises per-field atomicity
//! only.

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;

use crate::ports::{Broker, BrokerError, FieldMap};

#[derive(Clone)]
pub struct RedisBroker {
    conn: MultiplexedConnection,
}

impl RedisBroker {
    /// Connect to `redis_url` (e.g. `redis://127.0.0.1:6379/0`).
    pub async fn connect(redis_url: impl AsRef<str>) -> Result<Self, BrokerError> {
        let client = redis::Client::open(redis_url.as_ref())
            .map_err(|e| BrokerError::Connection(e.to_string()))?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| BrokerError::Connection(e.to_string()))?;
        Ok(Self { conn })
    }
}

fn op_failed(e: redis::RedisError) -> BrokerError {
    BrokerError::OperationFailed(e.to_string())
}

#[async_trait]
impl Broker for RedisBroker {
    async fn get_field(&self, key: &str, field: &str) -> Result<Option<String>, BrokerError> {
        let mut conn = self.conn.clone();
        conn.hget(key, field).await.map_err(op_failed)
    }

    async fn put_field(&self, key: &str, field: &str, value: &str) -> Result<(), BrokerError> {
        let mut conn = self.conn.clone();
        let _: i64 = conn.hset(key, field, value).await.map_err(op_failed)?;
        Ok(())
    }

    async fn get_all_fields(&self, key: &str) -> Result<FieldMap, BrokerError> {
        let mut conn = self.conn.clone();
        conn.hgetall(key).await.map_err(op_failed)
    }

    async fn put_all_fields(&self, key: &str, fields: FieldMap) -> Result<(), BrokerError> {
        if fields.is_empty() {
            return Ok(());
        }
        let pairs: Vec<(String, String)> = fields.into_iter().collect();
        let mut conn = self.conn.clone();
        let _: () = conn.hset_multiple(key, &pairs).await.map_err(op_failed)?;
        Ok(())
    }

    async fn remove_map(&self, key: &str) -> Result<(), BrokerError> {
        let mut conn = self.conn.clone();
        let _: i64 = conn.del(key).await.map_err(op_failed)?;
        Ok(())
    }
}
