//! JobQueueBuilder - キューの構築とワイヤリング
//!
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）

use std::sync::Arc;

use super::queue::{JobQueue, QueueInner};
use crate::impls::{Base64JsonCodec, InMemoryDeliveryQueue, MemoryBroker};
use crate::ports::{Broker, Clock, DeliveryQueue, IdGenerator, PayloadCodec, SystemClock, UlidGenerator};
use crate::typed::{Handler, RegistryError, Task, TypedRegistry};

/// JobQueueBuilder はキューを構築
///
/// # 使用例
/// ```ignore
/// let queue = JobQueueBuilder::new("default")
///     .broker(Arc::new(RedisBroker::connect(url).await?))
///     .register::<Greet, _>(GreetHandler)?
///     .expect_tasks(&["demo.greet.v1"])
///     .build()?;
/// ```
///
/// Anything not set falls back to the in-memory adapters, base64 JSON
/// payloads, the system clock and ULID ids.
///
/// # Fail-fast 設計
/// - expect_tasks() で期待される task_type を登録
/// - build() 時に「期待集合 ⊆ 登録済み集合」をチェック
pub struct JobQueueBuilder {
    name: String,
    registry: TypedRegistry,
    expected_tasks: Option<Vec<String>>,
    broker: Option<Arc<dyn Broker>>,
    codec: Option<Arc<dyn PayloadCodec>>,
    delivery: Option<Arc<dyn DeliveryQueue>>,
    clock: Option<Arc<dyn Clock>>,
    id_generator: Option<Arc<dyn IdGenerator>>,
}

/// BuildError はキュー構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("queue name must not be empty")]
    EmptyName,

    #[error("Missing task types: {0:?}. These tasks were expected but not registered.")]
    MissingTaskTypes(Vec<String>),
}

impl JobQueueBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            registry: TypedRegistry::new(),
            expected_tasks: None,
            broker: None,
            codec: None,
            delivery: None,
            clock: None,
            id_generator: None,
        }
    }

    pub fn broker(mut self, broker: Arc<dyn Broker>) -> Self {
        self.broker = Some(broker);
        self
    }

    pub fn codec(mut self, codec: Arc<dyn PayloadCodec>) -> Self {
        self.codec = Some(codec);
        self
    }

    pub fn delivery(mut self, delivery: Arc<dyn DeliveryQueue>) -> Self {
        self.delivery = Some(delivery);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn id_generator(mut self, id_generator: Arc<dyn IdGenerator>) -> Self {
        self.id_generator = Some(id_generator);
        self
    }

    /// Handler を登録
    pub fn register<T: Task, H: Handler<T> + 'static>(
        mut self,
        handler: H,
    ) -> Result<Self, RegistryError> {
        self.registry.register::<T, H>(handler)?;
        Ok(self)
    }

    /// 期待される task_type のリストを設定
    pub fn expect_tasks(mut self, task_types: &[&str]) -> Self {
        self.expected_tasks = Some(task_types.iter().map(|t| t.to_string()).collect());
        self
    }

    pub fn build(self) -> Result<JobQueue, BuildError> {
        if self.name.trim().is_empty() {
            return Err(BuildError::EmptyName);
        }
        if let Some(expected_tasks) = &self.expected_tasks {
            let missing_tasks = self.registry.missing(expected_tasks);
            if !missing_tasks.is_empty() {
                return Err(BuildError::MissingTaskTypes(missing_tasks));
            }
        }
        let clock: Arc<dyn Clock> = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        Ok(JobQueue::from_inner(QueueInner {
            name: self.name,
            broker: self
                .broker
                .unwrap_or_else(|| Arc::new(MemoryBroker::new())),
            codec: self.codec.unwrap_or_else(|| Arc::new(Base64JsonCodec)),
            registry: self.registry,
            delivery: self
                .delivery
                .unwrap_or_else(|| Arc::new(InMemoryDeliveryQueue::new())),
            id_generator: self
                .id_generator
                .unwrap_or_else(|| Arc::new(UlidGenerator::new(clock.clone()))),
            clock,
        }))
    }
}
