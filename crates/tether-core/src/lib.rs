//! tether-core
//!
//! Client-side job records for a broker-backed task queue.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, keys, status, options, task, errors）
//! - **ports**: 抽象化レイヤー（Broker, PayloadCodec, DeliveryQueue, Clock, IdGenerator）
//! - **impls**: 実装（MemoryBroker, Base64JsonCodec, InMemoryDeliveryQueue, RedisBroker）
//! - **typed**: 型付き Task API（Task trait, Handler trait, TypedRegistry）
//! - **app**: Job, JobQueue, WorkerGroup
//! - **observability**: tracing の初期化

pub mod app;
pub mod domain;
pub mod impls;
pub mod observability;
pub mod ports;
pub mod typed;

pub use app::{Job, JobQueue, JobQueueBuilder, WorkerGroup};
pub use domain::{JobError, JobId, JobOptions, JobStatus, RemoteExecutionError, TaskEnvelope};
pub use typed::{BoxError, Handler, Task};
