//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **MemoryBroker**: 開発・テスト用の broker
//! - **RedisBroker**: Redis hash ベースの broker（`redis` feature）
//! - **Base64JsonCodec**: デフォルトの PayloadCodec
//! - **InMemoryDeliveryQueue**: 開発用の配送キュー

pub mod base64_codec;
pub mod inmem_delivery;
pub mod memory_broker;
#[cfg(feature = "redis")]
pub mod redis_broker;

pub use self::base64_codec::Base64JsonCodec;
pub use self::inmem_delivery::InMemoryDeliveryQueue;
pub use self::memory_broker::MemoryBroker;
#[cfg(feature = "redis")]
pub use self::redis_broker::RedisBroker;
