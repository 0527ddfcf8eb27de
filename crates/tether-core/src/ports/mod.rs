//! Ports - 抽象化レイヤー
//!
//! 各 trait は外部システム（broker, codec, 配送キュー, 時刻, ID 生成）への
//! インターフェースを提供し、実装の詳細を隠蔽します。

pub mod broker;
pub mod clock;
pub mod codec;
pub mod delivery_queue;
pub mod id_generator;

pub use self::broker::{Broker, BrokerError, FieldMap};
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::codec::{CodecError, PayloadCodec, decode_typed, encode_typed};
pub use self::delivery_queue::{DeliveryQueue, QueueError};
pub use self::id_generator::{IdGenerator, UlidGenerator};
