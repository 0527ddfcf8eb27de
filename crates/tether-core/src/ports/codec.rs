//! PayloadCodec port - タスク記述子と結果を文字列フィールドに変換
//!
//! Task descriptors and results are carried as `serde_json::Value` and turned
//! into a single text field by the codec. The same codec handles both.

use serde::Serialize;
use serde::de::DeserializeOwned;

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("encode failed: {0}")]
    Encode(String),

    #[error("decode failed: {0}")]
    Decode(String),
}

pub trait PayloadCodec: Send + Sync {
    fn encode_to_text(&self, value: &serde_json::Value) -> Result<String, CodecError>;

    fn decode_from_text(&self, text: &str) -> Result<serde_json::Value, CodecError>;
}

/// Encode any serializable value through `codec`.
pub fn encode_typed<T: Serialize + ?Sized>(
    codec: &dyn PayloadCodec,
    value: &T,
) -> Result<String, CodecError> {
    let value = serde_json::to_value(value).map_err(|e| CodecError::Encode(e.to_string()))?;
    codec.encode_to_text(&value)
}

/// Decode `text` through `codec` into `T`.
pub fn decode_typed<T: DeserializeOwned>(
    codec: &dyn PayloadCodec,
    text: &str,
) -> Result<T, CodecError> {
    let value = codec.decode_from_text(text)?;
    serde_json::from_value(value).map_err(|e| CodecError::Decode(e.to_string()))
}
