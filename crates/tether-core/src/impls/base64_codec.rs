//! Base64JsonCodec - JSON を base64 テキストで運ぶ codec

use base64::prelude::*;

use crate::ports::{CodecError, PayloadCodec};

/// `serde_json` bytes, standard base64 alphabet with padding.
#[derive(Debug, Clone, Copy, Default)]
pub struct Base64JsonCodec;

impl Base64JsonCodec {
    pub fn new() -> Self {
        Self
    }
}

impl PayloadCodec for Base64JsonCodec {
    fn encode_to_text(&self, value: &serde_json::Value) -> Result<String, CodecError> {
        let bytes = serde_json::to_vec(value).map_err(|e| CodecError::Encode(e.to_string()))?;
        Ok(BASE64_STANDARD.encode(bytes))
    }

    fn decode_from_text(&self, text: &str) -> Result<serde_json::Value, CodecError> {
        let bytes = BASE64_STANDARD
            .decode(text.trim())
            .map_err(|e| CodecError::Decode(format!("invalid base64: {e}")))?;
        serde_json::from_slice(&bytes).map_err(|e| CodecError::Decode(format!("invalid json: {e}")))
    }
}
