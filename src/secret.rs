//! Pluggable decoding of externally encoded credentials
//!
//! Passwords prefixed with [`ENCODED_SECRET_MARKER`] are handed to the
//! configured [`SecretCodec`] with the marker stripped. Without a codec, or
//! when decoding fails, the raw configured value is used unchanged.

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use tracing::warn;

use crate::error::CodecError;

/// Marker prefix for passwords that must go through the secret codec
pub const ENCODED_SECRET_MARKER: &str = "#!";

pub trait SecretCodec: Send + Sync {
    fn decode(&self, encoded: &str) -> Result<String, CodecError>;
}

/// Decodes standard base64 into a UTF-8 secret
#[derive(Debug, Clone, Copy, Default)]
pub struct Base64SecretCodec;

impl SecretCodec for Base64SecretCodec {
    fn decode(&self, encoded: &str) -> Result<String, CodecError> {
        let bytes = BASE64
            .decode(encoded.trim())
            .map_err(|e| CodecError::InvalidEncoding(e.to_string()))?;
        String::from_utf8(bytes).map_err(|_| CodecError::InvalidUtf8)
    }
}

/// Resolve a configured password into the value sent to the broker
pub fn resolve_secret(raw: &str, codec: Option<&dyn SecretCodec>) -> String {
    let Some(encoded) = raw.strip_prefix(ENCODED_SECRET_MARKER) else {
        return raw.to_string();
    };

    let Some(codec) = codec else {
        return raw.to_string();
    };

    match codec.decode(encoded) {
        Ok(decoded) => decoded,
        Err(e) => {
            warn!("failed to decode secret, using it as-is: {e}");
            raw.to_string()
        }
    }
}
