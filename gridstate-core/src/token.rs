//! URL token codec.
//!
//! A view token is the JSON form of a snapshot encoded as unpadded base64url,
//! so it can sit in a query string without further escaping. Tokens come from
//! URLs and are untrusted: decoding is total and reports every failure as
//! `None`, leaving correctness to [`sanitize`](crate::sanitize).

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde_json::Value;

use crate::snapshot::{RawSnapshot, ViewSnapshot};

/// Longest token accepted by [`deserialize`].
pub const MAX_TOKEN_LEN: usize = 16 * 1024;

/// Encode a snapshot as a URL-safe token. Returns an empty string if the
/// snapshot cannot be serialized.
pub fn serialize(snapshot: &ViewSnapshot) -> String {
    TokenCodec::default().serialize(snapshot)
}

/// Decode a token back into an unvalidated snapshot.
pub fn deserialize(token: &str) -> Option<RawSnapshot> {
    TokenCodec::default().deserialize(token)
}

/// Token codec with a configurable length limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenCodec {
    max_len: usize,
}

impl Default for TokenCodec {
    fn default() -> Self {
        Self {
            max_len: MAX_TOKEN_LEN,
        }
    }
}

impl TokenCodec {
    pub fn new(max_len: usize) -> Self {
        Self { max_len }
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    pub fn serialize(&self, snapshot: &ViewSnapshot) -> String {
        match serde_json::to_vec(snapshot) {
            Ok(json) => URL_SAFE_NO_PAD.encode(json),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to encode view token");
                String::new()
            }
        }
    }

    pub fn deserialize(&self, token: &str) -> Option<RawSnapshot> {
        let token = token.trim().trim_end_matches('=');
        if token.is_empty() {
            return None;
        }
        if token.len() > self.max_len {
            tracing::warn!(len = token.len(), max = self.max_len, "View token too long");
            return None;
        }

        let bytes = match URL_SAFE_NO_PAD.decode(token) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::debug!(error = %e, "View token is not valid base64url");
                return None;
            }
        };

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(value) => RawSnapshot::from_value(value),
            Err(e) => {
                tracing::debug!(error = %e, "View token is not valid JSON");
                None
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
