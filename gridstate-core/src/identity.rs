//! Identity types for saved views and scopes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Identifier of a saved view.
///
/// Uses UUIDv7, so ids sort by creation time and are unique across scopes
/// without coordination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewId(Uuid);

impl ViewId {
    /// Generate a new timestamp-sortable id.
    pub fn now_v7() -> Self {
        Self(Uuid::now_v7())
    }

    /// Wrap an existing UUID.
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ViewId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// Opaque partition key isolating saved views and the default pointer.
///
/// Two distinct keys never observe each other's data. The key is compared
/// byte-for-byte; no case folding or trimming is applied after construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScopeKey(String);

impl ScopeKey {
    /// Create a scope key. Returns `None` for an empty or all-whitespace key.
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into();
        if key.trim().is_empty() {
            None
        } else {
            Some(Self(key))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ScopeKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_key_rejects_blank() {
        assert!(ScopeKey::new("").is_none());
        assert!(ScopeKey::new("   ").is_none());
        assert_eq!(
            ScopeKey::new("orders:open").map(|s| s.to_string()),
            Some("orders:open".to_string())
        );
    }

    #[test]
    fn test_view_ids_are_unique_and_parse_back() {
        let a = ViewId::now_v7();
        let b = ViewId::now_v7();
        assert_ne!(a, b);

        let parsed: ViewId = a.to_string().parse().expect("id should parse");
        assert_eq!(parsed, a);
        assert!("not-a-uuid".parse::<ViewId>().is_err());
    }

    #[test]
    fn test_view_id_serializes_as_plain_string() {
        let id = ViewId::now_v7();
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, format!("\"{}\"", id));
    }
}
