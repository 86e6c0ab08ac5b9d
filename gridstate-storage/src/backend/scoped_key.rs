//! Scope-partitioned storage keys.
//!
//! A [`ScopedKey`] can only be built from a [`ScopeKey`], so every record the
//! local store touches is namespaced by scope. Scope keys are percent-encoded
//! inside the storage key: a scope containing the separator can never alias
//! the records of another scope.

use gridstate_core::ScopeKey;

/// Separator between key segments.
pub const SEPARATOR: char = ':';

/// Prefix used when none is configured.
pub const DEFAULT_KEY_PREFIX: &str = "gridstate";

/// Logical record kind stored per scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// Ordered list of saved views.
    Views,
    /// Default view pointer.
    Default,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Views => "views",
            RecordKind::Default => "default",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "views" => Some(RecordKind::Views),
            "default" => Some(RecordKind::Default),
            _ => None,
        }
    }
}

/// A storage key scoped to one [`ScopeKey`].
///
/// Encodes as `{prefix}:{percent-encoded scope}:{kind}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScopedKey {
    inner: ScopedKeyInner,
}

/// Private inner struct - prevents external construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ScopedKeyInner {
    prefix: String,
    scope: ScopeKey,
    kind: RecordKind,
}

impl ScopedKey {
    pub fn new(prefix: &str, scope: &ScopeKey, kind: RecordKind) -> Self {
        Self {
            inner: ScopedKeyInner {
                prefix: prefix.to_string(),
                scope: scope.clone(),
                kind,
            },
        }
    }

    pub fn prefix(&self) -> &str {
        &self.inner.prefix
    }

    pub fn scope(&self) -> &ScopeKey {
        &self.inner.scope
    }

    pub fn kind(&self) -> RecordKind {
        self.inner.kind
    }

    pub fn encode(&self) -> String {
        format!(
            "{}{}",
            Self::scope_prefix(&self.inner.prefix, &self.inner.scope),
            self.inner.kind.as_str()
        )
    }

    /// Decode a storage key. Returns `None` if the key does not have exactly
    /// three segments, the kind is unknown, or the scope segment is not valid
    /// percent-encoding of a non-blank scope.
    pub fn decode(key: &str) -> Option<Self> {
        let mut parts = key.split(SEPARATOR);
        let prefix = parts.next()?;
        let scope = parts.next()?;
        let kind = RecordKind::parse(parts.next()?)?;
        if parts.next().is_some() || prefix.is_empty() {
            return None;
        }
        let scope = urlencoding::decode(scope).ok()?;
        let scope = ScopeKey::new(scope.into_owned())?;
        Some(Self::new(prefix, &scope, kind))
    }

    /// Prefix shared by every record of one scope.
    pub fn scope_prefix(prefix: &str, scope: &ScopeKey) -> String {
        format!(
            "{}{}{}{}",
            prefix,
            SEPARATOR,
            urlencoding::encode(scope.as_str()),
            SEPARATOR
        )
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn scope(key: &str) -> ScopeKey {
        ScopeKey::new(key).expect("valid scope")
    }

    #[test]
    fn test_encode_layout() {
        let key = ScopedKey::new("gridstate", &scope("orders"), RecordKind::Views);
        assert_eq!(key.encode(), "gridstate:orders:views");
        let key = ScopedKey::new("gridstate", &scope("orders"), RecordKind::Default);
        assert_eq!(key.encode(), "gridstate:orders:default");
    }

    #[test]
    fn test_separator_in_scope_is_escaped() {
        let key = ScopedKey::new("gridstate", &scope("orders:open"), RecordKind::Views);
        assert_eq!(key.encode(), "gridstate:orders%3Aopen:views");
        let decoded = ScopedKey::decode(&key.encode()).expect("decode should succeed");
        assert_eq!(decoded, key);
    }

    #[test]
    fn test_decode_rejects_malformed() {
        assert!(ScopedKey::decode("gridstate:orders").is_none());
        assert!(ScopedKey::decode("gridstate:orders:views:extra").is_none());
        assert!(ScopedKey::decode("gridstate:orders:cache").is_none());
        assert!(ScopedKey::decode(":orders:views").is_none());
        assert!(ScopedKey::decode("gridstate::views").is_none());
    }

    #[test]
    fn test_scope_prefix_does_not_match_sibling_scope() {
        let a = ScopedKey::scope_prefix("gridstate", &scope("orders"));
        let b = ScopedKey::new("gridstate", &scope("orders-archive"), RecordKind::Views);
        assert!(!b.encode().starts_with(&a));
    }
}

#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    fn scope_strategy() -> impl Strategy<Value = ScopeKey> {
        "[a-zA-Z0-9:/ %_-]{1,24}".prop_filter_map("blank scope", ScopeKey::new)
    }

    fn kind_strategy() -> impl Strategy<Value = RecordKind> {
        prop_oneof![Just(RecordKind::Views), Just(RecordKind::Default)]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        /// Encoding then decoding returns the same key.
        #[test]
        fn prop_encode_decode_roundtrip(scope in scope_strategy(), kind in kind_strategy()) {
            let key = ScopedKey::new("gridstate", &scope, kind);
            let decoded = ScopedKey::decode(&key.encode());
            prop_assert_eq!(Some(key), decoded);
        }

        /// Distinct scopes never share an encoded key.
        #[test]
        fn prop_encoding_is_injective(
            a in scope_strategy(),
            b in scope_strategy(),
            kind in kind_strategy(),
        ) {
            let key_a = ScopedKey::new("gridstate", &a, kind).encode();
            let key_b = ScopedKey::new("gridstate", &b, kind).encode();
            prop_assert_eq!(a == b, key_a == key_b);
        }
    }
}
