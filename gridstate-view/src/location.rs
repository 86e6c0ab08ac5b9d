//! The hosting page URL and its view token parameter.

use url::Url;

use crate::error::{ViewError, ViewResult};

/// Query parameter name used for the view token unless configured otherwise.
pub const DEFAULT_TOKEN_PARAM: &str = "view";

/// Current page URL plus the name of the parameter that carries the token.
///
/// Rewriting a parameter keeps every other parameter and its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewLocation {
    url: Url,
    token_param: String,
}

impl ViewLocation {
    pub fn new(url: Url, token_param: impl Into<String>) -> Self {
        Self {
            url,
            token_param: token_param.into(),
        }
    }

    /// Parse an absolute URL.
    pub fn parse(url: &str, token_param: impl Into<String>) -> ViewResult<Self> {
        let parsed = Url::parse(url).map_err(|e| ViewError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self::new(parsed, token_param))
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn token_param(&self) -> &str {
        &self.token_param
    }

    /// Raw token value, if the parameter is present and non-empty.
    pub fn token(&self) -> Option<String> {
        self.param(&self.token_param)
    }

    /// First non-empty value of a query parameter.
    pub fn param(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(key, value)| key == name && !value.is_empty())
            .map(|(_, value)| value.into_owned())
    }

    /// Replace (or with `None`, remove) every occurrence of a parameter.
    ///
    /// The new value takes the position of the first old occurrence, or goes
    /// last if the parameter was absent.
    pub fn set_param(&mut self, name: &str, value: Option<&str>) {
        let mut pairs: Vec<(String, String)> = Vec::new();
        let mut slot = None;
        for (key, existing) in self.url.query_pairs() {
            if key == name {
                slot.get_or_insert(pairs.len());
            } else {
                pairs.push((key.into_owned(), existing.into_owned()));
            }
        }

        if let Some(value) = value {
            let index = slot.unwrap_or(pairs.len());
            pairs.insert(index, (name.to_string(), value.to_string()));
        }

        if pairs.is_empty() {
            self.url.set_query(None);
        } else {
            self.url.query_pairs_mut().clear().extend_pairs(pairs);
        }
    }

    /// Replace the token; an empty token removes the parameter.
    pub fn set_token(&mut self, token: &str) {
        let param = self.token_param.clone();
        let value = if token.is_empty() { None } else { Some(token) };
        self.set_param(&param, value);
    }

    /// Path plus query, without origin or fragment.
    pub fn to_relative(&self) -> String {
        match self.url.query() {
            Some(query) => format!("{}?{}", self.url.path(), query),
            None => self.url.path().to_string(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn location(url: &str) -> ViewLocation {
        ViewLocation::parse(url, DEFAULT_TOKEN_PARAM).expect("valid url")
    }

    #[test]
    fn test_token_absent_or_empty() {
        assert_eq!(location("https://app.test/orders").token(), None);
        assert_eq!(location("https://app.test/orders?view=").token(), None);
        assert_eq!(
            location("https://app.test/orders?tab=2&view=abc").token(),
            Some("abc".to_string())
        );
    }

    #[test]
    fn test_set_token_keeps_other_params_in_place() {
        let mut loc = location("https://app.test/orders?tab=2&view=old&lang=en");
        loc.set_token("new");
        assert_eq!(loc.to_relative(), "/orders?tab=2&view=new&lang=en");
    }

    #[test]
    fn test_set_token_appends_when_absent() {
        let mut loc = location("https://app.test/orders?tab=2");
        loc.set_token("abc");
        assert_eq!(loc.to_relative(), "/orders?tab=2&view=abc");
    }

    #[test]
    fn test_remove_last_param_drops_query() {
        let mut loc = location("https://app.test/orders?view=abc");
        loc.set_token("");
        assert_eq!(loc.to_relative(), "/orders");
        assert_eq!(loc.url().as_str(), "https://app.test/orders");
    }

    #[test]
    fn test_duplicate_params_collapse() {
        let mut loc = location("https://app.test/o?q=a&x=1&q=b");
        loc.set_param("q", Some("c"));
        assert_eq!(loc.to_relative(), "/o?q=c&x=1");
    }

    #[test]
    fn test_plain_param_round_trip() {
        let mut loc = location("https://app.test/o");
        loc.set_param("q", Some("red shoes"));
        assert_eq!(loc.param("q"), Some("red shoes".to_string()));
    }

    #[test]
    fn test_invalid_url() {
        assert!(matches!(
            ViewLocation::parse("/relative/only", "view"),
            Err(ViewError::InvalidUrl { .. })
        ));
    }
}
