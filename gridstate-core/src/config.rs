//! Configuration types
//!
//! All fields are required unless explicitly marked optional. No defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Which key-value backend holds saved views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// Process-local map; contents vanish on exit.
    Memory,
    /// LMDB environment on disk.
    Lmdb,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Directory of the LMDB environment. Required for `lmdb`.
    pub path: Option<PathBuf>,
    pub max_size_mb: usize,
    /// Namespace prefix of every persisted key.
    pub key_prefix: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UrlConfig {
    /// Query parameter carrying the view token.
    pub token_param: String,
    pub max_token_len: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    pub json: bool,
}

/// Master configuration struct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GridStateConfig {
    pub store: StoreConfig,
    pub url: UrlConfig,
    pub log: LogConfig,
}

impl GridStateConfig {
    /// Configuration for an ephemeral in-memory store.
    pub fn in_memory() -> Self {
        Self {
            store: StoreConfig {
                backend: StoreBackend::Memory,
                path: None,
                max_size_mb: 1,
                key_prefix: "gridstate".to_string(),
            },
            url: UrlConfig {
                token_param: "view".to_string(),
                max_token_len: crate::token::MAX_TOKEN_LEN,
            },
            log: LogConfig { json: false },
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            reason: format!("{}: {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: GridStateConfig = toml::from_str(contents).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let prefix = &self.store.key_prefix;
        if prefix.trim().is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "store.key_prefix".to_string(),
            });
        }
        if prefix.contains(':') {
            return Err(ConfigError::invalid(
                "store.key_prefix",
                prefix,
                "must not contain ':'",
            ));
        }
        if self.store.backend == StoreBackend::Lmdb {
            match &self.store.path {
                Some(path) if !path.as_os_str().is_empty() => {}
                _ => {
                    return Err(ConfigError::MissingRequired {
                        field: "store.path".to_string(),
                    })
                }
            }
        }
        if self.store.max_size_mb == 0 {
            return Err(ConfigError::invalid(
                "store.max_size_mb",
                self.store.max_size_mb,
                "must be > 0",
            ));
        }
        if self.url.token_param.trim().is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "url.token_param".to_string(),
            });
        }
        if self.url.max_token_len == 0 {
            return Err(ConfigError::invalid(
                "url.max_token_len",
                self.url.max_token_len,
                "must be > 0",
            ));
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[store]
backend = "lmdb"
path = "/var/lib/gridstate"
max_size_mb = 64
key_prefix = "gridstate"

[url]
token_param = "view"
max_token_len = 16384

[log]
json = true
"#;

    #[test]
    fn test_parse_sample() {
        let config = GridStateConfig::from_toml_str(SAMPLE).expect("sample should parse");
        assert_eq!(config.store.backend, StoreBackend::Lmdb);
        assert_eq!(config.store.path, Some(PathBuf::from("/var/lib/gridstate")));
        assert_eq!(config.url.token_param, "view");
        assert!(config.log.json);
    }

    #[test]
    fn test_in_memory_is_valid() {
        assert!(GridStateConfig::in_memory().validate().is_ok());
    }

    #[test]
    fn test_lmdb_requires_path() {
        let mut config = GridStateConfig::in_memory();
        config.store.backend = StoreBackend::Lmdb;
        assert_eq!(
            config.validate(),
            Err(ConfigError::MissingRequired {
                field: "store.path".to_string()
            })
        );
    }

    #[test]
    fn test_prefix_rejects_separator() {
        let mut config = GridStateConfig::in_memory();
        config.store.key_prefix = "a:b".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let doc = SAMPLE.replace("json = true", "json = true\ncolour = \"red\"");
        assert!(matches!(
            GridStateConfig::from_toml_str(&doc),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_missing_section_rejected() {
        let doc = SAMPLE.replace("[log]\njson = true\n", "");
        assert!(GridStateConfig::from_toml_str(&doc).is_err());
    }
}
