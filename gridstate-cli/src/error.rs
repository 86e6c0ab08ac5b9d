//! Error types for the CLI.

use gridstate_core::{ConfigError, StoreError};
use gridstate_view::ViewError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Missing configuration file path (use --config or GRIDSTATE_CONFIG)")]
    MissingConfigPath,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    View(#[from] ViewError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("No saved view {id} in scope {scope}")]
    ViewNotFound { scope: String, id: String },
    #[error("Invalid argument {arg}: {reason}")]
    InvalidArgument { arg: &'static str, reason: String },
    #[error("Failed to initialize logging: {0}")]
    Logging(String),
}

impl CliError {
    pub(crate) fn invalid(arg: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            arg,
            reason: reason.into(),
        }
    }
}
