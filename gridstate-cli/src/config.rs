//! Configuration discovery for the CLI.
//!
//! The file path comes from `--config` or `GRIDSTATE_CONFIG`; clap resolves
//! both. Token commands run without a file on an in-memory configuration.

use std::path::Path;

use gridstate_core::GridStateConfig;

use crate::error::CliError;

/// Load and validate the configuration file at `path`.
pub fn load_config(path: Option<&Path>) -> Result<GridStateConfig, CliError> {
    let path = path.ok_or(CliError::MissingConfigPath)?;
    let config = GridStateConfig::from_path(path)?;
    tracing::debug!(path = %path.display(), backend = ?config.store.backend, "Loaded configuration");
    Ok(config)
}

/// Configuration for commands that never touch the store.
pub fn load_or_ephemeral(path: Option<&Path>) -> Result<GridStateConfig, CliError> {
    match path {
        Some(path) => load_config(Some(path)),
        None => Ok(GridStateConfig::in_memory()),
    }
}
