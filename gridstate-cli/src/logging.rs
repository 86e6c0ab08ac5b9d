//! Tracing subscriber setup.
//!
//! Filter directives come from `GRIDSTATE_LOG`, then `RUST_LOG`, then
//! [`DEFAULT_DIRECTIVES`]. Logs go to stderr so command output stays clean.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::CliError;

pub const LOG_ENV: &str = "GRIDSTATE_LOG";
pub const DEFAULT_DIRECTIVES: &str = "gridstate=info";

/// Build the filter from the environment.
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
}

/// Install the global subscriber.
pub fn init_logging(json: bool) -> Result<(), CliError> {
    let registry = tracing_subscriber::registry().with(env_filter());
    let result = if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };
    result.map_err(|e| CliError::Logging(e.to_string()))
}
