//! gridstate command-line tool: saved-view administration and token
//! inspection.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;

pub use cli::{Cli, Command};
pub use commands::{run, CommandContext};
pub use error::CliError;
