//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use gridstate_core::{ScopeKey, ViewId};

#[derive(Debug, Parser)]
#[command(
    name = "gridstate",
    version,
    about = "Inspect and manage saved grid views",
    long_about = "Inspect and manage saved grid views.\n\n\
                  Works against the configured view store and encodes or decodes \
                  the URL view tokens grid screens use for shareable links."
)]
pub struct Cli {
    /// Configuration file (TOML).
    #[arg(long, global = true, env = "GRIDSTATE_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON regardless of the configuration file.
    #[arg(long = "log-json", global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the saved views of a scope.
    List(ScopeArgs),

    /// Print one saved view.
    Show(ViewArgs),

    /// Save a snapshot under a new name.
    Save(SaveArgs),

    /// Rename a saved view.
    Rename(RenameArgs),

    /// Delete a saved view (clears the default pointer if it matched).
    Delete(ViewArgs),

    /// Make a saved view the scope default.
    SetDefault(ViewArgs),

    /// Remove the scope default pointer.
    ClearDefault(ScopeArgs),

    /// Decode a view token to JSON.
    Decode(DecodeArgs),

    /// Encode a JSON snapshot as a view token.
    Encode(EncodeArgs),

    /// Resolve a page URL the way a grid screen would and print its share link.
    Share(ShareArgs),

    /// Delete every saved view and the default pointer of a scope.
    ClearScope(ScopeArgs),

    /// Print usage counters of the configured store.
    Stats,
}

impl Command {
    /// Whether the command needs a configured store.
    pub fn requires_store(&self) -> bool {
        !matches!(self, Command::Decode(_) | Command::Encode(_))
    }
}

#[derive(Debug, Args)]
pub struct ScopeArgs {
    /// Scope key, e.g. `orders:list`.
    #[arg(long, value_parser = parse_scope)]
    pub scope: ScopeKey,
}

#[derive(Debug, Args)]
pub struct ViewArgs {
    #[arg(long, value_parser = parse_scope)]
    pub scope: ScopeKey,

    /// Saved view id.
    #[arg(long)]
    pub id: ViewId,
}

#[derive(Debug, Args)]
pub struct SaveArgs {
    #[arg(long, value_parser = parse_scope)]
    pub scope: ScopeKey,

    /// Display name of the new view.
    #[arg(long)]
    pub name: String,

    /// Snapshot as a view token.
    #[arg(long, conflicts_with = "snapshot", required_unless_present = "snapshot")]
    pub token: Option<String>,

    /// Snapshot as a JSON object.
    #[arg(long)]
    pub snapshot: Option<String>,
}

#[derive(Debug, Args)]
pub struct RenameArgs {
    #[arg(long, value_parser = parse_scope)]
    pub scope: ScopeKey,

    #[arg(long)]
    pub id: ViewId,

    #[arg(long)]
    pub name: String,
}

#[derive(Debug, Args)]
pub struct DecodeArgs {
    /// View token as found in the URL.
    pub token: String,

    /// Sanitize against these column ids before printing.
    #[arg(long, value_delimiter = ',')]
    pub columns: Option<Vec<String>>,
}

#[derive(Debug, Args)]
pub struct EncodeArgs {
    /// Snapshot as a JSON object.
    pub json: String,

    /// Allowed column ids. Defaults to the ids the snapshot names.
    #[arg(long, value_delimiter = ',')]
    pub columns: Option<Vec<String>>,
}

#[derive(Debug, Args)]
pub struct ShareArgs {
    /// Absolute page URL, with or without a view token.
    #[arg(long)]
    pub url: String,

    #[arg(long, value_parser = parse_scope)]
    pub scope: ScopeKey,

    /// Column ids the screen offers, in declared order.
    #[arg(long, value_delimiter = ',', required = true)]
    pub columns: Vec<String>,

    /// Plain query parameter mirrored into the filter of the same name.
    #[arg(long)]
    pub legacy_filter: Option<String>,

    /// Apply this saved view before building the link.
    #[arg(long)]
    pub id: Option<ViewId>,
}

fn parse_scope(value: &str) -> Result<ScopeKey, String> {
    ScopeKey::new(value).ok_or_else(|| "scope must not be blank".to_string())
}
