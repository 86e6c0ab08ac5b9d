//! gridstate CLI entry point.

use clap::Parser;
use gridstate_cli::config::{load_config, load_or_ephemeral};
use gridstate_cli::logging::init_logging;
use gridstate_cli::{run, Cli, CliError, CommandContext};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    match execute(cli).await {
        Ok(output) => println!("{output}"),
        Err(error) => {
            eprintln!("error: {error}");
            std::process::exit(1);
        }
    }
}

async fn execute(cli: Cli) -> Result<String, CliError> {
    let config_path = cli.config.as_deref();
    let config = if cli.command.requires_store() {
        load_config(config_path)?
    } else {
        load_or_ephemeral(config_path)?
    };
    init_logging(cli.log_json || config.log.json)?;

    let ctx = CommandContext::from_config(&config)?;
    run(&ctx, cli.command).await
}
