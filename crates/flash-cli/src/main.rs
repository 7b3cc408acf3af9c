//! flash - an unbundled ESM development server.

use clap::Parser;
use flash_cli::{cli, commands, error, logger, ui};
use miette::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    let no_color = args.no_color || !ui::should_use_color();
    logger::init_logger(args.verbose, args.quiet, no_color);
    ui::init_colors();

    let result = match args.command {
        cli::Command::Dev(dev_args) => commands::dev_execute(dev_args).await,
        cli::Command::Prebundle(prebundle_args) => commands::prebundle_execute(prebundle_args).await,
    };

    result.map_err(error::cli_error_to_miette)
}
