//! Command-line client for browsing Albamate listings and managing scraps.

use std::process;

use clap::Parser;
use tracing::debug;

mod cli;
mod commands;
mod context;
mod output;

use cli::{Cli, Command, command_label};
use context::{AppContext, CliResult};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = albamate_telemetry::init_logging(&albamate_telemetry::LoggingConfig::default())
    {
        eprintln!("warning: {err:#}");
    }

    let command = command_label(&cli.command);
    debug!(command, "starting");

    match run(cli).await {
        Ok(()) => {}
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            process::exit(err.exit_code());
        }
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    let context = AppContext::from_cli(&cli)?;
    let format = cli.format;

    match &cli.command {
        Command::List(args) => commands::alba::list(&context, args, format).await,
        Command::Show { form_id } => commands::alba::show(&context, *form_id, format).await,
        Command::Scrap { form_id } => commands::scrap::toggle(&context, *form_id, format).await,
        Command::MyScraps => commands::alba::my_scraps(&context, format).await,
        Command::MyListings => commands::alba::my_listings(&context, format).await,
    }
}
