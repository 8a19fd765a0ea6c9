//! `stacks-agent`: hosts the Stacks page agent on the command line.

mod augment;
mod cli;
mod host;
mod queue;
mod settings;

use agent_logging::{agent_info, LogDestination};
use clap::Parser;
use log::LevelFilter;

use crate::cli::{Cli, Commands};

fn init_logging(cli: &Cli) {
    let (destination, level) = match cli.verbose {
        0 => (LogDestination::File(cli.log_file.clone()), LevelFilter::Info),
        1 => (LogDestination::Both(cli.log_file.clone()), LevelFilter::Info),
        _ => (LogDestination::Both(cli.log_file.clone()), LevelFilter::Debug),
    };
    agent_logging::initialize(destination, level);
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);
    agent_info!("stacks-agent {} starting", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Augment(args) => augment::run(&cli.settings, args).await,
        Commands::Queue { item } => queue::run(&cli.settings, &item).await,
        Commands::Settings { action } => settings::run(&cli.settings, action).await,
    }
}
