//! Binary entry point for the `opsync` command-line tool.

use anyhow::Result;
use clap::Parser;

use opsync_cli::bundle::TarArchiver;
use opsync_cli::cli::{Cli, Command};
use opsync_cli::transport::GhSecretStore;
use opsync_cli::{commands, logging};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();

    let command_name = match &args.command {
        Command::Sync(_) => "sync",
        Command::Restore(_) => "restore",
        Command::Targets => "targets",
        Command::Version => "version",
    };
    logging::init_subscriber(args.verbose, command_name);
    let log = logging::Logger::new(command_name);

    match args.command {
        Command::Sync(opts) => {
            commands::sync::run(&args.global, &opts, &GhSecretStore, &TarArchiver, &log)
        }
        Command::Restore(opts) => commands::restore::run(&args.global, &opts, &TarArchiver, &log),
        Command::Targets => commands::targets::run(&args.global, &log),
        Command::Version => {
            commands::version::run();
            Ok(())
        }
    }
}
