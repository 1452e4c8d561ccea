//! Command handlers and top-level dispatch.

pub mod config_cmd;
pub mod devices;
pub mod readings;
pub mod watch;

use clap::CommandFactory as _;

use qingsync_core::Coordinator;

use crate::cli::{Cli, Command};
use crate::config::resolve_sync_config;
use crate::error::CliError;
use crate::output::Printer;

/// Run the parsed command line to completion.
pub async fn run(cli: Cli) -> Result<(), CliError> {
    let printer = Printer::new(cli.global.output.clone(), cli.global.quiet);

    match cli.command {
        // Local commands: no cloud credentials needed.
        Command::Config(args) => config_cmd::handle(args, &printer),
        Command::Completions(args) => {
            clap_complete::generate(
                args.shell,
                &mut Cli::command(),
                "qingsync",
                &mut std::io::stdout(),
            );
            Ok(())
        }

        // Everything else synchronizes against the cloud.
        cloud_cmd => {
            let coordinator = Coordinator::new(resolve_sync_config(&cli.global)?)?;
            tracing::debug!(command = ?cloud_cmd, "running cloud command");
            match cloud_cmd {
                Command::Devices(args) => devices::handle(&coordinator, args, &printer).await,
                Command::Readings(args) => readings::handle(&coordinator, args, &printer).await,
                Command::Watch(args) => watch::handle(&coordinator, args, &printer).await,
                Command::Config(_) | Command::Completions(_) => unreachable!("handled above"),
            }
        }
    }
}
