//! Command-line surface of `qingsync`, as clap derive structures.

use clap::{Args, Parser, Subcommand, ValueEnum};

/// qingsync -- sync Qingping IoT cloud sensors into a local view
#[derive(Debug, Parser)]
#[command(
    name = "qingsync",
    version,
    about = "Watch Qingping IoT cloud sensors from the command line",
    long_about = "Synchronizes a fleet of Qingping sensors into a local view,\n\
        merging periodic cloud polls with asynchronous data-push updates,\n\
        and evaluating per-reading freshness against each device's cadence.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

/// Flags accepted by every subcommand.
#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Developer-cloud app key
    #[arg(long, env = "QINGPING_APP_KEY", global = true)]
    pub app_key: Option<String>,

    /// Developer-cloud app secret
    #[arg(long, env = "QINGPING_APP_SECRET", global = true, hide_env = true)]
    pub app_secret: Option<String>,

    /// How to render results
    #[arg(
        long,
        short = 'o',
        env = "QINGPING_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// Seconds between poll refreshes (floor-clamped to 60)
    #[arg(long, env = "QINGPING_POLL_INTERVAL", global = true)]
    pub poll_interval: Option<u64>,

    /// Deadline in seconds for each cloud request
    #[arg(long, env = "QINGPING_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// More log output (repeat up to -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Print nothing but errors
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Aligned table for interactive use (default)
    Table,
    /// Indented JSON
    Json,
    /// Single-line JSON
    JsonCompact,
    /// Bare identifiers, one per line, for scripting
    Plain,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List synced devices and their state
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Show one device's readings with freshness evaluation
    #[command(alias = "r")]
    Readings(ReadingsArgs),

    /// Run the sync loop and stream state changes
    #[command(alias = "w")]
    Watch(WatchArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Emit a completion script for a shell
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct DevicesArgs {
    /// Show only the device with this MAC
    #[arg(long, short = 'm')]
    pub mac: Option<String>,
}

#[derive(Debug, Args)]
pub struct ReadingsArgs {
    /// Device MAC (any common format)
    #[arg(long, short = 'm')]
    pub mac: String,

    /// Show only this attribute
    #[arg(long, short = 'a')]
    pub attribute: Option<String>,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Exit after this many sync events (0 = run until Ctrl-C)
    #[arg(long, default_value = "0")]
    pub count: u64,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file path
    Path,
    /// Show the effective configuration (secret redacted)
    Show,
    /// Write app credentials to the config file and keyring
    Init {
        /// Developer-cloud app key
        #[arg(long)]
        app_key: String,
        /// Developer-cloud app secret (stored in the system keyring)
        #[arg(long)]
        app_secret: String,
    },
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    pub shell: clap_complete::Shell,
}
