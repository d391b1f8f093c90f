//! Command-line definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "doorwarden",
    version,
    about = "Watch a door/alarm monitoring dashboard in real time"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Dashboard base URL (overrides the config file)
    #[arg(short, long, env = "DOORWARDEN_URL", global = true)]
    pub url: Option<String>,

    /// Config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Accept self-signed TLS certificates
    #[arg(short = 'k', long, global = true)]
    pub insecure: bool,

    /// Verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Connect and stream live status updates to the terminal
    Watch(WatchArgs),

    /// Fetch one snapshot and print it
    Status,

    /// Configuration helpers
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Polling period in milliseconds
    #[arg(long)]
    pub poll_interval_ms: Option<u64>,

    /// Disable the push channel (polling only)
    #[arg(long)]
    pub no_push: bool,
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

    /// Write a starter config file
    Init,
}
