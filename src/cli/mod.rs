//! Command-line surface for the `jules` binary.

use std::path::PathBuf;

use clap::Parser;

pub mod commands;
pub mod output;

pub use commands::Commands;

#[derive(Parser, Debug)]
#[command(
    name = "jules",
    version,
    about = "Tail, poll, and wait on Jules session activity logs"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Session ID or full name (defaults to JULES_SESSION_ID)
    #[arg(long, global = true, env = "JULES_SESSION_ID")]
    pub session_id: Option<String>,

    /// Config file path (defaults to JULES_CONFIG, then the user config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Emit machine-readable JSON envelopes
    #[arg(long, global = true)]
    pub robot: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Disable logging
    #[arg(short, long, global = true)]
    pub quiet: bool,
}
