//! CLI command implementations
//!
//! Each subcommand has its own module with:
//! - Args struct for command-line arguments
//! - run() function to execute the command

use clap::{Args, Subcommand, ValueEnum};

pub mod activities;
pub mod latest;
pub mod poll;
pub mod send;
pub mod sessions;
pub mod wait;

use crate::api::Originator;
use crate::app::AppContext;
use crate::error::Result;
use crate::sync::ActivityFilter;

/// Dispatch a command to its handler
pub fn run(ctx: &AppContext, command: &Commands) -> Result<()> {
    match command {
        Commands::Sources => sessions::run_sources(ctx),
        Commands::Sessions(args) => sessions::run_list(ctx, args),
        Commands::Session(args) => sessions::run_get(ctx, args),
        Commands::Activities(args) => activities::run(ctx, args),
        Commands::AllActivities(args) => activities::run_all(ctx, args),
        Commands::Latest(args) => latest::run(ctx, args),
        Commands::Poll(args) => poll::run(ctx, args),
        Commands::WaitFor(args) => wait::run(ctx, args),
        Commands::Send(args) => send::run(ctx, args),
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List available sources
    Sources,

    /// List sessions
    Sessions(sessions::SessionsArgs),

    /// Get session details
    Session(sessions::SessionArgs),

    /// List session activities
    Activities(activities::ActivitiesArgs),

    /// List all session activities (auto-paginated)
    AllActivities(activities::AllActivitiesArgs),

    /// Get the most recent activities
    Latest(latest::LatestArgs),

    /// Poll only activities appended since a resume cursor
    Poll(poll::PollArgs),

    /// Wait for a matching activity to appear
    WaitFor(wait::WaitArgs),

    /// Send a message to a session
    Send(send::SendArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OriginatorArg {
    User,
    Agent,
}

impl From<OriginatorArg> for Originator {
    fn from(value: OriginatorArg) -> Self {
        match value {
            OriginatorArg::User => Self::User,
            OriginatorArg::Agent => Self::Agent,
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Filter by originator
    #[arg(long, value_enum)]
    pub originator: Option<OriginatorArg>,

    /// Filter by activity type (e.g. userMessaged, agentMessaged)
    #[arg(long = "type", value_name = "TYPE")]
    pub kind: Option<String>,
}

impl FilterArgs {
    #[must_use]
    pub fn to_filter(&self) -> ActivityFilter {
        ActivityFilter::new(self.originator.map(Originator::from), self.kind.clone())
    }
}
