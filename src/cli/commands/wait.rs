//! jules wait-for

use std::time::Duration;

use clap::Args;

use super::FilterArgs;
use super::activities::activities_layout;
use crate::app::AppContext;
use crate::cli::output::{emit_human, emit_robot, robot_ok};
use crate::error::Result;
use crate::sync::{self, WaitOptions};

#[derive(Args, Debug)]
pub struct WaitArgs {
    /// Session ID or full name (defaults to --session-id)
    #[arg(value_name = "SESSION_ID")]
    pub session: Option<String>,

    #[command(flatten)]
    pub filter: FilterArgs,

    /// Timeout in seconds (defaults to [wait].timeout)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Seconds between polls (defaults to [wait].poll_interval)
    #[arg(long)]
    pub poll_interval: Option<u64>,
}

pub fn run(ctx: &AppContext, args: &WaitArgs) -> Result<()> {
    let session = ctx.session(args.session.as_deref())?;

    let mut options = WaitOptions::from(&ctx.config.wait);
    if let Some(secs) = args.timeout {
        options.timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = args.poll_interval {
        options.poll_interval = Duration::from_secs(secs);
    }

    let clock = ctx.client.clock();
    let activities = sync::wait_for(
        &ctx.client,
        clock.as_ref(),
        &session,
        &args.filter.to_filter(),
        options,
    )?;

    if ctx.robot_mode {
        emit_robot(&robot_ok(serde_json::json!({ "activities": activities })))
    } else {
        emit_human(activities_layout("Matched Activities", &session, &activities));
        Ok(())
    }
}
