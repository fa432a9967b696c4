//! jules latest

use clap::Args;

use super::FilterArgs;
use super::activities::activities_layout;
use crate::app::AppContext;
use crate::cli::output::{emit_human, emit_robot, robot_ok};
use crate::error::Result;
use crate::sync;

#[derive(Args, Debug)]
pub struct LatestArgs {
    /// Session ID or full name (defaults to --session-id)
    #[arg(value_name = "SESSION_ID")]
    pub session: Option<String>,

    /// Number of recent activities to return
    #[arg(long, default_value = "10")]
    pub count: usize,

    #[command(flatten)]
    pub filter: FilterArgs,
}

pub fn run(ctx: &AppContext, args: &LatestArgs) -> Result<()> {
    let session = ctx.session(args.session.as_deref())?;
    let activities = sync::latest(&ctx.client, &session, &args.filter.to_filter(), args.count)?;

    if ctx.robot_mode {
        emit_robot(&robot_ok(serde_json::json!({ "activities": activities })))
    } else {
        emit_human(activities_layout("Latest Activities", &session, &activities));
        Ok(())
    }
}
