//! jules activities / all-activities

use clap::Args;

use super::FilterArgs;
use crate::api::{Activity, SessionName};
use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_robot, robot_ok};
use crate::error::Result;
use crate::sync::{self, FilteredPage};

#[derive(Args, Debug)]
pub struct ActivitiesArgs {
    /// Session ID or full name (defaults to --session-id)
    #[arg(value_name = "SESSION_ID")]
    pub session: Option<String>,

    /// Number of activities to list
    #[arg(long, default_value = "30")]
    pub page_size: usize,

    /// Token for the next page
    #[arg(long)]
    pub page_token: Option<String>,

    #[command(flatten)]
    pub filter: FilterArgs,

    /// Jump to the end and return only the latest activities
    #[arg(long)]
    pub tail: bool,
}

#[derive(Args, Debug)]
pub struct AllActivitiesArgs {
    /// Session ID or full name (defaults to --session-id)
    #[arg(value_name = "SESSION_ID")]
    pub session: Option<String>,

    #[command(flatten)]
    pub filter: FilterArgs,
}

pub fn run(ctx: &AppContext, args: &ActivitiesArgs) -> Result<()> {
    let session = ctx.session(args.session.as_deref())?;
    let filter = args.filter.to_filter();

    let page = if args.tail {
        FilteredPage {
            activities: sync::latest(&ctx.client, &session, &filter, args.page_size)?,
            next_token: None,
        }
    } else {
        sync::fetch_filtered(
            &ctx.client,
            &session,
            &filter,
            args.page_size,
            args.page_token.as_deref(),
        )?
    };

    if ctx.robot_mode {
        emit_robot(&robot_ok(&page))
    } else {
        let mut layout = activities_layout("Activities", &session, &page.activities);
        if let Some(token) = &page.next_token {
            layout.blank().kv("Next token", token);
        }
        emit_human(layout);
        Ok(())
    }
}

pub fn run_all(ctx: &AppContext, args: &AllActivitiesArgs) -> Result<()> {
    let session = ctx.session(args.session.as_deref())?;
    let activities = sync::fetch_all(&ctx.client, &session, &args.filter.to_filter())?;

    if ctx.robot_mode {
        emit_robot(&robot_ok(serde_json::json!({ "activities": activities })))
    } else {
        emit_human(activities_layout("All Activities", &session, &activities));
        Ok(())
    }
}

pub(super) fn activities_layout(
    title: &str,
    session: &SessionName,
    activities: &[Activity],
) -> HumanLayout {
    let mut layout = HumanLayout::new();
    layout
        .title(title)
        .kv("Session", session.as_str())
        .kv("Count", &activities.len().to_string())
        .blank()
        .activities(activities);
    layout
}
