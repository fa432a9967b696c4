//! jules sources / sessions / session

use clap::Args;
use serde_json::Value;

use crate::app::AppContext;
use crate::cli::output::{emit_json, emit_robot, robot_ok};
use crate::error::Result;

#[derive(Args, Debug)]
pub struct SessionsArgs {
    /// Number of sessions to list
    #[arg(long, default_value = "10")]
    pub page_size: u32,
}

#[derive(Args, Debug)]
pub struct SessionArgs {
    /// Session ID or full name (defaults to --session-id)
    #[arg(value_name = "SESSION_ID")]
    pub session: Option<String>,
}

pub fn run_sources(ctx: &AppContext) -> Result<()> {
    emit_value(ctx, &ctx.client.list_sources()?)
}

pub fn run_list(ctx: &AppContext, args: &SessionsArgs) -> Result<()> {
    emit_value(ctx, &ctx.client.list_sessions(args.page_size)?)
}

pub fn run_get(ctx: &AppContext, args: &SessionArgs) -> Result<()> {
    let session = ctx.session(args.session.as_deref())?;
    emit_value(ctx, &ctx.client.get_session(&session)?)
}

/// Opaque API payloads are printed as JSON in both modes.
pub(super) fn emit_value(ctx: &AppContext, value: &Value) -> Result<()> {
    if ctx.robot_mode {
        emit_robot(&robot_ok(value))
    } else {
        emit_json(value)
    }
}
