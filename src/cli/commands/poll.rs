//! jules poll - incremental poll with an optional persisted cursor

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;

use super::FilterArgs;
use super::activities::activities_layout;
use crate::api::ResumeCursor;
use crate::app::AppContext;
use crate::cli::output::{emit_human, emit_robot, robot_ok};
use crate::error::{JulesError, Result};
use crate::sync;

#[derive(Args, Debug)]
pub struct PollArgs {
    /// Session ID or full name (defaults to --session-id)
    #[arg(value_name = "SESSION_ID")]
    pub session: Option<String>,

    /// Last processed activity ID
    #[arg(long)]
    pub last_id: Option<String>,

    /// Last received page token
    #[arg(long)]
    pub last_token: Option<String>,

    /// Cursor file: read before polling if it exists, rewritten afterwards
    #[arg(long)]
    pub cursor_file: Option<PathBuf>,

    #[command(flatten)]
    pub filter: FilterArgs,
}

pub fn run(ctx: &AppContext, args: &PollArgs) -> Result<()> {
    let session = ctx.session(args.session.as_deref())?;

    let mut cursor = match &args.cursor_file {
        Some(path) => load_cursor(path)?.unwrap_or_default(),
        None => ResumeCursor::default(),
    };
    if let Some(id) = &args.last_id {
        cursor.last_id = Some(id.clone());
    }
    if let Some(token) = &args.last_token {
        cursor.last_token = Some(token.clone());
    }

    let outcome = sync::poll(&ctx.client, &session, &cursor, &args.filter.to_filter())?;

    if let Some(path) = &args.cursor_file {
        save_cursor(path, &outcome.cursor)?;
    }

    if ctx.robot_mode {
        emit_robot(&robot_ok(&outcome))
    } else {
        let mut layout = activities_layout("New Activities", &session, &outcome.activities);
        layout
            .blank()
            .kv("Last id", outcome.cursor.last_id.as_deref().unwrap_or("-"))
            .kv(
                "Last token",
                outcome.cursor.last_token.as_deref().unwrap_or("-"),
            );
        emit_human(layout);
        Ok(())
    }
}

pub fn load_cursor(path: &Path) -> Result<Option<ResumeCursor>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)?;
    if raw.trim().is_empty() {
        return Ok(None);
    }
    let cursor = serde_json::from_str(&raw).map_err(|err| {
        JulesError::Config(format!("parse cursor file {}: {err}", path.display()))
    })?;
    Ok(Some(cursor))
}

pub fn save_cursor(path: &Path, cursor: &ResumeCursor) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(cursor)?)?;
    Ok(())
}
