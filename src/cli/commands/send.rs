//! jules send

use clap::Args;

use super::sessions::emit_value;
use crate::app::AppContext;
use crate::error::Result;

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Message text
    pub prompt: String,

    /// Session ID or full name (defaults to --session-id)
    #[arg(long = "to", value_name = "SESSION_ID")]
    pub session: Option<String>,
}

pub fn run(ctx: &AppContext, args: &SendArgs) -> Result<()> {
    let session = ctx.session(args.session.as_deref())?;
    emit_value(ctx, &ctx.client.send_message(&session, &args.prompt)?)
}
