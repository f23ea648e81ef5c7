use anyhow::{Result, bail};
use colored::Colorize;
use wms::WmsError;

use crate::context::CommandContext;

pub async fn execute(ctx: &CommandContext) -> Result<()> {
	let sessions = ctx.sessions()?;
	match sessions.validate_session().await {
		Ok(()) => {
			println!("{}", "session valid".green());
			Ok(())
		}
		Err(WmsError::SessionInvalid(reason)) => {
			println!("{}", format!("session invalid: {reason}").red());
			bail!("session invalid; run `wms login` to renew it")
		}
		Err(err) => Err(err.into()),
	}
}
