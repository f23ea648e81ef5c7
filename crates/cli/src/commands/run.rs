use anyhow::Result;
use colored::Colorize;
use wms::SessionStatus;

use crate::banner;
use crate::context::{CommandContext, login_solver, orchestrator};

pub async fn execute(ctx: &CommandContext) -> Result<()> {
	banner::print();

	let sessions = ctx.sessions()?;
	let solver = login_solver(sessions.config())?;
	let mut orchestrator = orchestrator(sessions, solver.as_ref())?;
	let report = orchestrator.run().await?;

	match report.session {
		SessionStatus::Valid => println!("{}", "session valid".green()),
		SessionStatus::Renewed(outcome) => println!("{}", format!("session renewed (login attempt {})", outcome.attempts).green()),
	}
	match report.wave {
		Some(wave) => println!("{}", format!("pickup wave {} created for {} waiting order(s)", wave.id, report.total).green().bold()),
		None => println!("no waiting pick orders"),
	}
	Ok(())
}
