use anyhow::Result;
use colored::Colorize;

use crate::context::{CommandContext, login_solver, orchestrator};

pub async fn execute(ctx: &CommandContext, remark: Option<String>, pickup_type: Option<u32>) -> Result<()> {
	let sessions = ctx.sessions()?;
	let solver = login_solver(sessions.config())?;
	let mut orchestrator = orchestrator(sessions, solver.as_ref())?;
	orchestrator.ensure_session().await?;

	let mut request = orchestrator.wave_request();
	if let Some(remark) = remark {
		request.remark = remark;
	}
	if let Some(pickup_type) = pickup_type {
		request.pickup_type = pickup_type;
	}

	let wave = orchestrator.create_pickup_wave(&request).await?;
	println!("{}", format!("pickup wave {} created", wave.id).green().bold());
	Ok(())
}
