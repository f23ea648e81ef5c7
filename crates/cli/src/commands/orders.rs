use anyhow::Result;
use colored::Colorize;

use crate::context::{CommandContext, login_solver, orchestrator};

pub async fn execute(ctx: &CommandContext, page: u32, page_size: Option<u32>, json: bool) -> Result<()> {
	let sessions = ctx.sessions()?;
	let page_size = page_size.unwrap_or(sessions.config().wave.page_size);
	let solver = login_solver(sessions.config())?;
	let mut orchestrator = orchestrator(sessions, solver.as_ref())?;
	orchestrator.ensure_session().await?;

	let customer_ids = orchestrator.sessions().session().customer_ids().to_vec();
	let waiting = orchestrator.get_waiting_pick_orders(page, page_size, &customer_ids).await?;

	if json {
		println!("{}", serde_json::to_string_pretty(&waiting)?);
		return Ok(());
	}

	println!("{}", format!("{} waiting pick order(s)", waiting.total).bold());
	for order in &waiting.orders {
		println!("  {}", order.reference_id().unwrap_or("<no reference>"));
	}
	Ok(())
}
