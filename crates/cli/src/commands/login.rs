use anyhow::{Context, Result};
use colored::Colorize;
use wms::{AuthenticationFlow, HttpCaptchaSolver};

use crate::context::CommandContext;

pub async fn execute(ctx: &CommandContext) -> Result<()> {
	let mut sessions = ctx.sessions()?;
	let config = sessions.config().clone();
	config.validate_credentials()?;

	let solver = HttpCaptchaSolver::new(&config.ocr_endpoint, config.timeout())?;
	let flow = AuthenticationFlow::from_config(&solver, &config)?;
	let outcome = flow.authenticate(&mut sessions).await.context("login failed")?;

	println!(
		"{}",
		format!("logged in as {} (attempt {}), token saved to {}", flow.credentials().account, outcome.attempts, ctx.config_path().display()).green()
	);
	Ok(())
}
