//! Shared state for command execution.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::warn;
use wms::{AuthenticationFlow, ConfigStore, HttpCaptchaSolver, JsonConfigStore, PortalConfig, SessionManager, WorkflowOrchestrator};

pub struct CommandContext {
	config_path: PathBuf,
}

impl CommandContext {
	pub fn new(config_path: PathBuf) -> Self {
		Self { config_path }
	}

	pub fn config_path(&self) -> &Path {
		&self.config_path
	}

	pub fn store(&self) -> JsonConfigStore {
		JsonConfigStore::new(&self.config_path)
	}

	pub fn load_config(&self) -> Result<PortalConfig> {
		self.store()
			.load()
			.with_context(|| format!("loading config from {}", self.config_path.display()))
	}

	/// Session manager over the persisted config.
	pub fn sessions(&self) -> Result<SessionManager> {
		let config = self.load_config()?;
		SessionManager::new(config, self.store()).with_context(|| format!("invalid config in {}", self.config_path.display()))
	}
}

/// Captcha solver for the configured recognition service, or `None` when the
/// login settings are incomplete and re-login is unavailable.
pub fn login_solver(config: &PortalConfig) -> Result<Option<HttpCaptchaSolver>> {
	if let Err(err) = config.validate_credentials() {
		warn!(target = "wms", error = %err, "automatic login disabled");
		return Ok(None);
	}
	let solver = HttpCaptchaSolver::new(&config.ocr_endpoint, config.timeout())?;
	Ok(Some(solver))
}

/// Orchestrator that can log in again when `solver` is available.
pub fn orchestrator<'a>(sessions: SessionManager, solver: Option<&'a HttpCaptchaSolver>) -> Result<WorkflowOrchestrator<'a>> {
	let config = sessions.config().clone();
	let orchestrator = WorkflowOrchestrator::new(sessions);
	match solver {
		Some(solver) => Ok(orchestrator.with_auth(AuthenticationFlow::from_config(solver, &config)?)),
		None => Ok(orchestrator),
	}
}
