//! Session state and its lifecycle.
//!
//! [`SessionManager`] is the single owner of the live bearer token, the
//! warehouse/customer scope and the persisted configuration. It is built once
//! per process and handed by reference to the auth flow and the workflow.

use std::fmt;

use tracing::{debug, info};
use wms_protocol::USER_INFO_PATH;

use crate::config::{ConfigStore, PortalConfig};
use crate::error::{Result, WmsError};
use crate::transport::{PortalRequest, Transport};

/// Authenticated context used for every business call.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
	token: Option<String>,
	warehouse_id: String,
	customer_ids: Vec<String>,
}

impl Session {
	/// Builds the session from persisted config. Customer ids are trimmed and
	/// de-duplicated, keeping first-seen order.
	pub fn from_config(config: &PortalConfig) -> Self {
		let mut customer_ids: Vec<String> = Vec::with_capacity(config.customer_ids.len());
		for id in config.customer_ids.iter().map(|id| id.trim()).filter(|id| !id.is_empty()) {
			if !customer_ids.iter().any(|seen| seen == id) {
				customer_ids.push(id.to_string());
			}
		}

		Self {
			token: Some(config.access_token.trim()).filter(|t| !t.is_empty()).map(str::to_string),
			warehouse_id: config.warehouse_id.trim().to_string(),
			customer_ids,
		}
	}

	pub fn token(&self) -> Option<&str> {
		self.token.as_deref()
	}

	pub fn has_token(&self) -> bool {
		self.token.is_some()
	}

	pub fn warehouse_id(&self) -> &str {
		&self.warehouse_id
	}

	pub fn customer_ids(&self) -> &[String] {
		&self.customer_ids
	}
}

impl fmt::Debug for Session {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Session")
			.field("token", &self.token.as_ref().map(|_| "<redacted>"))
			.field("warehouse_id", &self.warehouse_id)
			.field("customer_ids", &self.customer_ids)
			.finish()
	}
}

/// Operator account. The password stays in memory and never reaches logs.
#[derive(Clone)]
pub struct Credentials {
	pub account: String,
	password: String,
}

impl Credentials {
	pub fn new(account: impl Into<String>, password: impl Into<String>) -> Self {
		Self {
			account: account.into(),
			password: password.into(),
		}
	}

	pub fn from_config(config: &PortalConfig) -> Self {
		Self::new(config.account.trim(), config.password.clone())
	}

	pub(crate) fn password(&self) -> &str {
		&self.password
	}
}

impl fmt::Debug for Credentials {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Credentials").field("account", &self.account).field("password", &"<redacted>").finish()
	}
}

/// Owns the transport, the live session and its persistence.
pub struct SessionManager {
	transport: Transport,
	session: Session,
	config: PortalConfig,
	store: Box<dyn ConfigStore>,
}

impl SessionManager {
	/// Validates `config` and builds a transport for it.
	pub fn new(config: PortalConfig, store: impl ConfigStore + 'static) -> Result<Self> {
		config.validate()?;
		let transport = Transport::new(&config)?;
		Ok(Self::with_transport(config, transport, store))
	}

	/// Uses a pre-built transport, e.g. one with a custom retry policy.
	pub fn with_transport(config: PortalConfig, transport: Transport, store: impl ConfigStore + 'static) -> Self {
		Self {
			session: Session::from_config(&config),
			transport,
			config,
			store: Box::new(store),
		}
	}

	/// Loads config from `store` and builds the manager from it.
	pub fn load(store: impl ConfigStore + 'static) -> Result<Self> {
		let config = store.load()?;
		Self::new(config, store)
	}

	pub fn transport(&self) -> &Transport {
		&self.transport
	}

	pub fn session(&self) -> &Session {
		&self.session
	}

	pub fn config(&self) -> &PortalConfig {
		&self.config
	}

	/// Calls the identity endpoint with the current token.
	///
	/// A `success=false` answer, a non-2xx status or a non-envelope body means
	/// the portal no longer accepts the token and yields
	/// [`WmsError::SessionInvalid`]. Network failures that outlive the
	/// transport retries are returned unchanged so callers can tell a dead
	/// link from a dead session.
	pub async fn validate_session(&self) -> Result<()> {
		if !self.session.has_token() {
			return Err(WmsError::SessionInvalid("no access token".into()));
		}

		match self.transport.send(&PortalRequest::get(USER_INFO_PATH)).await {
			Ok(envelope) if envelope.success => {
				debug!(target = "wms.session", "session valid");
				Ok(())
			}
			Ok(envelope) => Err(WmsError::SessionInvalid(envelope.message().to_string())),
			Err(err @ WmsError::Protocol { .. }) => Err(WmsError::SessionInvalid(err.to_string())),
			Err(err) => Err(err),
		}
	}

	/// Replaces the live token after persisting it.
	///
	/// The config is written through the store first; only when that succeeds
	/// does the new token replace the in-memory one and the transport's
	/// `Authorization` header. A failed save leaves the old token in place.
	pub fn apply_token(&mut self, token: &str) -> Result<()> {
		let token = token.trim();
		if token.is_empty() {
			return Err(WmsError::SessionInvalid("refusing to apply an empty token".into()));
		}

		let mut updated = self.config.clone();
		updated.access_token = token.to_string();
		self.store.save(&updated)?;

		self.config = updated;
		self.session.token = Some(token.to_string());
		self.transport.set_token(token);
		info!(target = "wms.session", "session token renewed and persisted");
		Ok(())
	}
}
