//! Error taxonomy for portal access, authentication and the wave workflow.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the `wms` crate.
#[derive(Debug, Error)]
pub enum WmsError {
	/// Persisted configuration is missing required values or cannot be parsed.
	#[error("config error: {0}")]
	Config(String),

	#[error("config file {}: {source}", path.display())]
	ConfigIo {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	/// Network-level failure that outlived the transport retry policy.
	#[error("transport error on {endpoint} after {attempts} attempt(s): {source}")]
	Transport {
		endpoint: String,
		attempts: u32,
		#[source]
		source: reqwest::Error,
	},

	/// Non-2xx status or a body that is not a response envelope.
	#[error("protocol error on {endpoint}: {message}")]
	Protocol {
		endpoint: String,
		status: Option<u16>,
		message: String,
	},

	/// The portal answered `success=false`.
	#[error("{endpoint} failed: {message}")]
	Business { endpoint: String, message: String },

	/// Captcha recognition failed or returned nothing usable.
	#[error("captcha recognition failed: {0}")]
	Captcha(String),

	/// The bearer token is no longer accepted.
	#[error("session invalid: {0}")]
	SessionInvalid(String),

	/// Every login attempt failed; `last` is the final attempt's error.
	#[error("login failed after {attempts} attempt(s), last error: {last}")]
	AuthExhausted {
		attempts: u32,
		#[source]
		last: Box<WmsError>,
	},

	/// The password could not be encrypted for transmission.
	#[error("password encryption failed: {0}")]
	Encryption(String),

	#[error("invalid URL: {0}")]
	Url(#[from] url::ParseError),

	#[error(transparent)]
	Json(#[from] serde_json::Error),
}

impl WmsError {
	pub(crate) fn protocol(endpoint: &str, status: Option<u16>, message: impl Into<String>) -> Self {
		Self::Protocol {
			endpoint: endpoint.to_string(),
			status,
			message: message.into(),
		}
	}

	pub(crate) fn business(endpoint: &str, message: impl Into<String>) -> Self {
		Self::Business {
			endpoint: endpoint.to_string(),
			message: message.into(),
		}
	}

	/// Returns true for connectivity failures, as opposed to answers from the portal.
	pub fn is_transport(&self) -> bool {
		matches!(self, Self::Transport { .. })
	}
}

pub type Result<T> = std::result::Result<T, WmsError>;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn exhausted_message_includes_last_error() {
		let err = WmsError::AuthExhausted {
			attempts: 3,
			last: Box::new(WmsError::business("/api/login/authenticate", "captcha mismatch")),
		};
		assert_eq!(
			err.to_string(),
			"login failed after 3 attempt(s), last error: /api/login/authenticate failed: captcha mismatch"
		);
		assert!(std::error::Error::source(&err).is_some());
	}

	#[test]
	fn protocol_errors_are_not_transport() {
		let err = WmsError::protocol("/api/user/getUserInfo", Some(502), "unexpected status 502");
		assert!(!err.is_transport());
	}
}
