//! HTTP transport bound to the portal origin.
//!
//! Owns the `reqwest` client, the current bearer token and the retry policy
//! for network-level failures. Every response is decoded as an [`Envelope`];
//! endpoint modules turn that into typed payloads with [`decode_success`].

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;
use wms_protocol::{Envelope, LOGIN_PAGE_PATH, QueryPairs};

use crate::config::PortalConfig;
use crate::error::{Result, WmsError};
use crate::headers::browser_headers;
use crate::retry::RetryPolicy;

/// Whether a request carries the session's bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth {
	Bearer,
	/// No `Authorization` header, for the captcha and login endpoints.
	Anonymous,
}

/// A single portal call.
#[derive(Debug, Clone)]
pub struct PortalRequest<'a> {
	pub method: Method,
	pub path: &'a str,
	pub query: QueryPairs,
	pub body: Option<Value>,
	pub auth: Auth,
	pub headers: Vec<(&'static str, String)>,
}

impl<'a> PortalRequest<'a> {
	pub fn new(method: Method, path: &'a str) -> Self {
		Self {
			method,
			path,
			query: Vec::new(),
			body: None,
			auth: Auth::Bearer,
			headers: Vec::new(),
		}
	}

	pub fn get(path: &'a str) -> Self {
		Self::new(Method::GET, path)
	}

	pub fn post(path: &'a str) -> Self {
		Self::new(Method::POST, path)
	}

	pub fn query(mut self, pairs: QueryPairs) -> Self {
		self.query.extend(pairs);
		self
	}

	pub fn json<B: Serialize>(mut self, body: &B) -> Result<Self> {
		self.body = Some(serde_json::to_value(body)?);
		Ok(self)
	}

	pub fn anonymous(mut self) -> Self {
		self.auth = Auth::Anonymous;
		self
	}

	pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
		self.headers.push((name, value.into()));
		self
	}
}

/// Keys whose values never reach the logs.
const SECRET_KEYS: [&str; 5] = ["token", "password", "accesstoken", "access_token", "authorization"];

/// Replaces secret values anywhere in `value` with a placeholder.
fn redact(value: Value) -> Value {
	match value {
		Value::Object(map) => Value::Object(
			map.into_iter()
				.map(|(key, value)| {
					if SECRET_KEYS.contains(&key.to_ascii_lowercase().as_str()) {
						(key, Value::String("<redacted>".into()))
					} else {
						(key, redact(value))
					}
				})
				.collect(),
		),
		Value::Array(items) => Value::Array(items.into_iter().map(redact).collect()),
		other => other,
	}
}

// Non-JSON bodies are summarized by size since they cannot be redacted.
fn redact_text(text: &str) -> String {
	match serde_json::from_str::<Value>(text) {
		Ok(value) => redact(value).to_string(),
		Err(_) => format!("<{} bytes, not JSON>", text.len()),
	}
}

/// Connection-level failures worth another attempt.
fn is_retryable(err: &reqwest::Error) -> bool {
	err.is_connect() || err.is_timeout() || err.is_request()
}

pub struct Transport {
	client: reqwest::Client,
	base_url: Url,
	token: Option<String>,
	policy: RetryPolicy,
	debug: bool,
}

impl Transport {
	/// Builds a transport from config: base origin, timeout, TLS 1.2 minimum,
	/// browser header profile and the persisted access token.
	pub fn new(config: &PortalConfig) -> Result<Self> {
		let base_url = Url::parse(&config.base_url)?;
		let origin = base_url.origin().ascii_serialization();
		let client = reqwest::Client::builder()
			.default_headers(browser_headers(&origin)?)
			.timeout(config.timeout())
			.min_tls_version(reqwest::tls::Version::TLS_1_2)
			.build()
			.map_err(|e| WmsError::Config(format!("failed to create HTTP client: {e}")))?;

		let token = Some(config.access_token.trim()).filter(|t| !t.is_empty()).map(str::to_string);

		Ok(Self {
			client,
			base_url,
			token,
			policy: RetryPolicy::transport(),
			debug: config.debug,
		})
	}

	pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
		self.policy = policy;
		self
	}

	pub fn policy(&self) -> RetryPolicy {
		self.policy
	}

	pub fn base_url(&self) -> &Url {
		&self.base_url
	}

	pub fn has_token(&self) -> bool {
		self.token.is_some()
	}

	pub(crate) fn set_token(&mut self, token: &str) {
		self.token = Some(token.to_string());
	}

	/// `Referer` value for the anonymous login endpoints.
	pub fn login_referer(&self) -> String {
		format!("{}{}", self.base_url.origin().ascii_serialization(), LOGIN_PAGE_PATH)
	}

	pub fn url(&self, path: &str) -> Result<Url> {
		Ok(self.base_url.join(path)?)
	}

	/// Sends `request`, retrying connection failures, and decodes the envelope.
	///
	/// Non-2xx statuses and non-envelope bodies are protocol errors and are
	/// not retried. `success=false` is returned as-is for the caller to judge.
	pub async fn send(&self, request: &PortalRequest<'_>) -> Result<Envelope> {
		let url = self.url(request.path)?;
		let endpoint = request.path;

		if self.debug {
			let body = request.body.clone().map(redact);
			debug!(target = "wms.transport", method = %request.method, %url, query = ?request.query, body = ?body, "request");
		}

		let response = self
			.policy
			.run(
				|attempt| {
					trace!(target = "wms.transport", attempt, %endpoint, "sending");
					let mut builder = self.client.request(request.method.clone(), url.clone());
					if !request.query.is_empty() {
						builder = builder.query(&request.query);
					}
					if let Some(body) = &request.body {
						builder = builder.json(body);
					}
					if let (Auth::Bearer, Some(token)) = (request.auth, self.token.as_deref()) {
						builder = builder.bearer_auth(token);
					}
					for (name, value) in &request.headers {
						builder = builder.header(*name, value.as_str());
					}
					builder.send()
				},
				is_retryable,
			)
			.await
			.map_err(|failure| WmsError::Transport {
				endpoint: endpoint.to_string(),
				attempts: failure.attempts,
				source: failure.error,
			})?;

		let status = response.status();
		let text = response
			.text()
			.await
			.map_err(|e| WmsError::protocol(endpoint, Some(status.as_u16()), format!("failed to read response body: {e}")))?;

		if self.debug {
			debug!(target = "wms.transport", %endpoint, status = status.as_u16(), body = %redact_text(&text), "response");
		}

		if !status.is_success() {
			return Err(WmsError::protocol(endpoint, Some(status.as_u16()), format!("unexpected status code: {}", status.as_u16())));
		}

		serde_json::from_str::<Envelope>(&text)
			.map_err(|e| WmsError::protocol(endpoint, Some(status.as_u16()), format!("response is not a portal envelope: {e}")))
	}
}

/// Rejects `success=false` envelopes and decodes the payload into `T`.
pub fn decode_success<T: DeserializeOwned>(envelope: Envelope, endpoint: &str) -> Result<Envelope<T>> {
	if !envelope.success {
		return Err(WmsError::business(endpoint, envelope.message()));
	}
	envelope
		.decode()
		.map_err(|e| WmsError::protocol(endpoint, None, format!("unexpected payload shape: {e}")))
}

/// Like [`decode_success`] but requires a payload.
pub fn require_data<T: DeserializeOwned>(envelope: Envelope, endpoint: &str) -> Result<T> {
	decode_success::<T>(envelope, endpoint)?
		.data
		.ok_or_else(|| WmsError::protocol(endpoint, None, "response has no data"))
}
