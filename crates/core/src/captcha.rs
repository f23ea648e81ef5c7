//! Captcha recognition collaborator.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;
use url::Url;
use wms_protocol::{OcrRequest, OcrResponse};

use crate::error::{Result, WmsError};

pub use wms_protocol::strip_data_uri_prefix;

/// Turns a captcha image into its text.
#[async_trait]
pub trait CaptchaSolver: Send + Sync {
	/// `base64_image` is the raw base64 payload without a data URI prefix.
	async fn recognize(&self, base64_image: &str) -> Result<String>;
}

/// Recognition service reached over HTTP: `POST {base64_image} -> {result}`.
#[derive(Debug, Clone)]
pub struct HttpCaptchaSolver {
	client: reqwest::Client,
	endpoint: Url,
}

impl HttpCaptchaSolver {
	pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
		let endpoint = Url::parse(endpoint).map_err(|e| WmsError::Config(format!("ocr_endpoint {endpoint:?} is not a valid URL: {e}")))?;
		let client = reqwest::Client::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| WmsError::Config(format!("failed to create OCR client: {e}")))?;
		Ok(Self { client, endpoint })
	}

	pub fn endpoint(&self) -> &Url {
		&self.endpoint
	}
}

#[async_trait]
impl CaptchaSolver for HttpCaptchaSolver {
	async fn recognize(&self, base64_image: &str) -> Result<String> {
		let body = OcrRequest::new(strip_data_uri_prefix(base64_image));
		let response = self
			.client
			.post(self.endpoint.clone())
			.json(&body)
			.send()
			.await
			.map_err(|e| WmsError::Captcha(format!("request to {} failed: {e}", self.endpoint)))?;

		let status = response.status();
		if !status.is_success() {
			return Err(WmsError::Captcha(format!("recognition service returned status {}", status.as_u16())));
		}

		let parsed: OcrResponse = response
			.json()
			.await
			.map_err(|e| WmsError::Captcha(format!("unreadable recognition response: {e}")))?;

		let text = parsed.result.trim();
		if text.is_empty() {
			return Err(WmsError::Captcha("recognition service returned an empty result".into()));
		}
		debug!(target = "wms.captcha", chars = text.len(), "captcha recognized");
		Ok(text.to_string())
	}
}
