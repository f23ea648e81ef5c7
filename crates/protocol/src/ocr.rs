//! Captcha recognition service payloads.

use serde::{Deserialize, Serialize};

/// Request body: `{ "base64_image": "..." }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrRequest {
	pub base64_image: String,
}

impl OcrRequest {
	pub fn new(base64_image: impl Into<String>) -> Self {
		Self {
			base64_image: base64_image.into(),
		}
	}
}

/// Response body: `{ "result": "..." }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OcrResponse {
	#[serde(default)]
	pub result: String,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn missing_result_defaults_to_empty() {
		let resp: OcrResponse = serde_json::from_str("{}").unwrap();
		assert!(resp.result.is_empty());
	}
}
