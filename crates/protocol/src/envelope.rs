//! Uniform response envelope returned by every portal endpoint.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `{success, errorMessage, data, total}` wrapper around an endpoint payload.
///
/// Transport decodes bodies as `Envelope<Value>` first; endpoints then call
/// [`Envelope::decode`] to obtain their typed payload. Failed responses often
/// carry a `data` shape that differs from the success shape, so decoding the
/// payload is deferred until `success` is known.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T = Value> {
	pub success: bool,
	#[serde(default)]
	pub error_message: Option<String>,
	#[serde(default)]
	pub data: Option<T>,
	#[serde(default)]
	pub total: Option<u64>,
}

impl<T> Envelope<T> {
	/// Server-provided error message, or a placeholder when none was sent.
	pub fn message(&self) -> &str {
		match self.error_message.as_deref() {
			Some(msg) if !msg.trim().is_empty() => msg,
			_ => "no error message",
		}
	}
}

impl Envelope<Value> {
	/// Decodes the raw payload into `T`, keeping the outer fields.
	///
	/// A `null` payload decodes to `None`.
	pub fn decode<T: DeserializeOwned>(self) -> Result<Envelope<T>, serde_json::Error> {
		let data = match self.data {
			None | Some(Value::Null) => None,
			Some(value) => Some(serde_json::from_value(value)?),
		};
		Ok(Envelope {
			success: self.success,
			error_message: self.error_message,
			data,
			total: self.total,
		})
	}
}
