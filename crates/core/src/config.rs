//! Persisted portal configuration and its storage.
//!
//! The configuration doubles as the session's durable state: a renewed access
//! token is written back through a [`ConfigStore`] before it is used.

use std::fmt;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{Result, WmsError};

pub const DEFAULT_BASE_URL: &str = "https://wms.dmxsmart.com";
pub const DEFAULT_LANG: &str = "zh-CN";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Remark attached to waves created by this bot.
pub const BOT_REMARK: &str = "[BOT]";

fn default_base_url() -> String {
	DEFAULT_BASE_URL.to_string()
}

fn default_lang() -> String {
	DEFAULT_LANG.to_string()
}

fn default_timeout_secs() -> u64 {
	DEFAULT_TIMEOUT_SECS
}

/// Operator account, portal scope and collaborator endpoints.
#[derive(Clone, Serialize, Deserialize)]
pub struct PortalConfig {
	#[serde(default)]
	pub account: String,
	#[serde(default)]
	pub password: String,
	#[serde(default)]
	pub access_token: String,
	#[serde(default)]
	pub warehouse_id: String,
	#[serde(default, deserialize_with = "string_or_number_ids")]
	pub customer_ids: Vec<String>,
	#[serde(default)]
	pub ocr_endpoint: String,
	#[serde(default)]
	pub debug: bool,
	#[serde(default = "default_base_url")]
	pub base_url: String,
	#[serde(default = "default_timeout_secs")]
	pub timeout_secs: u64,
	#[serde(default = "default_lang")]
	pub lang: String,
	/// PEM-encoded RSA public key used to encrypt the password; the portal's
	/// published key is used when unset.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub public_key_pem: Option<String>,
	#[serde(default)]
	pub wave: WaveSettings,
}

impl Default for PortalConfig {
	fn default() -> Self {
		Self {
			account: String::new(),
			password: String::new(),
			access_token: String::new(),
			warehouse_id: String::new(),
			customer_ids: Vec::new(),
			ocr_endpoint: String::new(),
			debug: false,
			base_url: default_base_url(),
			timeout_secs: default_timeout_secs(),
			lang: default_lang(),
			public_key_pem: None,
			wave: WaveSettings::default(),
		}
	}
}

impl fmt::Debug for PortalConfig {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("PortalConfig")
			.field("account", &self.account)
			.field("password", &"<redacted>")
			.field("access_token", &if self.access_token.is_empty() { "<empty>" } else { "<redacted>" })
			.field("warehouse_id", &self.warehouse_id)
			.field("customer_ids", &self.customer_ids)
			.field("ocr_endpoint", &self.ocr_endpoint)
			.field("debug", &self.debug)
			.field("base_url", &self.base_url)
			.field("timeout_secs", &self.timeout_secs)
			.field("lang", &self.lang)
			.field("public_key_pem", &self.public_key_pem.is_some())
			.field("wave", &self.wave)
			.finish()
	}
}

impl PortalConfig {
	pub fn timeout(&self) -> Duration {
		Duration::from_secs(self.timeout_secs.max(1))
	}

	/// Checks the fields every portal call depends on.
	pub fn validate(&self) -> Result<()> {
		url::Url::parse(&self.base_url).map_err(|e| WmsError::Config(format!("base_url {:?} is not a valid URL: {e}", self.base_url)))?;
		if self.warehouse_id.trim().is_empty() {
			return Err(WmsError::Config("warehouse_id is required".into()));
		}
		Ok(())
	}

	/// Checks the fields the login flow needs.
	pub fn validate_credentials(&self) -> Result<()> {
		let missing: Vec<&str> = [
			("account", &self.account),
			("password", &self.password),
			("ocr_endpoint", &self.ocr_endpoint),
		]
		.into_iter()
		.filter(|(_, value)| value.trim().is_empty())
		.map(|(name, _)| name)
		.collect();

		if missing.is_empty() {
			Ok(())
		} else {
			Err(WmsError::Config(format!("missing login settings: {}", missing.join(", "))))
		}
	}
}

/// Parameters for the wave created by the workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveSettings {
	#[serde(default = "WaveSettings::default_page_size")]
	pub page_size: u32,
	#[serde(default = "WaveSettings::default_pickup_type")]
	pub pickup_type: u32,
	#[serde(default = "WaveSettings::default_is_outbound")]
	pub is_outbound: bool,
	#[serde(default = "WaveSettings::default_remark")]
	pub remark: String,
}

impl WaveSettings {
	fn default_page_size() -> u32 {
		100
	}

	fn default_pickup_type() -> u32 {
		1
	}

	fn default_is_outbound() -> bool {
		true
	}

	fn default_remark() -> String {
		BOT_REMARK.to_string()
	}
}

impl Default for WaveSettings {
	fn default() -> Self {
		Self {
			page_size: Self::default_page_size(),
			pickup_type: Self::default_pickup_type(),
			is_outbound: Self::default_is_outbound(),
			remark: Self::default_remark(),
		}
	}
}

// Older config files list customer ids as numbers.
fn string_or_number_ids<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
	D: Deserializer<'de>,
{
	let raw = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
	raw.into_iter()
		.map(|value| match value {
			Value::String(s) => Ok(s),
			Value::Number(n) => Ok(n.to_string()),
			other => Err(serde::de::Error::custom(format!("customer id must be a string or number, got {other}"))),
		})
		.collect()
}

/// Loads and persists [`PortalConfig`].
pub trait ConfigStore: Send + Sync {
	fn load(&self) -> Result<PortalConfig>;

	/// Persists `config`. Must be durable when it returns `Ok`.
	fn save(&self, config: &PortalConfig) -> Result<()>;
}

impl<T: ConfigStore + ?Sized> ConfigStore for Arc<T> {
	fn load(&self) -> Result<PortalConfig> {
		(**self).load()
	}

	fn save(&self, config: &PortalConfig) -> Result<()> {
		(**self).save(config)
	}
}

/// JSON file store with write-then-rename saves.
#[derive(Debug, Clone)]
pub struct JsonConfigStore {
	path: PathBuf,
}

impl JsonConfigStore {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	fn io_err(&self, source: std::io::Error) -> WmsError {
		WmsError::ConfigIo {
			path: self.path.clone(),
			source,
		}
	}

	fn temp_path(&self) -> PathBuf {
		let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_else(|| DEFAULT_CONFIG_FILE.into());
		name.push(".tmp");
		self.path.with_file_name(name)
	}
}

impl ConfigStore for JsonConfigStore {
	fn load(&self) -> Result<PortalConfig> {
		let content = fs::read_to_string(&self.path).map_err(|e| self.io_err(e))?;
		serde_json::from_str(&content).map_err(|e| WmsError::Config(format!("failed to parse {}: {e}", self.path.display())))
	}

	fn save(&self, config: &PortalConfig) -> Result<()> {
		if let Some(parent) = self.path.parent() {
			if !parent.as_os_str().is_empty() && !parent.exists() {
				fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
			}
		}

		let json = serde_json::to_string_pretty(config)?;
		let tmp_path = self.temp_path();
		let written = File::create(&tmp_path).and_then(|mut tmp| {
			tmp.write_all(json.as_bytes())?;
			tmp.sync_all()?;
			drop(tmp);
			fs::rename(&tmp_path, &self.path)
		});

		// The temp file holds credentials in clear text.
		if let Err(err) = written {
			let _ = fs::remove_file(&tmp_path);
			return Err(self.io_err(err));
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use tempfile::TempDir;

	use super::*;

	#[test]
	fn defaults_fill_missing_fields() {
		let config: PortalConfig = serde_json::from_str(r#"{"account":"op","warehouse_id":"W1"}"#).unwrap();
		assert_eq!(config.base_url, DEFAULT_BASE_URL);
		assert_eq!(config.lang, "zh-CN");
		assert_eq!(config.timeout_secs, 30);
		assert_eq!(config.wave, WaveSettings::default());
		assert_eq!(config.wave.remark, "[BOT]");
		assert!(config.customer_ids.is_empty());
	}

	#[test]
	fn numeric_customer_ids_are_accepted() {
		let config: PortalConfig = serde_json::from_str(r#"{"customer_ids":[1001,"1002"]}"#).unwrap();
		assert_eq!(config.customer_ids, vec!["1001", "1002"]);
	}

	#[test]
	fn debug_output_redacts_secrets() {
		let config = PortalConfig {
			password: "hunter2".into(),
			access_token: "tok-secret".into(),
			..Default::default()
		};
		let rendered = format!("{config:?}");
		assert!(!rendered.contains("hunter2"));
		assert!(!rendered.contains("tok-secret"));
	}

	#[test]
	fn validate_credentials_lists_missing_fields() {
		let config = PortalConfig {
			account: "op".into(),
			..Default::default()
		};
		let err = config.validate_credentials().unwrap_err();
		assert_eq!(err.to_string(), "config error: missing login settings: password, ocr_endpoint");
	}

	#[test]
	fn validate_requires_warehouse() {
		let err = PortalConfig::default().validate().unwrap_err();
		assert!(err.to_string().contains("warehouse_id"));
	}

	#[test]
	fn json_store_round_trips_and_leaves_no_temp_file() {
		let temp = TempDir::new().unwrap();
		let path = temp.path().join("nested").join("config.json");
		let store = JsonConfigStore::new(&path);

		let config = PortalConfig {
			account: "op".into(),
			access_token: "t1".into(),
			warehouse_id: "W1".into(),
			customer_ids: vec!["1001".into()],
			..Default::default()
		};
		store.save(&config).unwrap();

		let loaded = store.load().unwrap();
		assert_eq!(loaded.access_token, "t1");
		assert_eq!(loaded.customer_ids, vec!["1001"]);
		assert!(!temp.path().join("nested").join("config.json.tmp").exists());
	}

	#[test]
	fn failed_save_removes_temp_file() {
		let temp = TempDir::new().unwrap();
		// Renaming a file over a non-empty directory fails.
		let path = temp.path().join("config.json");
		fs::create_dir(&path).unwrap();
		fs::write(path.join("keep"), "x").unwrap();

		let config = PortalConfig {
			password: "hunter2".into(),
			..Default::default()
		};
		let err = JsonConfigStore::new(&path).save(&config).unwrap_err();

		assert!(matches!(err, WmsError::ConfigIo { .. }));
		assert!(!temp.path().join("config.json.tmp").exists());
	}

	#[test]
	fn missing_file_is_config_io_error() {
		let store = JsonConfigStore::new("/definitely/missing/config.json");
		assert!(matches!(store.load(), Err(WmsError::ConfigIo { .. })));
	}

	#[test]
	fn malformed_file_is_config_error() {
		let temp = TempDir::new().unwrap();
		let path = temp.path().join("config.json");
		fs::write(&path, "{not json").unwrap();
		let err = JsonConfigStore::new(&path).load().unwrap_err();
		assert!(matches!(err, WmsError::Config(_)));
	}
}
