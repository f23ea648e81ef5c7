//! In-process mock of the warehouse portal and the captcha recognition service.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::net::TcpListener;
use wms::{ConfigStore, JsonConfigStore, PortalConfig, RetryPolicy, SessionManager, Transport};

pub const USER_INFO: &str = "/api/user/getUserInfo";
pub const CAPTCHA: &str = "/api/login/captcha";
pub const LOGIN: &str = "/api/login/authenticate";
pub const LIST: &str = "/api/tenant/outbound/pickupwave/listWaitingPickOrder";
pub const WAVE: &str = "/api/tenant/outbound/pickupwave/createPickupWave";
pub const OCR: &str = "/ocr";

/// Text the portal expects for every captcha it issues.
pub const CAPTCHA_TEXT: &str = "ab12";
pub const OLD_TOKEN: &str = "expired-token";
pub const NEW_TOKEN: &str = "fresh-token";

/// One request as seen by the mock.
#[derive(Debug, Clone)]
pub struct Call {
	pub path: String,
	pub query: Vec<(String, String)>,
	pub authorization: Option<String>,
	pub referer: Option<String>,
	pub cookie: Option<String>,
	pub body: Option<Value>,
}

impl Call {
	pub fn query_values(&self, key: &str) -> Vec<&str> {
		self.query.iter().filter(|(k, _)| k == key).map(|(_, v)| v.as_str()).collect()
	}

	pub fn query_value(&self, key: &str) -> Option<&str> {
		self.query_values(key).first().copied()
	}
}

/// Scripted portal behaviour plus a log of every call.
pub struct PortalState {
	/// Bearer tokens the identity endpoint accepts.
	pub valid_tokens: Mutex<Vec<String>>,
	/// Answers handed out by the OCR service, in order. Falls back to
	/// [`CAPTCHA_TEXT`] once drained.
	pub ocr_answers: Mutex<VecDeque<String>>,
	pub issued_token: String,
	pub total: Mutex<u64>,
	pub orders: Mutex<Value>,
	pub wave_id: i64,
	/// `errorMessage` for a failing `createPickupWave`.
	pub wave_error: Mutex<Option<String>>,
	/// Raw `(status, body)` answers that replace the normal handler for a path.
	pub overrides: Mutex<HashMap<String, (StatusCode, String)>>,
	pub calls: Mutex<Vec<Call>>,
}

impl Default for PortalState {
	fn default() -> Self {
		Self {
			valid_tokens: Mutex::new(Vec::new()),
			ocr_answers: Mutex::new(VecDeque::new()),
			issued_token: NEW_TOKEN.to_string(),
			total: Mutex::new(0),
			orders: Mutex::new(json!([])),
			wave_id: 42,
			wave_error: Mutex::new(None),
			overrides: Mutex::new(HashMap::new()),
			calls: Mutex::new(Vec::new()),
		}
	}
}

impl PortalState {
	pub fn accept_token(&self, token: &str) {
		self.valid_tokens.lock().unwrap().push(token.to_string());
	}

	pub fn script_ocr<I: IntoIterator<Item = &'static str>>(&self, answers: I) {
		self.ocr_answers.lock().unwrap().extend(answers.into_iter().map(str::to_string));
	}

	pub fn set_waiting(&self, total: u64, orders: Value) {
		*self.total.lock().unwrap() = total;
		*self.orders.lock().unwrap() = orders;
	}

	pub fn override_path(&self, path: &str, status: StatusCode, body: &str) {
		self.overrides.lock().unwrap().insert(path.to_string(), (status, body.to_string()));
	}

	pub fn calls_to(&self, path: &str) -> Vec<Call> {
		self.calls.lock().unwrap().iter().filter(|c| c.path == path).cloned().collect()
	}

	pub fn count(&self, path: &str) -> usize {
		self.calls_to(path).len()
	}
}

pub struct MockPortal {
	pub addr: SocketAddr,
	pub state: Arc<PortalState>,
}

impl MockPortal {
	pub async fn start(state: PortalState) -> Self {
		let state = Arc::new(state);
		let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
		let addr = listener.local_addr().unwrap();
		let app = Router::new().fallback(handle).with_state(state.clone());
		tokio::spawn(async move {
			axum::serve(listener, app).await.unwrap();
		});
		Self { addr, state }
	}

	pub fn base_url(&self) -> String {
		format!("http://{}", self.addr)
	}

	pub fn config(&self, token: &str) -> PortalConfig {
		PortalConfig {
			account: "operator".into(),
			password: "secret".into(),
			access_token: token.into(),
			warehouse_id: "WH-1".into(),
			customer_ids: vec!["1001".into()],
			ocr_endpoint: format!("{}{OCR}", self.base_url()),
			base_url: self.base_url(),
			..Default::default()
		}
	}
}

/// A portal plus a config file on disk.
pub struct Harness {
	pub portal: MockPortal,
	pub dir: TempDir,
}

impl Harness {
	pub async fn start(state: PortalState) -> Self {
		Self {
			portal: MockPortal::start(state).await,
			dir: tempfile::tempdir().unwrap(),
		}
	}

	pub fn state(&self) -> &PortalState {
		&self.portal.state
	}

	pub fn config_path(&self) -> PathBuf {
		self.dir.path().join("config.json")
	}

	/// Session manager with no transport back-off.
	pub fn sessions(&self, config: PortalConfig) -> SessionManager {
		self.sessions_with_store(config, JsonConfigStore::new(self.config_path()))
	}

	pub fn sessions_with_store(&self, config: PortalConfig, store: impl ConfigStore + 'static) -> SessionManager {
		let transport = Transport::new(&config).unwrap().with_policy(RetryPolicy::immediate(2));
		SessionManager::with_transport(config, transport, store)
	}

	pub fn counting_store(&self) -> Arc<CountingStore> {
		Arc::new(CountingStore {
			inner: JsonConfigStore::new(self.config_path()),
			saves: AtomicUsize::new(0),
		})
	}

	/// Config as currently persisted, if it was ever written.
	pub fn persisted(&self) -> Option<PortalConfig> {
		if !self.config_path().exists() {
			return None;
		}
		Some(JsonConfigStore::new(self.config_path()).load().unwrap())
	}
}

/// File-backed store that counts writes.
pub struct CountingStore {
	inner: JsonConfigStore,
	saves: AtomicUsize,
}

impl CountingStore {
	pub fn saves(&self) -> usize {
		self.saves.load(Ordering::SeqCst)
	}
}

impl ConfigStore for CountingStore {
	fn load(&self) -> wms::Result<PortalConfig> {
		self.inner.load()
	}

	fn save(&self, config: &PortalConfig) -> wms::Result<()> {
		self.saves.fetch_add(1, Ordering::SeqCst);
		self.inner.save(config)
	}
}

/// An address nothing listens on.
pub async fn closed_addr() -> SocketAddr {
	let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
	listener.local_addr().unwrap()
}

async fn handle(State(state): State<Arc<PortalState>>, uri: Uri, headers: HeaderMap, body: Bytes) -> Response {
	let path = uri.path().to_string();
	let query: Vec<(String, String)> = uri
		.query()
		.map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
		.unwrap_or_default();
	let header_value = |name: header::HeaderName| headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string);
	let call = Call {
		path: path.clone(),
		query,
		authorization: header_value(header::AUTHORIZATION),
		referer: header_value(header::REFERER),
		cookie: header_value(header::COOKIE),
		body: serde_json::from_slice(&body).ok(),
	};
	state.calls.lock().unwrap().push(call.clone());

	if let Some((status, raw)) = state.overrides.lock().unwrap().get(&path).cloned() {
		return (status, raw).into_response();
	}

	let reply = match path.as_str() {
		USER_INFO => {
			let token = call.authorization.as_deref().and_then(|v| v.strip_prefix("Bearer "));
			let accepted = token.is_some_and(|t| state.valid_tokens.lock().unwrap().iter().any(|v| v == t));
			if accepted {
				json!({ "success": true, "data": { "username": "operator" } })
			} else {
				json!({ "success": false, "errorMessage": "token expired" })
			}
		}
		CAPTCHA => {
			let n = state.count(CAPTCHA);
			json!({ "success": true, "data": { "uuid": format!("uuid-{n}"), "img": "data:image/png;base64,aW1hZ2U=" } })
		}
		OCR => {
			let answer = state.ocr_answers.lock().unwrap().pop_front().unwrap_or_else(|| CAPTCHA_TEXT.to_string());
			json!({ "result": answer })
		}
		LOGIN => {
			let captcha = call.body.as_ref().and_then(|b| b.get("captcha")).and_then(Value::as_str);
			if captcha == Some(CAPTCHA_TEXT) {
				state.accept_token(&state.issued_token);
				json!({ "success": true, "data": { "token": state.issued_token } })
			} else {
				json!({ "success": false, "errorMessage": "captcha mismatch", "data": null })
			}
		}
		LIST => {
			json!({ "success": true, "data": state.orders.lock().unwrap().clone(), "total": *state.total.lock().unwrap() })
		}
		WAVE => match state.wave_error.lock().unwrap().clone() {
			Some(message) => json!({ "success": false, "errorMessage": message }),
			None => json!({ "success": true, "data": { "id": state.wave_id } }),
		},
		_ => return (StatusCode::NOT_FOUND, "not found").into_response(),
	};
	axum::Json(reply).into_response()
}
