//! The outbound wave workflow: make sure the session is usable, look for
//! waiting pick orders, and batch them into one pickup wave.

use serde_json::Value;
use tracing::{info, warn};
use wms_protocol::{
	CREATE_PICKUP_WAVE_PATH, LIST_WAITING_PICK_ORDER_PATH, PickOrder, PickOrderQuery, PickOrderSearchBody, PickupWave, PickupWaveRequest,
	WaitingPickOrders,
};

use crate::auth::{AuthenticationFlow, LoginOutcome};
use crate::error::{Result, WmsError};
use crate::session::SessionManager;
use crate::transport::{PortalRequest, decode_success, require_data};

/// How the session was made usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
	/// The persisted token was accepted.
	Valid,
	/// The token was rejected and a fresh login succeeded.
	Renewed(LoginOutcome),
}

/// Outcome of one [`WorkflowOrchestrator::run`].
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
	pub session: SessionStatus,
	/// Server-side count of waiting pick orders.
	pub total: u64,
	/// Present only when `total > 0`.
	pub wave: Option<PickupWave>,
}

pub struct WorkflowOrchestrator<'a> {
	sessions: SessionManager,
	auth: Option<AuthenticationFlow<'a>>,
}

impl<'a> WorkflowOrchestrator<'a> {
	/// An orchestrator without login capability; an expired session is fatal.
	pub fn new(sessions: SessionManager) -> Self {
		Self { sessions, auth: None }
	}

	pub fn with_auth(mut self, auth: AuthenticationFlow<'a>) -> Self {
		self.auth = Some(auth);
		self
	}

	pub fn sessions(&self) -> &SessionManager {
		&self.sessions
	}

	pub fn into_sessions(self) -> SessionManager {
		self.sessions
	}

	/// Validates the session and logs in again when the portal rejects it.
	///
	/// Transport failures from validation are returned as-is: they say nothing
	/// about the token, and logging in over the same dead link would fail too.
	pub async fn ensure_session(&mut self) -> Result<SessionStatus> {
		let reason = match self.sessions.validate_session().await {
			Ok(()) => return Ok(SessionStatus::Valid),
			Err(WmsError::SessionInvalid(reason)) => reason,
			Err(err) => return Err(err),
		};

		let Some(auth) = &self.auth else {
			return Err(WmsError::SessionInvalid(reason));
		};
		info!(target = "wms.workflow", %reason, "session invalid, logging in");
		let outcome = auth.authenticate(&mut self.sessions).await?;
		Ok(SessionStatus::Renewed(outcome))
	}

	/// Fetches one page of pick orders waiting for a wave.
	pub async fn get_waiting_pick_orders(&self, page: u32, page_size: u32, customer_ids: &[String]) -> Result<WaitingPickOrders> {
		self.warn_if_unscoped(LIST_WAITING_PICK_ORDER_PATH, customer_ids);

		let query = PickOrderQuery {
			current: page.max(1),
			page_size: page_size.max(1),
			warehouse_id: self.sessions.session().warehouse_id().to_string(),
			customer_ids: customer_ids.to_vec(),
		};
		let request = PortalRequest::post(LIST_WAITING_PICK_ORDER_PATH)
			.query(query.to_query_pairs())
			.json(&PickOrderSearchBody::default())?;

		let envelope = decode_success::<Value>(self.sessions.transport().send(&request).await?, LIST_WAITING_PICK_ORDER_PATH)?;
		let orders = orders_from_payload(envelope.data)?;
		let total = envelope.total.unwrap_or(orders.len() as u64);
		Ok(WaitingPickOrders { total, orders })
	}

	/// Creates a pickup wave. `success=false` is a [`WmsError::Business`] error.
	pub async fn create_pickup_wave(&self, request: &PickupWaveRequest) -> Result<PickupWave> {
		self.warn_if_unscoped(CREATE_PICKUP_WAVE_PATH, &request.customer_ids);

		let call = PortalRequest::post(CREATE_PICKUP_WAVE_PATH).query(request.to_query_pairs());
		let payload: Value = require_data(self.sessions.transport().send(&call).await?, CREATE_PICKUP_WAVE_PATH)?;
		wave_from_payload(payload)
	}

	/// Wave request for every waiting order in the session's scope, using the
	/// configured wave settings.
	pub fn wave_request(&self) -> PickupWaveRequest {
		let settings = &self.sessions.config().wave;
		let session = self.sessions.session();
		PickupWaveRequest {
			is_all: true,
			pickup_type: settings.pickup_type,
			is_outbound: settings.is_outbound,
			warehouse_id: session.warehouse_id().to_string(),
			customer_ids: session.customer_ids().to_vec(),
			remark: settings.remark.clone(),
		}
	}

	/// One full cycle. Zero waiting orders is a successful run without a wave.
	pub async fn run(&mut self) -> Result<RunReport> {
		let session = self.ensure_session().await?;

		let page_size = self.sessions.config().wave.page_size;
		let customer_ids = self.sessions.session().customer_ids().to_vec();
		let waiting = self.get_waiting_pick_orders(1, page_size, &customer_ids).await?;
		info!(target = "wms.workflow", total = waiting.total, fetched = waiting.orders.len(), "waiting pick orders");

		if waiting.total == 0 {
			info!(target = "wms.workflow", "no waiting pick orders, nothing to do");
			return Ok(RunReport {
				session,
				total: 0,
				wave: None,
			});
		}

		let wave = self.create_pickup_wave(&self.wave_request()).await?;
		info!(target = "wms.workflow", wave_id = wave.id, total = waiting.total, "pickup wave created");
		Ok(RunReport {
			session,
			total: waiting.total,
			wave: Some(wave),
		})
	}

	fn warn_if_unscoped(&self, endpoint: &str, customer_ids: &[String]) {
		if customer_ids.is_empty() {
			warn!(target = "wms.workflow", %endpoint, "no customer ids configured; request is not scoped to any customer");
		}
	}
}

// The list endpoint answers with a bare array, but some tenants wrap the page
// in `{records: [...]}` or `{list: [...]}`.
fn orders_from_payload(data: Option<Value>) -> Result<Vec<PickOrder>> {
	let items = match data {
		None => return Ok(Vec::new()),
		Some(Value::Array(items)) => items,
		Some(Value::Object(mut page)) => match page.remove("records").or_else(|| page.remove("list")) {
			Some(Value::Array(items)) => items,
			Some(Value::Null) | None => Vec::new(),
			Some(_) => return Err(unexpected_orders_shape()),
		},
		Some(_) => return Err(unexpected_orders_shape()),
	};

	items
		.into_iter()
		.map(|item| match item {
			Value::Object(fields) => Ok(PickOrder(fields)),
			_ => Err(unexpected_orders_shape()),
		})
		.collect()
}

// The wave id arrives either as `{id: N}` or as the bare number.
fn wave_from_payload(data: Value) -> Result<PickupWave> {
	let id = match &data {
		Value::Number(_) => data.as_i64(),
		Value::Object(fields) => fields.get("id").and_then(Value::as_i64),
		_ => None,
	};
	id.map(|id| PickupWave { id })
		.ok_or_else(|| WmsError::protocol(CREATE_PICKUP_WAVE_PATH, None, format!("unexpected wave payload: {data}")))
}

fn unexpected_orders_shape() -> WmsError {
	WmsError::protocol(LIST_WAITING_PICK_ORDER_PATH, None, "pick order payload is neither a list nor a page of records")
}
