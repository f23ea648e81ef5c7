//! Outbound pick-order query and pickup-wave payloads.
//!
//! Both endpoints take their parameters in the query string. Customer scoping
//! is encoded as one repeated `customerIds[]` entry per id.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Lists pick orders waiting to be batched into a wave.
pub const LIST_WAITING_PICK_ORDER_PATH: &str = "/api/tenant/outbound/pickupwave/listWaitingPickOrder";
/// Creates a pickup wave from waiting pick orders.
pub const CREATE_PICKUP_WAVE_PATH: &str = "/api/tenant/outbound/pickupwave/createPickupWave";

/// Repeated query key carrying one customer id per entry.
pub const CUSTOMER_IDS_KEY: &str = "customerIds[]";

/// Ordered query-string pairs; keys may repeat.
pub type QueryPairs = Vec<(String, String)>;

fn push_customer_ids(pairs: &mut QueryPairs, customer_ids: &[String]) {
	pairs.extend(customer_ids.iter().map(|id| (CUSTOMER_IDS_KEY.to_string(), id.clone())));
}

/// Query for `listWaitingPickOrder`.
///
/// Search semantics are fixed by the portal UI: search by reference id,
/// filter by creation time, empty keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickOrderQuery {
	pub current: u32,
	pub page_size: u32,
	pub warehouse_id: String,
	pub customer_ids: Vec<String>,
}

impl PickOrderQuery {
	pub const KEYWORD_TYPE: &'static str = "referenceId";
	pub const TIME_TYPE: &'static str = "createTime";

	pub fn to_query_pairs(&self) -> QueryPairs {
		let mut pairs = vec![
			("current".to_string(), self.current.to_string()),
			("pageSize".to_string(), self.page_size.to_string()),
			("warehouseId".to_string(), self.warehouse_id.clone()),
			("keywordType".to_string(), Self::KEYWORD_TYPE.to_string()),
			("timeType".to_string(), Self::TIME_TYPE.to_string()),
			("keyword".to_string(), String::new()),
		];
		push_customer_ids(&mut pairs, &self.customer_ids);
		pairs
	}
}

/// JSON body sent alongside the pick-order query string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PickOrderSearchBody {
	pub keyword: String,
}

/// A single waiting pick order.
///
/// The portal returns a wide record; fields are kept as-is and exposed
/// through accessors for the handful the bot reports on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PickOrder(pub Map<String, Value>);

impl PickOrder {
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.0.get(key)
	}

	pub fn reference_id(&self) -> Option<&str> {
		self.get("referenceId").and_then(Value::as_str)
	}
}

/// One page of waiting pick orders plus the server-side total.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WaitingPickOrders {
	pub total: u64,
	pub orders: Vec<PickOrder>,
}

/// Query for `createPickupWave`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickupWaveRequest {
	/// Batch every pending order rather than a selection.
	pub is_all: bool,
	pub pickup_type: u32,
	pub is_outbound: bool,
	pub warehouse_id: String,
	pub customer_ids: Vec<String>,
	/// Operator-visible audit tag, opaque to the portal.
	pub remark: String,
}

impl PickupWaveRequest {
	pub fn to_query_pairs(&self) -> QueryPairs {
		let mut pairs = vec![
			("isAll".to_string(), self.is_all.to_string()),
			("pickupType".to_string(), self.pickup_type.to_string()),
			("isOutbound".to_string(), self.is_outbound.to_string()),
			("warehouseId".to_string(), self.warehouse_id.clone()),
			("remark".to_string(), self.remark.clone()),
		];
		push_customer_ids(&mut pairs, &self.customer_ids);
		pairs
	}
}

/// `data` payload of `createPickupWave`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickupWave {
	pub id: i64,
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	fn customer_entries(pairs: &QueryPairs) -> Vec<&str> {
		pairs.iter().filter(|(k, _)| k == CUSTOMER_IDS_KEY).map(|(_, v)| v.as_str()).collect()
	}

	#[test]
	fn pick_order_query_repeats_customer_ids() {
		let query = PickOrderQuery {
			current: 1,
			page_size: 100,
			warehouse_id: "W1".into(),
			customer_ids: vec!["1001".into(), "1002".into()],
		};
		let pairs = query.to_query_pairs();
		assert_eq!(customer_entries(&pairs), vec!["1001", "1002"]);
		assert!(pairs.contains(&("keywordType".into(), "referenceId".into())));
		assert!(pairs.contains(&("timeType".into(), "createTime".into())));
		assert!(pairs.contains(&("keyword".into(), String::new())));
		assert!(pairs.contains(&("warehouseId".into(), "W1".into())));
	}

	#[test]
	fn empty_customer_filter_adds_no_entries() {
		let query = PickOrderQuery {
			current: 1,
			page_size: 20,
			warehouse_id: "W1".into(),
			customer_ids: Vec::new(),
		};
		assert!(customer_entries(&query.to_query_pairs()).is_empty());
	}

	#[test]
	fn wave_request_encodes_flags() {
		let request = PickupWaveRequest {
			is_all: true,
			pickup_type: 1,
			is_outbound: true,
			warehouse_id: "W1".into(),
			customer_ids: vec!["7".into()],
			remark: "[BOT]".into(),
		};
		let pairs = request.to_query_pairs();
		assert!(pairs.contains(&("isAll".into(), "true".into())));
		assert!(pairs.contains(&("pickupType".into(), "1".into())));
		assert!(pairs.contains(&("isOutbound".into(), "true".into())));
		assert!(pairs.contains(&("remark".into(), "[BOT]".into())));
		assert_eq!(customer_entries(&pairs), vec!["7"]);
	}

	#[test]
	fn pick_order_keeps_unknown_fields() {
		let order: PickOrder = serde_json::from_value(json!({ "referenceId": "SO-1", "qty": 3 })).unwrap();
		assert_eq!(order.reference_id(), Some("SO-1"));
		assert_eq!(order.get("qty"), Some(&json!(3)));
	}
}
