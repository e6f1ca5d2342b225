//! Order and order-item records used throughout the order lifecycle.
//!
//! An order is created only by converting a non-empty cart. Its total and
//! line snapshots are fixed at creation; afterwards only Managers (any
//! field) and the assigned Delivery Crew member (status only) may touch it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::CartLine;

/// A durable order record with its embedded line snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
	/// Unique identifier, allocated by the store.
	pub id: u64,
	/// The customer who placed the order.
	pub user_id: u64,
	/// Delivery crew member assigned by a Manager, if any.
	pub delivery_crew_id: Option<u64>,
	/// Current fulfillment status.
	pub status: OrderStatus,
	/// Sum of line totals at creation time. Never recomputed.
	pub total: Decimal,
	/// Unix timestamp (seconds) of creation.
	pub created_at: u64,
	/// Line snapshots copied from the cart at conversion time.
	pub items: Vec<OrderItem>,
}

/// An immutable line snapshot inside an order.
///
/// Copied verbatim from the cart line at conversion time; deleting the
/// order deletes its items with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
	pub menuitem_id: u64,
	pub quantity: u32,
	pub unit_price: Decimal,
	pub line_total: Decimal,
}

impl From<&CartLine> for OrderItem {
	fn from(line: &CartLine) -> Self {
		Self {
			menuitem_id: line.menuitem_id,
			quantity: line.quantity,
			unit_price: line.unit_price,
			line_total: line.line_total,
		}
	}
}

/// Fulfillment status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
	/// Placed, not yet delivered (includes out-for-delivery).
	Pending,
	/// Marked delivered by the assigned crew member or a Manager.
	Delivered,
}

impl fmt::Display for OrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			OrderStatus::Pending => write!(f, "pending"),
			OrderStatus::Delivered => write!(f, "delivered"),
		}
	}
}

/// A partial update to an order, as submitted over the API.
///
/// The raw key set is preserved so the core can reject, rather than
/// silently drop, fields the caller is not allowed to change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderPatch(pub serde_json::Map<String, serde_json::Value>);

impl OrderPatch {
	/// Field names a Manager patch may carry.
	pub const MANAGER_FIELDS: [&'static str; 2] = ["status", "delivery_crew_id"];

	/// Returns the keys present in the patch.
	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.0.keys().map(String::as_str)
	}

	/// True if the patch touches any field other than `status`.
	pub fn touches_non_status(&self) -> bool {
		self.keys().any(|k| k != "status")
	}

	/// Parses the `status` field, if present.
	pub fn status(&self) -> Result<Option<OrderStatus>, String> {
		match self.0.get("status") {
			None => Ok(None),
			Some(v) => serde_json::from_value(v.clone())
				.map(Some)
				.map_err(|e| format!("invalid status: {}", e)),
		}
	}

	/// Parses the `delivery_crew_id` field, if present. An explicit JSON
	/// null clears the assignment.
	pub fn delivery_crew_id(&self) -> Result<Option<Option<u64>>, String> {
		match self.0.get("delivery_crew_id") {
			None => Ok(None),
			Some(serde_json::Value::Null) => Ok(Some(None)),
			Some(v) => serde_json::from_value(v.clone())
				.map(|id| Some(Some(id)))
				.map_err(|e| format!("invalid delivery_crew_id: {}", e)),
		}
	}
}
