//! Menu catalog record types.
//!
//! Menu items are owned by the catalog store and are read-only from the
//! order core's perspective: cart lines snapshot the price at add time and
//! never re-read it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single item on the menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
	/// Unique identifier, allocated by the store.
	pub id: u64,
	/// Display title.
	pub title: String,
	/// Current unit price. Always positive.
	pub price: Decimal,
	/// Category the item is listed under (e.g. "mains", "desserts").
	pub category: String,
}

/// Payload for creating or replacing a menu item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItemDraft {
	pub title: String,
	pub price: Decimal,
	pub category: String,
}

/// Partial update to a menu item; absent fields keep their current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MenuItemPatch {
	pub title: Option<String>,
	pub price: Option<Decimal>,
	pub category: Option<String>,
}
