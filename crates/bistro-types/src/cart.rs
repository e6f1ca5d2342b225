//! Cart line items and their snapshot-pricing rules.

use crate::DomainError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A pending line item in a user's cart.
///
/// Uniquely keyed by (user_id, menuitem_id): re-adding the same menu item
/// merges into the existing line instead of duplicating it. The unit price
/// is a snapshot of the catalog price at first add; later catalog price
/// changes do not touch pending carts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
	/// Owning user. Carts are strictly identity-scoped.
	pub user_id: u64,
	/// The menu item this line refers to.
	pub menuitem_id: u64,
	/// Positive quantity. Merging accumulates here.
	pub quantity: u32,
	/// Price snapshot taken when the line was first created.
	pub unit_price: Decimal,
	/// unit_price x quantity, recomputed on merge.
	pub line_total: Decimal,
}

impl CartLine {
	/// Builds a fresh line with the total derived from the snapshot price.
	pub fn new(user_id: u64, menuitem_id: u64, quantity: u32, unit_price: Decimal) -> Self {
		Self {
			user_id,
			menuitem_id,
			quantity,
			unit_price,
			line_total: unit_price * Decimal::from(quantity),
		}
	}

	/// Accumulates quantity onto this line, keeping the original price
	/// snapshot and recomputing the line total from it. Fails when the
	/// accumulated quantity would overflow, leaving the line unchanged.
	pub fn merge_quantity(&mut self, additional: u32) -> Result<(), DomainError> {
		self.quantity = self.quantity.checked_add(additional).ok_or_else(|| {
			DomainError::BadRequest("quantity too large".to_string())
		})?;
		self.line_total = self.unit_price * Decimal::from(self.quantity);
		Ok(())
	}
}

/// Request body for adding a menu item to the caller's cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddToCartRequest {
	pub menuitem_id: u64,
	/// Defaults to 1 when omitted.
	pub quantity: Option<u32>,
}
