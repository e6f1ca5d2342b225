//! Per-user cart operations with snapshot pricing.
//!
//! Cart access is identity-scoped only: every operation here acts on the
//! authenticated caller's own cart, and no role grants access to anyone
//! else's. The role-based policy module is deliberately not consulted.

use crate::map_store;
use bistro_storage::Store;
use bistro_types::{AddToCartRequest, CartLine, DomainError};
use std::sync::Arc;

pub struct CartService {
	store: Arc<dyn Store>,
}

impl CartService {
	pub fn new(store: Arc<dyn Store>) -> Self {
		Self { store }
	}

	/// Lists the caller's cart lines in insertion order.
	pub async fn list_cart(&self, user_id: u64) -> Result<Vec<CartLine>, DomainError> {
		let tx = self.store.begin().await.map_err(map_store)?;
		tx.cart_lines(user_id).await.map_err(map_store)
	}

	/// Adds a menu item to the caller's cart.
	///
	/// The unit price is snapshotted from the catalog now; re-adding an
	/// item already in the cart accumulates quantity onto the existing
	/// line and keeps its original snapshot.
	pub async fn add_to_cart(
		&self,
		user_id: u64,
		request: AddToCartRequest,
	) -> Result<CartLine, DomainError> {
		let quantity = request.quantity.unwrap_or(1);
		if quantity == 0 {
			return Err(DomainError::BadRequest(
				"quantity must be positive".to_string(),
			));
		}

		let mut tx = self.store.begin().await.map_err(map_store)?;
		let item = tx
			.get_menu_item(request.menuitem_id)
			.await
			.map_err(map_store)?
			.ok_or(DomainError::NotFound)?;

		let existing = tx
			.cart_lines(user_id)
			.await
			.map_err(map_store)?
			.into_iter()
			.find(|l| l.menuitem_id == item.id);

		let line = match existing {
			Some(mut line) => {
				line.merge_quantity(quantity)?;
				line
			}
			None => CartLine::new(user_id, item.id, quantity, item.price),
		};

		tx.put_cart_line(line.clone()).await.map_err(map_store)?;
		tx.commit().await.map_err(map_store)?;

		tracing::debug!(
			user_id,
			menuitem_id = line.menuitem_id,
			quantity = line.quantity,
			"Cart line stored"
		);
		Ok(line)
	}

	/// Removes every line from the caller's cart.
	///
	/// Clearing an already-empty cart succeeds with a count of zero.
	pub async fn clear_cart(&self, user_id: u64) -> Result<usize, DomainError> {
		let mut tx = self.store.begin().await.map_err(map_store)?;
		let removed = tx.clear_cart(user_id).await.map_err(map_store)?;
		tx.commit().await.map_err(map_store)?;
		Ok(removed)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::menu::MenuService;
	use bistro_storage::implementations::memory::MemoryStore;
	use bistro_types::{MenuItemDraft, RoleSet};
	use rust_decimal::Decimal;

	async fn fixture() -> (CartService, MenuService, u64) {
		let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
		let menu = MenuService::new(Arc::clone(&store));
		let item = menu
			.create_item(
				RoleSet::MANAGER,
				MenuItemDraft {
					title: "pasta".to_string(),
					price: Decimal::new(1000, 2),
					category: "mains".to_string(),
				},
			)
			.await
			.unwrap();
		(CartService::new(store), menu, item.id)
	}

	fn add(menuitem_id: u64, quantity: Option<u32>) -> AddToCartRequest {
		AddToCartRequest {
			menuitem_id,
			quantity,
		}
	}

	#[tokio::test]
	async fn quantity_defaults_to_one() {
		let (cart, _menu, item_id) = fixture().await;
		let line = cart.add_to_cart(1, add(item_id, None)).await.unwrap();
		assert_eq!(line.quantity, 1);
		assert_eq!(line.line_total, Decimal::new(1000, 2));
	}

	#[tokio::test]
	async fn unknown_item_is_not_found() {
		let (cart, _menu, _item_id) = fixture().await;
		assert_eq!(
			cart.add_to_cart(1, add(999, Some(1))).await,
			Err(DomainError::NotFound)
		);
		assert!(cart.list_cart(1).await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn re_adding_merges_by_key() {
		let (cart, _menu, item_id) = fixture().await;
		cart.add_to_cart(1, add(item_id, Some(2))).await.unwrap();
		let line = cart.add_to_cart(1, add(item_id, Some(3))).await.unwrap();

		assert_eq!(line.quantity, 5);
		let lines = cart.list_cart(1).await.unwrap();
		assert_eq!(lines.len(), 1);
		assert_eq!(lines[0].line_total, Decimal::new(5000, 2));
	}

	#[tokio::test]
	async fn price_snapshot_survives_catalog_change() {
		let (cart, menu, item_id) = fixture().await;
		cart.add_to_cart(1, add(item_id, Some(2))).await.unwrap();

		menu.update_item(
			RoleSet::MANAGER,
			item_id,
			MenuItemDraft {
				title: "pasta".to_string(),
				price: Decimal::new(9900, 2),
				category: "mains".to_string(),
			},
		)
		.await
		.unwrap();

		let lines = cart.list_cart(1).await.unwrap();
		assert_eq!(lines[0].unit_price, Decimal::new(1000, 2));
		assert_eq!(lines[0].line_total, Decimal::new(2000, 2));
	}

	#[tokio::test]
	async fn carts_are_per_user() {
		let (cart, _menu, item_id) = fixture().await;
		cart.add_to_cart(1, add(item_id, Some(1))).await.unwrap();
		assert!(cart.list_cart(2).await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn clear_is_idempotent() {
		let (cart, _menu, item_id) = fixture().await;
		cart.add_to_cart(1, add(item_id, Some(1))).await.unwrap();

		assert_eq!(cart.clear_cart(1).await.unwrap(), 1);
		assert_eq!(cart.clear_cart(1).await.unwrap(), 0);
	}

	#[tokio::test]
	async fn overflowing_merge_is_rejected() {
		let (cart, _menu, item_id) = fixture().await;
		cart.add_to_cart(1, add(item_id, Some(u32::MAX))).await.unwrap();

		assert!(matches!(
			cart.add_to_cart(1, add(item_id, Some(1))).await,
			Err(DomainError::BadRequest(_))
		));

		// The stored line keeps its pre-merge quantity.
		let lines = cart.list_cart(1).await.unwrap();
		assert_eq!(lines[0].quantity, u32::MAX);
	}

	#[tokio::test]
	async fn zero_quantity_is_rejected() {
		let (cart, _menu, item_id) = fixture().await;
		assert!(matches!(
			cart.add_to_cart(1, add(item_id, Some(0))).await,
			Err(DomainError::BadRequest(_))
		));
	}
}
