//! Order lifecycle engine.
//!
//! Converts carts into immutable-total orders and enforces the per-role
//! mutation rules. The conversion is the one multi-step write in the
//! system: it reads the cart, writes the order with its line snapshots,
//! and clears the cart inside a single store transaction, so a failure at
//! any point leaves both the cart and the order store untouched.

use crate::policy::{can_perform, crew_may_update_status, order_scope, Action, OrderScope};
use crate::map_store;
use bistro_storage::{Store, StoreTransaction};
use bistro_types::{
	DomainError, Order, OrderItem, OrderPatch, RoleSet, DELIVERY_CREW_GROUP,
};
use rust_decimal::Decimal;
use std::sync::Arc;

pub struct OrderService {
	store: Arc<dyn Store>,
}

impl OrderService {
	pub fn new(store: Arc<dyn Store>) -> Self {
		Self { store }
	}

	/// Converts the caller's cart into a new pending order.
	///
	/// Fails with BadRequest when the cart is empty. The order total is
	/// the sum of the cart line totals; every line becomes an embedded
	/// snapshot and the cart is emptied, all atomically.
	pub async fn create_order(&self, user_id: u64) -> Result<Order, DomainError> {
		let mut tx = self.store.begin().await.map_err(map_store)?;

		let lines = tx.cart_lines(user_id).await.map_err(map_store)?;
		if lines.is_empty() {
			return Err(DomainError::BadRequest("cart is empty".to_string()));
		}

		let total: Decimal = lines.iter().map(|l| l.line_total).sum();
		let items: Vec<OrderItem> = lines.iter().map(OrderItem::from).collect();
		let created_at = chrono::Utc::now().timestamp() as u64;

		let order = tx
			.insert_order(user_id, total, created_at, items)
			.await
			.map_err(map_store)?;
		tx.clear_cart(user_id).await.map_err(map_store)?;
		tx.commit().await.map_err(map_store)?;

		tracing::info!(order_id = order.id, user_id, total = %order.total, "Order created");
		Ok(order)
	}

	/// Lists orders visible to the requester.
	///
	/// Managers see all orders, delivery crew the orders assigned to
	/// them, everyone else the orders they placed.
	pub async fn list_orders(
		&self,
		roles: RoleSet,
		principal_id: u64,
	) -> Result<Vec<Order>, DomainError> {
		let tx = self.store.begin().await.map_err(map_store)?;
		match order_scope(roles, principal_id) {
			OrderScope::All => tx.list_orders().await,
			OrderScope::AssignedTo(crew_id) => tx.orders_for_crew(crew_id).await,
			OrderScope::PlacedBy(user_id) => tx.orders_for_user(user_id).await,
		}
		.map_err(map_store)
	}

	/// Fetches one order within the requester's visibility scope.
	///
	/// An order outside the scope yields the same NotFound as an absent
	/// id, so callers cannot probe for other users' orders.
	pub async fn get_order(
		&self,
		roles: RoleSet,
		principal_id: u64,
		order_id: u64,
	) -> Result<Order, DomainError> {
		let tx = self.store.begin().await.map_err(map_store)?;
		let order = tx
			.get_order(order_id)
			.await
			.map_err(map_store)?
			.ok_or(DomainError::NotFound)?;

		if !order_scope(roles, principal_id).includes(&order) {
			return Err(DomainError::NotFound);
		}
		Ok(order)
	}

	/// Applies a partial update, dispatched by role.
	///
	/// Managers may change status and crew assignment; the assignee must
	/// actually be in the Delivery Crew group. The assigned crew member
	/// may change status and nothing else; a patch carrying any other
	/// field is rejected outright rather than partially applied.
	pub async fn update_order(
		&self,
		roles: RoleSet,
		principal_id: u64,
		order_id: u64,
		patch: OrderPatch,
	) -> Result<Order, DomainError> {
		let mut tx = self.store.begin().await.map_err(map_store)?;
		let mut order = tx
			.get_order(order_id)
			.await
			.map_err(map_store)?
			.ok_or(DomainError::NotFound)?;

		// Manager branch first: a dual-role principal gets the wider rules.
		if can_perform(roles, Action::OrderFullUpdate) {
			apply_manager_patch(tx.as_mut(), &mut order, &patch).await?;
		} else if roles.delivery_crew {
			if patch.touches_non_status() {
				return Err(DomainError::Forbidden);
			}
			if !crew_may_update_status(roles, principal_id, &order) {
				return Err(DomainError::Forbidden);
			}
			let status = patch
				.status()
				.map_err(DomainError::BadRequest)?
				.ok_or(DomainError::Forbidden)?;
			order.status = status;
		} else {
			return Err(DomainError::Forbidden);
		}

		tx.update_order(order.clone()).await.map_err(map_store)?;
		tx.commit().await.map_err(map_store)?;

		tracing::info!(order_id, status = %order.status, "Order updated");
		Ok(order)
	}

	/// Deletes an order and its embedded items. Manager only.
	pub async fn delete_order(&self, roles: RoleSet, order_id: u64) -> Result<(), DomainError> {
		if !can_perform(roles, Action::OrderDelete) {
			return Err(DomainError::Forbidden);
		}

		let mut tx = self.store.begin().await.map_err(map_store)?;
		tx.delete_order(order_id).await.map_err(map_store)?;
		tx.commit().await.map_err(map_store)?;

		tracing::info!(order_id, "Order deleted");
		Ok(())
	}
}

/// Applies a Manager patch to the order in place.
async fn apply_manager_patch(
	tx: &mut dyn StoreTransaction,
	order: &mut Order,
	patch: &OrderPatch,
) -> Result<(), DomainError> {
	for key in patch.keys() {
		if !OrderPatch::MANAGER_FIELDS.contains(&key) {
			return Err(DomainError::BadRequest(format!(
				"field '{}' cannot be updated",
				key
			)));
		}
	}

	if let Some(status) = patch.status().map_err(DomainError::BadRequest)? {
		order.status = status;
	}

	if let Some(assignment) = patch.delivery_crew_id().map_err(DomainError::BadRequest)? {
		if let Some(crew_id) = assignment {
			let in_crew = tx
				.is_member(DELIVERY_CREW_GROUP, crew_id)
				.await
				.map_err(map_store)?;
			if !in_crew {
				return Err(DomainError::BadRequest(format!(
					"user {} is not in the Delivery Crew group",
					crew_id
				)));
			}
		}
		order.delivery_crew_id = assignment;
	}

	Ok(())
}
