//! Staged state shared by the storage backends.
//!
//! Both backends snapshot the whole store state when a transaction begins,
//! apply every write to the snapshot, and hand the snapshot back to the
//! backend on commit. The `Commit` trait is the only backend-specific part.

use crate::{
	CartRepository, CatalogRepository, GroupRepository, OrderRepository, StoreError,
	StoreTransaction, UserRepository,
};
use async_trait::async_trait;
use bistro_types::{CartLine, MenuItem, MenuItemDraft, Order, OrderItem, OrderStatus, User};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The whole durable state of the store.
///
/// Orders and menu items are keyed maps so listings come back in id order;
/// cart lines are a flat vector so per-user listings preserve insertion
/// order; group membership vectors preserve join order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct State {
	next_menu_item_id: u64,
	next_order_id: u64,
	menu_items: BTreeMap<u64, MenuItem>,
	cart_lines: Vec<CartLine>,
	orders: BTreeMap<u64, Order>,
	users: BTreeMap<u64, User>,
	groups: BTreeMap<String, Vec<u64>>,
}

impl Default for State {
	fn default() -> Self {
		Self {
			next_menu_item_id: 1,
			next_order_id: 1,
			menu_items: BTreeMap::new(),
			cart_lines: Vec::new(),
			orders: BTreeMap::new(),
			users: BTreeMap::new(),
			groups: BTreeMap::new(),
		}
	}
}

impl State {
	fn list_menu_items(&self) -> Vec<MenuItem> {
		self.menu_items.values().cloned().collect()
	}

	fn get_menu_item(&self, id: u64) -> Option<MenuItem> {
		self.menu_items.get(&id).cloned()
	}

	fn insert_menu_item(&mut self, draft: MenuItemDraft) -> MenuItem {
		let id = self.next_menu_item_id;
		self.next_menu_item_id += 1;
		let item = MenuItem {
			id,
			title: draft.title,
			price: draft.price,
			category: draft.category,
		};
		self.menu_items.insert(id, item.clone());
		item
	}

	fn update_menu_item(&mut self, item: MenuItem) -> Result<(), StoreError> {
		match self.menu_items.get_mut(&item.id) {
			Some(slot) => {
				*slot = item;
				Ok(())
			}
			None => Err(StoreError::NotFound),
		}
	}

	fn delete_menu_item(&mut self, id: u64) -> Result<(), StoreError> {
		self.menu_items
			.remove(&id)
			.map(|_| ())
			.ok_or(StoreError::NotFound)
	}

	fn cart_lines(&self, user_id: u64) -> Vec<CartLine> {
		self.cart_lines
			.iter()
			.filter(|l| l.user_id == user_id)
			.cloned()
			.collect()
	}

	fn put_cart_line(&mut self, line: CartLine) {
		let key = (line.user_id, line.menuitem_id);
		match self
			.cart_lines
			.iter_mut()
			.find(|l| (l.user_id, l.menuitem_id) == key)
		{
			Some(slot) => *slot = line,
			None => self.cart_lines.push(line),
		}
	}

	fn clear_cart(&mut self, user_id: u64) -> usize {
		let before = self.cart_lines.len();
		self.cart_lines.retain(|l| l.user_id != user_id);
		before - self.cart_lines.len()
	}

	fn insert_order(
		&mut self,
		user_id: u64,
		total: Decimal,
		created_at: u64,
		items: Vec<OrderItem>,
	) -> Order {
		let id = self.next_order_id;
		self.next_order_id += 1;
		let order = Order {
			id,
			user_id,
			delivery_crew_id: None,
			status: OrderStatus::Pending,
			total,
			created_at,
			items,
		};
		self.orders.insert(id, order.clone());
		order
	}

	fn get_order(&self, id: u64) -> Option<Order> {
		self.orders.get(&id).cloned()
	}

	fn list_orders(&self) -> Vec<Order> {
		self.orders.values().cloned().collect()
	}

	fn orders_for_user(&self, user_id: u64) -> Vec<Order> {
		self.orders
			.values()
			.filter(|o| o.user_id == user_id)
			.cloned()
			.collect()
	}

	fn orders_for_crew(&self, crew_id: u64) -> Vec<Order> {
		self.orders
			.values()
			.filter(|o| o.delivery_crew_id == Some(crew_id))
			.cloned()
			.collect()
	}

	fn update_order(&mut self, order: Order) -> Result<(), StoreError> {
		match self.orders.get_mut(&order.id) {
			Some(slot) => {
				*slot = order;
				Ok(())
			}
			None => Err(StoreError::NotFound),
		}
	}

	fn delete_order(&mut self, id: u64) -> Result<(), StoreError> {
		self.orders
			.remove(&id)
			.map(|_| ())
			.ok_or(StoreError::NotFound)
	}

	fn get_user(&self, id: u64) -> Option<User> {
		self.users.get(&id).cloned()
	}

	fn upsert_user(&mut self, user: User) {
		self.users.insert(user.id, user);
	}

	fn group_members(&self, group: &str) -> Vec<User> {
		self.groups
			.get(group)
			.map(|ids| {
				ids.iter()
					.filter_map(|id| self.users.get(id).cloned())
					.collect()
			})
			.unwrap_or_default()
	}

	fn is_member(&self, group: &str, user_id: u64) -> bool {
		self.groups
			.get(group)
			.is_some_and(|ids| ids.contains(&user_id))
	}

	fn add_member(&mut self, group: &str, user_id: u64) {
		let members = self.groups.entry(group.to_string()).or_default();
		if !members.contains(&user_id) {
			members.push(user_id);
		}
	}

	fn remove_member(&mut self, group: &str, user_id: u64) -> Result<(), StoreError> {
		match self.groups.get_mut(group) {
			Some(members) => {
				members.retain(|id| *id != user_id);
				Ok(())
			}
			None => Err(StoreError::NotFound),
		}
	}
}

/// Backend-specific commit step for a staged transaction.
#[async_trait]
pub(crate) trait Commit: Send + Sync {
	/// Durably replaces the store state with the staged state.
	async fn persist(&mut self, staged: State) -> Result<(), StoreError>;
}

/// A staged transaction generic over its commit step.
pub(crate) struct Transaction<C: Commit> {
	staged: State,
	committer: C,
}

impl<C: Commit> Transaction<C> {
	pub(crate) fn new(staged: State, committer: C) -> Self {
		Self { staged, committer }
	}
}

#[async_trait]
impl<C: Commit> CatalogRepository for Transaction<C> {
	async fn list_menu_items(&self) -> Result<Vec<MenuItem>, StoreError> {
		Ok(self.staged.list_menu_items())
	}

	async fn get_menu_item(&self, id: u64) -> Result<Option<MenuItem>, StoreError> {
		Ok(self.staged.get_menu_item(id))
	}

	async fn insert_menu_item(&mut self, draft: MenuItemDraft) -> Result<MenuItem, StoreError> {
		Ok(self.staged.insert_menu_item(draft))
	}

	async fn update_menu_item(&mut self, item: MenuItem) -> Result<(), StoreError> {
		self.staged.update_menu_item(item)
	}

	async fn delete_menu_item(&mut self, id: u64) -> Result<(), StoreError> {
		self.staged.delete_menu_item(id)
	}
}

#[async_trait]
impl<C: Commit> CartRepository for Transaction<C> {
	async fn cart_lines(&self, user_id: u64) -> Result<Vec<CartLine>, StoreError> {
		Ok(self.staged.cart_lines(user_id))
	}

	async fn put_cart_line(&mut self, line: CartLine) -> Result<(), StoreError> {
		self.staged.put_cart_line(line);
		Ok(())
	}

	async fn clear_cart(&mut self, user_id: u64) -> Result<usize, StoreError> {
		Ok(self.staged.clear_cart(user_id))
	}
}

#[async_trait]
impl<C: Commit> OrderRepository for Transaction<C> {
	async fn insert_order(
		&mut self,
		user_id: u64,
		total: Decimal,
		created_at: u64,
		items: Vec<OrderItem>,
	) -> Result<Order, StoreError> {
		Ok(self.staged.insert_order(user_id, total, created_at, items))
	}

	async fn get_order(&self, id: u64) -> Result<Option<Order>, StoreError> {
		Ok(self.staged.get_order(id))
	}

	async fn list_orders(&self) -> Result<Vec<Order>, StoreError> {
		Ok(self.staged.list_orders())
	}

	async fn orders_for_user(&self, user_id: u64) -> Result<Vec<Order>, StoreError> {
		Ok(self.staged.orders_for_user(user_id))
	}

	async fn orders_for_crew(&self, crew_id: u64) -> Result<Vec<Order>, StoreError> {
		Ok(self.staged.orders_for_crew(crew_id))
	}

	async fn update_order(&mut self, order: Order) -> Result<(), StoreError> {
		self.staged.update_order(order)
	}

	async fn delete_order(&mut self, id: u64) -> Result<(), StoreError> {
		self.staged.delete_order(id)
	}
}

#[async_trait]
impl<C: Commit> UserRepository for Transaction<C> {
	async fn get_user(&self, id: u64) -> Result<Option<User>, StoreError> {
		Ok(self.staged.get_user(id))
	}

	async fn upsert_user(&mut self, user: User) -> Result<(), StoreError> {
		self.staged.upsert_user(user);
		Ok(())
	}
}

#[async_trait]
impl<C: Commit> GroupRepository for Transaction<C> {
	async fn group_members(&self, group: &str) -> Result<Vec<User>, StoreError> {
		Ok(self.staged.group_members(group))
	}

	async fn is_member(&self, group: &str, user_id: u64) -> Result<bool, StoreError> {
		Ok(self.staged.is_member(group, user_id))
	}

	async fn add_member(&mut self, group: &str, user_id: u64) -> Result<(), StoreError> {
		self.staged.add_member(group, user_id);
		Ok(())
	}

	async fn remove_member(&mut self, group: &str, user_id: u64) -> Result<(), StoreError> {
		self.staged.remove_member(group, user_id)
	}
}

#[async_trait]
impl<C: Commit + 'static> StoreTransaction for Transaction<C> {
	async fn commit(mut self: Box<Self>) -> Result<(), StoreError> {
		let staged = std::mem::take(&mut self.staged);
		self.committer.persist(staged).await
	}
}
