//! Persistence boundary for the bistro ordering system.
//!
//! This module defines the repository traits the domain core works against
//! and a unit-of-work abstraction that makes multi-step writes atomic.
//! Backends stage every write inside a transaction; dropping a transaction
//! without committing discards the staged writes entirely.

use async_trait::async_trait;
use bistro_types::{CartLine, MenuItem, MenuItemDraft, Order, OrderItem, User};
use rust_decimal::Decimal;
use std::sync::Arc;
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod file;
	pub mod memory;
	pub(crate) mod state;
}

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
	/// Error that occurs when a requested record is not found.
	#[error("Not found")]
	NotFound,
	/// Error that occurs during serialization/deserialization.
	#[error("Serialization error: {0}")]
	Serialization(String),
	/// Error that occurs in the storage backend.
	#[error("Backend error: {0}")]
	Backend(String),
	/// Error that occurs during configuration validation.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Read and write access to the menu catalog.
#[async_trait]
pub trait CatalogRepository: Send {
	/// Lists every menu item, ordered by id.
	async fn list_menu_items(&self) -> Result<Vec<MenuItem>, StoreError>;

	/// Fetches a single menu item.
	async fn get_menu_item(&self, id: u64) -> Result<Option<MenuItem>, StoreError>;

	/// Inserts a new menu item, allocating its id.
	async fn insert_menu_item(&mut self, draft: MenuItemDraft) -> Result<MenuItem, StoreError>;

	/// Replaces an existing menu item. Fails with `NotFound` if the id is
	/// unknown.
	async fn update_menu_item(&mut self, item: MenuItem) -> Result<(), StoreError>;

	/// Deletes a menu item. Fails with `NotFound` if the id is unknown.
	async fn delete_menu_item(&mut self, id: u64) -> Result<(), StoreError>;
}

/// Access to per-user cart lines.
///
/// Lines are keyed by (user_id, menuitem_id); merge policy lives in the
/// domain core, the repository only inserts or replaces whole lines.
#[async_trait]
pub trait CartRepository: Send {
	/// Lists a user's cart lines in insertion order.
	async fn cart_lines(&self, user_id: u64) -> Result<Vec<CartLine>, StoreError>;

	/// Inserts the line, or replaces the existing line with the same
	/// (user_id, menuitem_id) key in place.
	async fn put_cart_line(&mut self, line: CartLine) -> Result<(), StoreError>;

	/// Removes every line for the user, returning how many were removed.
	async fn clear_cart(&mut self, user_id: u64) -> Result<usize, StoreError>;
}

/// Access to durable order records.
///
/// Order items are embedded in the order record, so deleting an order
/// removes its items with it.
#[async_trait]
pub trait OrderRepository: Send {
	/// Creates a new pending order, allocating its id.
	async fn insert_order(
		&mut self,
		user_id: u64,
		total: Decimal,
		created_at: u64,
		items: Vec<OrderItem>,
	) -> Result<Order, StoreError>;

	/// Fetches a single order.
	async fn get_order(&self, id: u64) -> Result<Option<Order>, StoreError>;

	/// Lists every order, ordered by id.
	async fn list_orders(&self) -> Result<Vec<Order>, StoreError>;

	/// Lists orders placed by the given user.
	async fn orders_for_user(&self, user_id: u64) -> Result<Vec<Order>, StoreError>;

	/// Lists orders assigned to the given delivery crew member.
	async fn orders_for_crew(&self, crew_id: u64) -> Result<Vec<Order>, StoreError>;

	/// Replaces an existing order. Fails with `NotFound` if the id is
	/// unknown.
	async fn update_order(&mut self, order: Order) -> Result<(), StoreError>;

	/// Deletes an order and its embedded items. Fails with `NotFound` if
	/// the id is unknown.
	async fn delete_order(&mut self, id: u64) -> Result<(), StoreError>;
}

/// Access to the user directory.
#[async_trait]
pub trait UserRepository: Send {
	async fn get_user(&self, id: u64) -> Result<Option<User>, StoreError>;

	/// Inserts or replaces a user record. Used by identity seeding.
	async fn upsert_user(&mut self, user: User) -> Result<(), StoreError>;
}

/// Access to named role groups and their memberships.
#[async_trait]
pub trait GroupRepository: Send {
	/// Lists the members of a group in membership order. An unknown group
	/// yields an empty list.
	async fn group_members(&self, group: &str) -> Result<Vec<User>, StoreError>;

	/// True if the user is currently a member of the group.
	async fn is_member(&self, group: &str, user_id: u64) -> Result<bool, StoreError>;

	/// Adds the user to the group, creating the group if absent.
	/// Adding an existing member is a no-op.
	async fn add_member(&mut self, group: &str, user_id: u64) -> Result<(), StoreError>;

	/// Removes the user from the group. Fails with `NotFound` if the
	/// group does not exist; removing a non-member succeeds.
	async fn remove_member(&mut self, group: &str, user_id: u64) -> Result<(), StoreError>;
}

/// A unit of work over the store.
///
/// All repository methods operate on a staged copy of the state. Calling
/// `commit` publishes every staged write at once; dropping the transaction
/// without committing rolls everything back.
#[async_trait]
pub trait StoreTransaction:
	CatalogRepository
	+ CartRepository
	+ OrderRepository
	+ UserRepository
	+ GroupRepository
	+ Send
	+ Sync
{
	/// Publishes all staged writes atomically.
	async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}

/// Handle to a storage backend.
///
/// `begin` serializes transactions: a second call waits until the first
/// transaction commits or is dropped. Callers must therefore never hold
/// two open transactions on the same task.
#[async_trait]
pub trait Store: Send + Sync {
	/// Opens a transaction over the current state.
	async fn begin(&self) -> Result<Box<dyn StoreTransaction>, StoreError>;
}

/// Type alias for store factory functions.
///
/// This is the function signature that all storage implementations provide
/// to create instances of their store from configuration.
pub type StoreFactory = fn(&toml::Value) -> Result<Arc<dyn Store>, StoreError>;

/// Get all registered storage implementations.
///
/// Returns a vector of (name, factory) tuples for the available backends,
/// used to resolve the `storage.primary` configuration value.
pub fn get_all_implementations() -> Vec<(&'static str, StoreFactory)> {
	use implementations::{file, memory};

	vec![
		("file", file::create_store as StoreFactory),
		("memory", memory::create_store as StoreFactory),
	]
}
