//! Domain core for the bistro ordering system.
//!
//! This crate holds the order lifecycle and authorization engine: the pure
//! policy rules partitioning read/write rights by role, the cart store, the
//! atomic cart-to-order conversion, and group membership administration.
//! HTTP concerns live in the service crate; persistence lives behind the
//! repository traits in `bistro-storage`.

use bistro_storage::{Store, StoreError};
use bistro_types::DomainError;
use std::sync::Arc;

/// Per-user cart operations with snapshot pricing.
pub mod cart;
/// Group membership administration.
pub mod groups;
/// Role resolution and identity seeding.
pub mod identity;
/// Menu catalog operations.
pub mod menu;
/// Order lifecycle engine.
pub mod orders;
/// Pure authorization policy.
pub mod policy;

pub use cart::CartService;
pub use groups::GroupService;
pub use identity::resolve_roles;
pub use menu::MenuService;
pub use orders::OrderService;

/// Maps a storage failure into the domain taxonomy.
///
/// Store-level `NotFound` surfaces as domain `NotFound`; everything else is
/// an opaque storage failure.
pub(crate) fn map_store(err: StoreError) -> DomainError {
	match err {
		StoreError::NotFound => DomainError::NotFound,
		other => DomainError::Storage(other.to_string()),
	}
}

/// Aggregates the domain services over one storage backend.
pub struct Engine {
	store: Arc<dyn Store>,
	pub menu: MenuService,
	pub cart: CartService,
	pub orders: OrderService,
	pub groups: GroupService,
}

impl Engine {
	pub fn new(store: Arc<dyn Store>) -> Self {
		Self {
			menu: MenuService::new(Arc::clone(&store)),
			cart: CartService::new(Arc::clone(&store)),
			orders: OrderService::new(Arc::clone(&store)),
			groups: GroupService::new(Arc::clone(&store)),
			store,
		}
	}

	/// Resolves the requester's role set from current group membership.
	pub async fn resolve_roles(
		&self,
		user_id: u64,
	) -> Result<bistro_types::RoleSet, DomainError> {
		identity::resolve_roles(self.store.as_ref(), user_id).await
	}

	/// Looks up a user by bearer-token-resolved id.
	pub async fn lookup_user(
		&self,
		user_id: u64,
	) -> Result<Option<bistro_types::User>, DomainError> {
		let tx = self.store.begin().await.map_err(map_store)?;
		tx.get_user(user_id).await.map_err(map_store)
	}
}
