//! Menu catalog operations.
//!
//! Reads are open to anyone, including anonymous callers; writes are
//! Manager-only. The catalog is the price source for cart snapshots but is
//! never consulted again once a line is in a cart.

use crate::policy::{can_perform, Action};
use crate::map_store;
use bistro_storage::Store;
use bistro_types::{DomainError, MenuItem, MenuItemDraft, MenuItemPatch, RoleSet};
use rust_decimal::Decimal;
use std::sync::Arc;

pub struct MenuService {
	store: Arc<dyn Store>,
}

impl MenuService {
	pub fn new(store: Arc<dyn Store>) -> Self {
		Self { store }
	}

	pub async fn list_items(&self) -> Result<Vec<MenuItem>, DomainError> {
		let tx = self.store.begin().await.map_err(map_store)?;
		tx.list_menu_items().await.map_err(map_store)
	}

	pub async fn get_item(&self, id: u64) -> Result<MenuItem, DomainError> {
		let tx = self.store.begin().await.map_err(map_store)?;
		tx.get_menu_item(id)
			.await
			.map_err(map_store)?
			.ok_or(DomainError::NotFound)
	}

	pub async fn create_item(
		&self,
		roles: RoleSet,
		draft: MenuItemDraft,
	) -> Result<MenuItem, DomainError> {
		if !can_perform(roles, Action::MenuWrite) {
			return Err(DomainError::Forbidden);
		}
		validate_draft(&draft)?;

		let mut tx = self.store.begin().await.map_err(map_store)?;
		let item = tx.insert_menu_item(draft).await.map_err(map_store)?;
		tx.commit().await.map_err(map_store)?;

		tracing::info!(item_id = item.id, title = %item.title, "Menu item created");
		Ok(item)
	}

	pub async fn update_item(
		&self,
		roles: RoleSet,
		id: u64,
		draft: MenuItemDraft,
	) -> Result<MenuItem, DomainError> {
		if !can_perform(roles, Action::MenuWrite) {
			return Err(DomainError::Forbidden);
		}
		validate_draft(&draft)?;

		let mut tx = self.store.begin().await.map_err(map_store)?;
		let item = MenuItem {
			id,
			title: draft.title,
			price: draft.price,
			category: draft.category,
		};
		tx.update_menu_item(item.clone()).await.map_err(map_store)?;
		tx.commit().await.map_err(map_store)?;
		Ok(item)
	}

	/// Applies a partial update. The current item is read and the merged
	/// result written inside one transaction, so a concurrent edit cannot
	/// be overwritten with stale fields.
	pub async fn patch_item(
		&self,
		roles: RoleSet,
		id: u64,
		patch: MenuItemPatch,
	) -> Result<MenuItem, DomainError> {
		if !can_perform(roles, Action::MenuWrite) {
			return Err(DomainError::Forbidden);
		}

		let mut tx = self.store.begin().await.map_err(map_store)?;
		let current = tx
			.get_menu_item(id)
			.await
			.map_err(map_store)?
			.ok_or(DomainError::NotFound)?;

		let draft = MenuItemDraft {
			title: patch.title.unwrap_or(current.title),
			price: patch.price.unwrap_or(current.price),
			category: patch.category.unwrap_or(current.category),
		};
		validate_draft(&draft)?;

		let item = MenuItem {
			id,
			title: draft.title,
			price: draft.price,
			category: draft.category,
		};
		tx.update_menu_item(item.clone()).await.map_err(map_store)?;
		tx.commit().await.map_err(map_store)?;
		Ok(item)
	}

	pub async fn delete_item(&self, roles: RoleSet, id: u64) -> Result<(), DomainError> {
		if !can_perform(roles, Action::MenuWrite) {
			return Err(DomainError::Forbidden);
		}

		let mut tx = self.store.begin().await.map_err(map_store)?;
		tx.delete_menu_item(id).await.map_err(map_store)?;
		tx.commit().await.map_err(map_store)?;

		tracing::info!(item_id = id, "Menu item deleted");
		Ok(())
	}
}

fn validate_draft(draft: &MenuItemDraft) -> Result<(), DomainError> {
	if draft.title.is_empty() {
		return Err(DomainError::BadRequest("title cannot be empty".to_string()));
	}
	if draft.price <= Decimal::ZERO {
		return Err(DomainError::BadRequest(
			"price must be positive".to_string(),
		));
	}
	Ok(())
}
