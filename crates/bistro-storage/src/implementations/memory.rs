//! In-memory storage backend.
//!
//! This backend keeps the whole store state in a mutex-guarded map, useful
//! for testing and development scenarios where persistence is not required.
//! Holding the mutex for the lifetime of a transaction is what serializes
//! concurrent cart-to-order conversions for the same user.

use crate::implementations::state::{Commit, State, Transaction};
use crate::{Store, StoreError, StoreTransaction};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// In-memory store implementation.
pub struct MemoryStore {
	/// The store state, locked for the duration of each transaction.
	state: Arc<Mutex<State>>,
}

impl MemoryStore {
	/// Creates a new, empty MemoryStore instance.
	pub fn new() -> Self {
		Self {
			state: Arc::new(Mutex::new(State::default())),
		}
	}
}

impl Default for MemoryStore {
	fn default() -> Self {
		Self::new()
	}
}

struct MemoryCommitter {
	guard: OwnedMutexGuard<State>,
}

#[async_trait]
impl Commit for MemoryCommitter {
	async fn persist(&mut self, staged: State) -> Result<(), StoreError> {
		*self.guard = staged;
		Ok(())
	}
}

#[async_trait]
impl Store for MemoryStore {
	async fn begin(&self) -> Result<Box<dyn StoreTransaction>, StoreError> {
		let guard = Arc::clone(&self.state).lock_owned().await;
		let staged = guard.clone();
		Ok(Box::new(Transaction::new(
			staged,
			MemoryCommitter { guard },
		)))
	}
}

/// Factory function to create a memory store from configuration.
///
/// Configuration parameters: none required.
pub fn create_store(_config: &toml::Value) -> Result<Arc<dyn Store>, StoreError> {
	Ok(Arc::new(MemoryStore::new()))
}

#[cfg(test)]
mod tests {
	use super::*;
	use bistro_types::{MenuItemDraft, User};
	use rust_decimal::Decimal;

	fn draft() -> MenuItemDraft {
		MenuItemDraft {
			title: "lemon tart".to_string(),
			price: Decimal::new(650, 2),
			category: "desserts".to_string(),
		}
	}

	#[test]
	fn transactions_move_between_tasks() {
		fn assert_bounds<T: Send + Sync + ?Sized>() {}
		assert_bounds::<dyn StoreTransaction>();
		assert_bounds::<MemoryStore>();
	}

	#[tokio::test]
	async fn committed_writes_are_visible() {
		let store = MemoryStore::new();

		let mut tx = store.begin().await.unwrap();
		let item = tx.insert_menu_item(draft()).await.unwrap();
		tx.commit().await.unwrap();

		let tx = store.begin().await.unwrap();
		let found = tx.get_menu_item(item.id).await.unwrap();
		assert_eq!(found, Some(item));
	}

	#[tokio::test]
	async fn dropped_transaction_rolls_back() {
		let store = MemoryStore::new();

		let mut tx = store.begin().await.unwrap();
		tx.insert_menu_item(draft()).await.unwrap();
		tx.upsert_user(User {
			id: 1,
			username: "mia".to_string(),
		})
		.await
		.unwrap();
		drop(tx);

		let tx = store.begin().await.unwrap();
		assert!(tx.list_menu_items().await.unwrap().is_empty());
		assert_eq!(tx.get_user(1).await.unwrap(), None);
	}

	#[tokio::test]
	async fn transactions_serialize() {
		let store = Arc::new(MemoryStore::new());

		let mut tx = store.begin().await.unwrap();
		tx.insert_menu_item(draft()).await.unwrap();

		// A second begin must not proceed while the first is open.
		let contender = {
			let store = Arc::clone(&store);
			tokio::spawn(async move {
				let tx = store.begin().await.unwrap();
				tx.list_menu_items().await.unwrap().len()
			})
		};
		tokio::task::yield_now().await;
		assert!(!contender.is_finished());

		tx.commit().await.unwrap();
		assert_eq!(contender.await.unwrap(), 1);
	}
}
