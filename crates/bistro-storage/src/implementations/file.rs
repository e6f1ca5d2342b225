//! File-based storage backend.
//!
//! This backend persists the store state as a single JSON document,
//! providing simple persistence without external dependencies. Commits are
//! crash-safe: the staged state is written to a temporary file and renamed
//! over the live document, so readers never observe a half-written state.

use crate::implementations::state::{Commit, State, Transaction};
use crate::{Store, StoreError, StoreTransaction};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Name of the state document inside the configured storage directory.
const STATE_FILE: &str = "bistro-store.json";

/// File-backed store implementation.
///
/// The service owns its storage directory exclusively; an in-process mutex
/// serializes transactions the same way the memory backend does.
pub struct FileStore {
	/// Path of the JSON state document.
	path: PathBuf,
	/// Transaction gate.
	gate: Arc<Mutex<()>>,
}

impl FileStore {
	/// Creates a FileStore over the given storage directory.
	pub fn new(base_path: PathBuf) -> Self {
		Self {
			path: base_path.join(STATE_FILE),
			gate: Arc::new(Mutex::new(())),
		}
	}

	/// Loads the current state, treating a missing document as empty.
	async fn load(&self) -> Result<State, StoreError> {
		match fs::read(&self.path).await {
			Ok(bytes) => serde_json::from_slice(&bytes)
				.map_err(|e| StoreError::Serialization(e.to_string())),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(State::default()),
			Err(e) => Err(StoreError::Backend(e.to_string())),
		}
	}
}

struct FileCommitter {
	path: PathBuf,
	_guard: OwnedMutexGuard<()>,
}

#[async_trait]
impl Commit for FileCommitter {
	async fn persist(&mut self, staged: State) -> Result<(), StoreError> {
		let bytes = serde_json::to_vec_pretty(&staged)
			.map_err(|e| StoreError::Serialization(e.to_string()))?;

		let tmp = self.path.with_extension("json.tmp");
		fs::write(&tmp, &bytes)
			.await
			.map_err(|e| StoreError::Backend(e.to_string()))?;
		fs::rename(&tmp, &self.path)
			.await
			.map_err(|e| StoreError::Backend(e.to_string()))
	}
}

#[async_trait]
impl Store for FileStore {
	async fn begin(&self) -> Result<Box<dyn StoreTransaction>, StoreError> {
		let guard = Arc::clone(&self.gate).lock_owned().await;
		let staged = self.load().await?;
		Ok(Box::new(Transaction::new(
			staged,
			FileCommitter {
				path: self.path.clone(),
				_guard: guard,
			},
		)))
	}
}

/// Factory function to create a file store from configuration.
///
/// Configuration parameters:
/// - `storage_path`: directory for the state document (required)
pub fn create_store(config: &toml::Value) -> Result<Arc<dyn Store>, StoreError> {
	let base_path = config
		.get("storage_path")
		.and_then(|v| v.as_str())
		.ok_or_else(|| {
			StoreError::Configuration("file storage requires 'storage_path'".to_string())
		})?;

	std::fs::create_dir_all(base_path).map_err(|e| StoreError::Backend(e.to_string()))?;

	Ok(Arc::new(FileStore::new(PathBuf::from(base_path))))
}

#[cfg(test)]
mod tests {
	use super::*;
	use bistro_types::{MenuItemDraft, User};
	use rust_decimal::Decimal;

	fn draft(title: &str) -> MenuItemDraft {
		MenuItemDraft {
			title: title.to_string(),
			price: Decimal::new(900, 2),
			category: "mains".to_string(),
		}
	}

	#[tokio::test]
	async fn state_survives_reopen() {
		let dir = tempfile::tempdir().unwrap();

		let store = FileStore::new(dir.path().to_path_buf());
		let mut tx = store.begin().await.unwrap();
		let item = tx.insert_menu_item(draft("flatbread")).await.unwrap();
		tx.upsert_user(User {
			id: 3,
			username: "noor".to_string(),
		})
		.await
		.unwrap();
		tx.commit().await.unwrap();
		drop(store);

		let reopened = FileStore::new(dir.path().to_path_buf());
		let tx = reopened.begin().await.unwrap();
		assert_eq!(tx.get_menu_item(item.id).await.unwrap(), Some(item));
		assert!(tx.get_user(3).await.unwrap().is_some());
	}

	#[tokio::test]
	async fn missing_document_is_empty_state() {
		let dir = tempfile::tempdir().unwrap();
		let store = FileStore::new(dir.path().to_path_buf());

		let tx = store.begin().await.unwrap();
		assert!(tx.list_menu_items().await.unwrap().is_empty());
		assert!(tx.list_orders().await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn uncommitted_writes_never_reach_disk() {
		let dir = tempfile::tempdir().unwrap();
		let store = FileStore::new(dir.path().to_path_buf());

		let mut tx = store.begin().await.unwrap();
		tx.insert_menu_item(draft("ghost dish")).await.unwrap();
		drop(tx);

		let tx = store.begin().await.unwrap();
		assert!(tx.list_menu_items().await.unwrap().is_empty());
	}

	#[test]
	fn factory_requires_storage_path() {
		let config = toml::Value::Table(Default::default());
		assert!(matches!(
			create_store(&config),
			Err(StoreError::Configuration(_))
		));
	}
}
