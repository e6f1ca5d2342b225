//! Role resolution and identity seeding.

use crate::map_store;
use bistro_storage::Store;
use bistro_types::{DomainError, RoleSet, User, DELIVERY_CREW_GROUP, MANAGER_GROUP};
use std::collections::HashMap;

/// Resolves a principal's role set from current group membership.
///
/// Queried fresh per request; the result is an immutable value passed
/// through the rest of the call, never a cached attribute of the
/// principal.
pub async fn resolve_roles(store: &dyn Store, user_id: u64) -> Result<RoleSet, DomainError> {
	let tx = store.begin().await.map_err(map_store)?;
	let manager = tx.is_member(MANAGER_GROUP, user_id).await.map_err(map_store)?;
	let delivery_crew = tx
		.is_member(DELIVERY_CREW_GROUP, user_id)
		.await
		.map_err(map_store)?;
	Ok(RoleSet {
		manager,
		delivery_crew,
	})
}

/// Seeds the user directory and initial group memberships at startup.
///
/// Users are upserted so a restart refreshes usernames; group seeds only
/// add memberships, they never remove ones granted at runtime.
pub async fn seed_directory(
	store: &dyn Store,
	users: Vec<User>,
	groups: &HashMap<String, Vec<u64>>,
) -> Result<(), DomainError> {
	let mut tx = store.begin().await.map_err(map_store)?;
	for user in users {
		tx.upsert_user(user).await.map_err(map_store)?;
	}
	for (group, members) in groups {
		for member in members {
			tx.add_member(group, *member).await.map_err(map_store)?;
		}
	}
	tx.commit().await.map_err(map_store)
}
