//! Group membership administration.
//!
//! Managers grant and revoke the Manager and Delivery Crew roles by
//! editing group membership. Resolution picks the change up on the next
//! request; nothing is cached on principals.

use crate::policy::{can_perform, Action};
use crate::map_store;
use bistro_storage::Store;
use bistro_types::{DomainError, GroupMember, RoleSet};
use std::sync::Arc;

pub struct GroupService {
	store: Arc<dyn Store>,
}

impl GroupService {
	pub fn new(store: Arc<dyn Store>) -> Self {
		Self { store }
	}

	/// Lists the members of a named group. An unknown group is an empty
	/// list, not an error.
	pub async fn list_members(
		&self,
		roles: RoleSet,
		group: &str,
	) -> Result<Vec<GroupMember>, DomainError> {
		if !can_perform(roles, Action::GroupAdmin) {
			return Err(DomainError::Forbidden);
		}

		let tx = self.store.begin().await.map_err(map_store)?;
		let members = tx.group_members(group).await.map_err(map_store)?;
		Ok(members
			.into_iter()
			.map(|u| GroupMember {
				id: u.id,
				username: u.username,
			})
			.collect())
	}

	/// Adds a user to a group, creating the group if absent.
	pub async fn add_member(
		&self,
		roles: RoleSet,
		group: &str,
		user_id: u64,
	) -> Result<(), DomainError> {
		if !can_perform(roles, Action::GroupAdmin) {
			return Err(DomainError::Forbidden);
		}

		let mut tx = self.store.begin().await.map_err(map_store)?;
		if tx.get_user(user_id).await.map_err(map_store)?.is_none() {
			return Err(DomainError::NotFound);
		}
		tx.add_member(group, user_id).await.map_err(map_store)?;
		tx.commit().await.map_err(map_store)?;

		tracing::info!(user_id, group, "User added to group");
		Ok(())
	}

	/// Removes a user from a group. Both the user and the group must
	/// exist; removing a user who is not a member succeeds quietly.
	pub async fn remove_member(
		&self,
		roles: RoleSet,
		group: &str,
		user_id: u64,
	) -> Result<(), DomainError> {
		if !can_perform(roles, Action::GroupAdmin) {
			return Err(DomainError::Forbidden);
		}

		let mut tx = self.store.begin().await.map_err(map_store)?;
		if tx.get_user(user_id).await.map_err(map_store)?.is_none() {
			return Err(DomainError::NotFound);
		}
		tx.remove_member(group, user_id).await.map_err(map_store)?;
		tx.commit().await.map_err(map_store)?;

		tracing::info!(user_id, group, "User removed from group");
		Ok(())
	}
}
