//! Pure authorization policy.
//!
//! Decision functions over an already-resolved role set and the ownership
//! fields of the resource. No side effects, no store access. Wherever
//! Manager and Delivery Crew rules could both apply, the Manager branch is
//! evaluated first, so dual-role principals get Manager treatment.
//!
//! Cart access is deliberately absent here: carts are identity-scoped only
//! and no role grants cross-user cart access.

use bistro_types::{Order, RoleSet};
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Role-gated actions on shared resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
	/// Browse the menu. Open to anonymous callers.
	MenuRead,
	/// Create, replace, or delete menu items.
	MenuWrite,
	/// List, add, or remove members of a role group.
	GroupAdmin,
	/// Update any order field, including crew assignment.
	OrderFullUpdate,
	/// Delete an order and its items.
	OrderDelete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Requirement {
	Anyone,
	Manager,
}

// Static rule table; unknown combinations deny by default.
static RULES: Lazy<HashMap<Action, Requirement>> = Lazy::new(|| {
	HashMap::from([
		(Action::MenuRead, Requirement::Anyone),
		(Action::MenuWrite, Requirement::Manager),
		(Action::GroupAdmin, Requirement::Manager),
		(Action::OrderFullUpdate, Requirement::Manager),
		(Action::OrderDelete, Requirement::Manager),
	])
});

/// Decides whether the role set may perform the action.
pub fn can_perform(roles: RoleSet, action: Action) -> bool {
	match RULES.get(&action) {
		Some(Requirement::Anyone) => true,
		Some(Requirement::Manager) => roles.manager,
		None => false,
	}
}

/// Which orders a requester may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderScope {
	/// Managers see every order.
	All,
	/// Delivery crew sees orders assigned to them.
	AssignedTo(u64),
	/// Customers see orders they placed.
	PlacedBy(u64),
}

impl OrderScope {
	pub fn includes(&self, order: &Order) -> bool {
		match self {
			OrderScope::All => true,
			OrderScope::AssignedTo(crew_id) => order.delivery_crew_id == Some(*crew_id),
			OrderScope::PlacedBy(user_id) => order.user_id == *user_id,
		}
	}
}

/// Resolves the order visibility scope for a requester.
pub fn order_scope(roles: RoleSet, principal_id: u64) -> OrderScope {
	if roles.manager {
		OrderScope::All
	} else if roles.delivery_crew {
		OrderScope::AssignedTo(principal_id)
	} else {
		OrderScope::PlacedBy(principal_id)
	}
}

/// Whether a delivery crew member may update the status of this order.
///
/// Only the assigned crew member qualifies; Managers are handled by the
/// `OrderFullUpdate` branch before this is consulted.
pub fn crew_may_update_status(roles: RoleSet, principal_id: u64, order: &Order) -> bool {
	roles.delivery_crew && order.delivery_crew_id == Some(principal_id)
}

#[cfg(test)]
mod tests {
	use super::*;
	use bistro_types::{Order, OrderStatus, RoleSet};
	use rust_decimal::Decimal;

	fn order(user_id: u64, crew: Option<u64>) -> Order {
		Order {
			id: 1,
			user_id,
			delivery_crew_id: crew,
			status: OrderStatus::Pending,
			total: Decimal::ZERO,
			created_at: 0,
			items: Vec::new(),
		}
	}

	#[test]
	fn menu_read_is_open_to_everyone() {
		assert!(can_perform(RoleSet::CUSTOMER, Action::MenuRead));
		assert!(can_perform(RoleSet::DELIVERY_CREW, Action::MenuRead));
		assert!(can_perform(RoleSet::MANAGER, Action::MenuRead));
	}

	#[test]
	fn manager_gated_actions_deny_other_roles() {
		for action in [
			Action::MenuWrite,
			Action::GroupAdmin,
			Action::OrderFullUpdate,
			Action::OrderDelete,
		] {
			assert!(can_perform(RoleSet::MANAGER, action));
			assert!(!can_perform(RoleSet::DELIVERY_CREW, action));
			assert!(!can_perform(RoleSet::CUSTOMER, action));
		}
	}

	#[test]
	fn scopes_partition_visibility() {
		let o = order(7, Some(4));

		assert!(order_scope(RoleSet::MANAGER, 99).includes(&o));
		assert!(order_scope(RoleSet::DELIVERY_CREW, 4).includes(&o));
		assert!(!order_scope(RoleSet::DELIVERY_CREW, 5).includes(&o));
		assert!(order_scope(RoleSet::CUSTOMER, 7).includes(&o));
		assert!(!order_scope(RoleSet::CUSTOMER, 8).includes(&o));
	}

	#[test]
	fn dual_role_gets_manager_scope() {
		let both = RoleSet {
			manager: true,
			delivery_crew: true,
		};
		// An order neither placed by nor assigned to the principal is
		// still visible, because the Manager branch wins.
		assert!(order_scope(both, 1).includes(&order(7, Some(4))));
	}

	#[test]
	fn status_update_requires_assignment() {
		let o = order(7, Some(4));
		assert!(crew_may_update_status(RoleSet::DELIVERY_CREW, 4, &o));
		assert!(!crew_may_update_status(RoleSet::DELIVERY_CREW, 5, &o));
		assert!(!crew_may_update_status(RoleSet::CUSTOMER, 4, &o));
		assert!(!crew_may_update_status(
			RoleSet::DELIVERY_CREW,
			4,
			&order(7, None)
		));
	}
}
