//! Principal, user, and role types for request identity.
//!
//! Roles are derived from group membership at request time and carried
//! through the call as an immutable value; nothing re-queries membership
//! mid-request.

use serde::{Deserialize, Serialize};

/// Well-known group name for restaurant managers.
pub const MANAGER_GROUP: &str = "Manager";
/// Well-known group name for the delivery crew.
pub const DELIVERY_CREW_GROUP: &str = "Delivery Crew";

/// A user known to the system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
	pub id: u64,
	pub username: String,
}

/// An authenticated identity making a request.
///
/// Produced by the bearer-token resolver at the HTTP boundary; identity
/// issuance itself lives in an external service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
	pub id: u64,
	pub username: String,
}

/// Role memberships resolved for one request.
///
/// Absence of both flags means the plain Customer role. A principal may
/// hold both; Manager rules take precedence wherever the two differ.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoleSet {
	pub manager: bool,
	pub delivery_crew: bool,
}

impl RoleSet {
	pub const CUSTOMER: RoleSet = RoleSet {
		manager: false,
		delivery_crew: false,
	};

	pub const MANAGER: RoleSet = RoleSet {
		manager: true,
		delivery_crew: false,
	};

	pub const DELIVERY_CREW: RoleSet = RoleSet {
		manager: false,
		delivery_crew: true,
	};
}
