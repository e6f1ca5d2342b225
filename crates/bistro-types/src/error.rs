//! Domain error taxonomy shared by all services.

use thiserror::Error;

/// Errors surfaced by the domain services.
///
/// These are returned as typed results to the boundary layer, which maps
/// them to HTTP status codes. `NotFound` deliberately carries no detail
/// about whether a record is absent or merely outside the caller's
/// visibility scope.
#[derive(Debug, Error, PartialEq)]
pub enum DomainError {
	/// Missing menu item, user, group, or out-of-scope order id.
	#[error("not found")]
	NotFound,
	/// Role or ownership policy violation.
	#[error("permission denied")]
	Forbidden,
	/// Malformed or rejected request (empty cart, bad patch shape).
	#[error("{0}")]
	BadRequest(String),
	/// Reserved; nothing in the current model conflicts.
	#[error("conflict: {0}")]
	Conflict(String),
	/// Failure in the persistence boundary.
	#[error("storage error: {0}")]
	Storage(String),
}
