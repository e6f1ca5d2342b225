//! HTTP handler modules, one per resource.

pub mod cart;
pub mod groups;
pub mod menu;
pub mod orders;

use bistro_types::{ApiError, DomainError};

/// Converts a domain error to its API shape, logging storage failures
/// before the detail is stripped from the response.
pub(crate) fn domain_error(err: DomainError) -> ApiError {
	if let DomainError::Storage(ref message) = err {
		tracing::error!("Storage failure: {}", message);
	}
	ApiError::from(err)
}
