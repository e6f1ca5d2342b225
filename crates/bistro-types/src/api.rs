//! API types for the bistro HTTP API.
//!
//! This module defines the response and error types shared by the HTTP
//! endpoints, including the mapping from domain errors to status codes.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::DomainError;

/// A group member entry as returned by the group admin endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMember {
	pub id: u64,
	pub username: String,
}

/// Request body for adding a user to a group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddMemberRequest {
	pub user_id: u64,
}

/// Plain-message response for operations without a richer payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
	pub message: String,
}

impl MessageResponse {
	pub fn new(message: impl Into<String>) -> Self {
		Self {
			message: message.into(),
		}
	}
}

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
	/// Error type/code
	pub error: String,
	/// Human-readable description
	pub message: String,
	/// Additional error context
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<serde_json::Value>,
}

/// Structured API error type with appropriate HTTP status mapping.
#[derive(Debug)]
pub enum ApiError {
	/// Missing or unresolvable bearer identity (401)
	Unauthorized { message: String },
	/// Policy violation (403)
	Forbidden { message: String },
	/// Absent or out-of-scope resource (404)
	NotFound { message: String },
	/// Malformed or rejected request (400)
	BadRequest { message: String },
	/// Concurrent-modification conflict (409)
	Conflict { message: String },
	/// Internal server error (500)
	InternalServerError { message: String },
}

impl ApiError {
	/// Get the HTTP status code for this error.
	pub fn status_code(&self) -> u16 {
		match self {
			ApiError::BadRequest { .. } => 400,
			ApiError::Unauthorized { .. } => 401,
			ApiError::Forbidden { .. } => 403,
			ApiError::NotFound { .. } => 404,
			ApiError::Conflict { .. } => 409,
			ApiError::InternalServerError { .. } => 500,
		}
	}

	/// Convert to ErrorResponse for JSON serialization.
	pub fn to_error_response(&self) -> ErrorResponse {
		let (error, message) = match self {
			ApiError::BadRequest { message } => ("BAD_REQUEST", message),
			ApiError::Unauthorized { message } => ("UNAUTHORIZED", message),
			ApiError::Forbidden { message } => ("FORBIDDEN", message),
			ApiError::NotFound { message } => ("NOT_FOUND", message),
			ApiError::Conflict { message } => ("CONFLICT", message),
			ApiError::InternalServerError { message } => ("INTERNAL_ERROR", message),
		};
		ErrorResponse {
			error: error.to_string(),
			message: message.clone(),
			details: None,
		}
	}
}

impl fmt::Display for ApiError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ApiError::BadRequest { message } => write!(f, "Bad Request: {}", message),
			ApiError::Unauthorized { message } => write!(f, "Unauthorized: {}", message),
			ApiError::Forbidden { message } => write!(f, "Forbidden: {}", message),
			ApiError::NotFound { message } => write!(f, "Not Found: {}", message),
			ApiError::Conflict { message } => write!(f, "Conflict: {}", message),
			ApiError::InternalServerError { message } => {
				write!(f, "Internal Server Error: {}", message)
			}
		}
	}
}

impl std::error::Error for ApiError {}

impl From<DomainError> for ApiError {
	fn from(err: DomainError) -> Self {
		match err {
			DomainError::NotFound => ApiError::NotFound {
				message: "not found".to_string(),
			},
			DomainError::Forbidden => ApiError::Forbidden {
				message: "permission denied".to_string(),
			},
			DomainError::BadRequest(message) => ApiError::BadRequest { message },
			DomainError::Conflict(message) => ApiError::Conflict { message },
			// Backend detail stays out of the response body; the boundary
			// layer logs it before converting.
			DomainError::Storage(_) => ApiError::InternalServerError {
				message: "internal error".to_string(),
			},
		}
	}
}

impl axum::response::IntoResponse for ApiError {
	fn into_response(self) -> axum::response::Response {
		use axum::{http::StatusCode, response::Json};

		let status =
			StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

		let error_response = self.to_error_response();
		(status, Json(error_response)).into_response()
	}
}
