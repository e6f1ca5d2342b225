//! Order endpoints.
//!
//! Listing and reads are role-partitioned; updates dispatch by role inside
//! the order engine; deletion is Manager-only.

use crate::apis::domain_error;
use crate::server::{authenticate, AppState};
use axum::{
	extract::{Path, State},
	http::{HeaderMap, StatusCode},
	response::Json,
};
use bistro_types::{ApiError, Order, OrderPatch, Principal, RoleSet};

async fn principal_and_roles(
	state: &AppState,
	headers: &HeaderMap,
) -> Result<(Principal, RoleSet), ApiError> {
	let principal = authenticate(state, headers).await?;
	let roles = state
		.engine
		.resolve_roles(principal.id)
		.await
		.map_err(domain_error)?;
	Ok((principal, roles))
}

/// Handles GET /orders/ requests.
pub async fn list_orders(
	State(state): State<AppState>,
	headers: HeaderMap,
) -> Result<Json<Vec<Order>>, ApiError> {
	let (principal, roles) = principal_and_roles(&state, &headers).await?;
	let orders = state
		.engine
		.orders
		.list_orders(roles, principal.id)
		.await
		.map_err(domain_error)?;
	Ok(Json(orders))
}

/// Handles POST /orders/ requests.
///
/// Converts the caller's cart into an order; an empty cart is a 400.
pub async fn create_order(
	State(state): State<AppState>,
	headers: HeaderMap,
) -> Result<(StatusCode, Json<Order>), ApiError> {
	let principal = authenticate(&state, &headers).await?;
	let order = state
		.engine
		.orders
		.create_order(principal.id)
		.await
		.map_err(domain_error)?;
	Ok((StatusCode::CREATED, Json(order)))
}

/// Handles GET /orders/{id}/ requests.
pub async fn get_order(
	State(state): State<AppState>,
	Path(id): Path<u64>,
	headers: HeaderMap,
) -> Result<Json<Order>, ApiError> {
	let (principal, roles) = principal_and_roles(&state, &headers).await?;
	let order = state
		.engine
		.orders
		.get_order(roles, principal.id, id)
		.await
		.map_err(domain_error)?;
	Ok(Json(order))
}

/// Handles PUT and PATCH /orders/{id}/ requests.
pub async fn update_order(
	State(state): State<AppState>,
	Path(id): Path<u64>,
	headers: HeaderMap,
	Json(patch): Json<OrderPatch>,
) -> Result<Json<Order>, ApiError> {
	let (principal, roles) = principal_and_roles(&state, &headers).await?;
	let order = state
		.engine
		.orders
		.update_order(roles, principal.id, id, patch)
		.await
		.map_err(domain_error)?;
	Ok(Json(order))
}

/// Handles DELETE /orders/{id}/ requests.
pub async fn delete_order(
	State(state): State<AppState>,
	Path(id): Path<u64>,
	headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
	let (_principal, roles) = principal_and_roles(&state, &headers).await?;
	state
		.engine
		.orders
		.delete_order(roles, id)
		.await
		.map_err(domain_error)?;
	Ok(StatusCode::NO_CONTENT)
}
