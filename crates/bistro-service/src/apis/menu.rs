//! Menu catalog endpoints.
//!
//! Reads are open to anonymous callers; writes require a Manager token.

use crate::apis::domain_error;
use crate::server::{authenticate, AppState};
use axum::{
	extract::{Path, State},
	http::{HeaderMap, StatusCode},
	response::Json,
};
use bistro_types::{ApiError, MenuItem, MenuItemDraft, MenuItemPatch, RoleSet};

/// Resolves roles for a write request; reads never call this.
async fn write_roles(state: &AppState, headers: &HeaderMap) -> Result<RoleSet, ApiError> {
	let principal = authenticate(state, headers).await?;
	state
		.engine
		.resolve_roles(principal.id)
		.await
		.map_err(domain_error)
}

/// Handles GET /menu-items/ requests.
pub async fn list_items(State(state): State<AppState>) -> Result<Json<Vec<MenuItem>>, ApiError> {
	let items = state.engine.menu.list_items().await.map_err(domain_error)?;
	Ok(Json(items))
}

/// Handles GET /menu-items/{id}/ requests.
pub async fn get_item(
	State(state): State<AppState>,
	Path(id): Path<u64>,
) -> Result<Json<MenuItem>, ApiError> {
	let item = state.engine.menu.get_item(id).await.map_err(domain_error)?;
	Ok(Json(item))
}

/// Handles POST /menu-items/ requests.
pub async fn create_item(
	State(state): State<AppState>,
	headers: HeaderMap,
	Json(draft): Json<MenuItemDraft>,
) -> Result<(StatusCode, Json<MenuItem>), ApiError> {
	let roles = write_roles(&state, &headers).await?;
	let item = state
		.engine
		.menu
		.create_item(roles, draft)
		.await
		.map_err(domain_error)?;
	Ok((StatusCode::CREATED, Json(item)))
}

/// Handles PUT /menu-items/{id}/ requests.
pub async fn replace_item(
	State(state): State<AppState>,
	Path(id): Path<u64>,
	headers: HeaderMap,
	Json(draft): Json<MenuItemDraft>,
) -> Result<Json<MenuItem>, ApiError> {
	let roles = write_roles(&state, &headers).await?;
	let item = state
		.engine
		.menu
		.update_item(roles, id, draft)
		.await
		.map_err(domain_error)?;
	Ok(Json(item))
}

/// Handles PATCH /menu-items/{id}/ requests.
pub async fn patch_item(
	State(state): State<AppState>,
	Path(id): Path<u64>,
	headers: HeaderMap,
	Json(patch): Json<MenuItemPatch>,
) -> Result<Json<MenuItem>, ApiError> {
	let roles = write_roles(&state, &headers).await?;
	let item = state
		.engine
		.menu
		.patch_item(roles, id, patch)
		.await
		.map_err(domain_error)?;
	Ok(Json(item))
}

/// Handles DELETE /menu-items/{id}/ requests.
pub async fn delete_item(
	State(state): State<AppState>,
	Path(id): Path<u64>,
	headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
	let roles = write_roles(&state, &headers).await?;
	state
		.engine
		.menu
		.delete_item(roles, id)
		.await
		.map_err(domain_error)?;
	Ok(StatusCode::NO_CONTENT)
}
