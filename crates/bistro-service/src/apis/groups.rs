//! Group membership administration endpoints. Manager-only.

use crate::apis::domain_error;
use crate::server::{authenticate, AppState};
use axum::{
	extract::{Path, State},
	http::{HeaderMap, StatusCode},
	response::Json,
};
use bistro_types::{AddMemberRequest, ApiError, GroupMember, MessageResponse, RoleSet};

async fn admin_roles(state: &AppState, headers: &HeaderMap) -> Result<RoleSet, ApiError> {
	let principal = authenticate(state, headers).await?;
	state
		.engine
		.resolve_roles(principal.id)
		.await
		.map_err(domain_error)
}

/// Handles GET /groups/{name}/users/ requests.
pub async fn list_members(
	State(state): State<AppState>,
	Path(name): Path<String>,
	headers: HeaderMap,
) -> Result<Json<Vec<GroupMember>>, ApiError> {
	let roles = admin_roles(&state, &headers).await?;
	let members = state
		.engine
		.groups
		.list_members(roles, &name)
		.await
		.map_err(domain_error)?;
	Ok(Json(members))
}

/// Handles POST /groups/{name}/users/add/ requests.
pub async fn add_member(
	State(state): State<AppState>,
	Path(name): Path<String>,
	headers: HeaderMap,
	Json(request): Json<AddMemberRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
	let roles = admin_roles(&state, &headers).await?;
	state
		.engine
		.groups
		.add_member(roles, &name, request.user_id)
		.await
		.map_err(domain_error)?;
	Ok((
		StatusCode::CREATED,
		Json(MessageResponse::new(format!(
			"User {} added to {} group",
			request.user_id, name
		))),
	))
}

/// Handles DELETE /groups/{name}/users/{id}/ requests.
pub async fn remove_member(
	State(state): State<AppState>,
	Path((name, user_id)): Path<(String, u64)>,
	headers: HeaderMap,
) -> Result<Json<MessageResponse>, ApiError> {
	let roles = admin_roles(&state, &headers).await?;
	state
		.engine
		.groups
		.remove_member(roles, &name, user_id)
		.await
		.map_err(domain_error)?;
	Ok(Json(MessageResponse::new(format!(
		"User {} removed from {} group",
		user_id, name
	))))
}
