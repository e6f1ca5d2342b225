//! Cart endpoints.
//!
//! Every route here operates on the authenticated caller's own cart.

use crate::apis::domain_error;
use crate::server::{authenticate, AppState};
use axum::{
	extract::State,
	http::{HeaderMap, StatusCode},
	response::Json,
};
use bistro_types::{AddToCartRequest, ApiError, CartLine};

/// Handles GET /cart/menu-items/ requests.
pub async fn list_cart(
	State(state): State<AppState>,
	headers: HeaderMap,
) -> Result<Json<Vec<CartLine>>, ApiError> {
	let principal = authenticate(&state, &headers).await?;
	let lines = state
		.engine
		.cart
		.list_cart(principal.id)
		.await
		.map_err(domain_error)?;
	Ok(Json(lines))
}

/// Handles POST /cart/menu-items/ requests.
pub async fn add_to_cart(
	State(state): State<AppState>,
	headers: HeaderMap,
	Json(request): Json<AddToCartRequest>,
) -> Result<(StatusCode, Json<CartLine>), ApiError> {
	let principal = authenticate(&state, &headers).await?;
	let line = state
		.engine
		.cart
		.add_to_cart(principal.id, request)
		.await
		.map_err(domain_error)?;
	Ok((StatusCode::CREATED, Json(line)))
}

/// Handles DELETE /cart/menu-items/clear/ requests.
///
/// Clearing an already-empty cart is still a success.
pub async fn clear_cart(
	State(state): State<AppState>,
	headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
	let principal = authenticate(&state, &headers).await?;
	let removed = state
		.engine
		.cart
		.clear_cart(principal.id)
		.await
		.map_err(domain_error)?;
	tracing::debug!(user_id = principal.id, removed, "Cart cleared");
	Ok(StatusCode::NO_CONTENT)
}
