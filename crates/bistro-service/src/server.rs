//! HTTP server for the bistro ordering API.
//!
//! This module assembles the router, the shared application state, and the
//! bearer-token identity resolution used by every authenticated route.

use axum::{
	http::HeaderMap,
	routing::{delete, get, post},
	Router,
};
use bistro_config::Config;
use bistro_core::Engine;
use bistro_types::{ApiError, Principal};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	/// Reference to the domain engine for processing requests.
	pub engine: Arc<Engine>,
	/// Bearer token to user id mapping, seeded from configuration.
	pub tokens: Arc<HashMap<String, u64>>,
}

impl AppState {
	pub fn new(config: &Config, engine: Arc<Engine>) -> Self {
		let tokens = config
			.identity
			.users
			.iter()
			.map(|u| (u.token.clone(), u.id))
			.collect();
		Self {
			engine,
			tokens: Arc::new(tokens),
		}
	}
}

/// Builds the API router over the given state.
pub fn build_router(state: AppState) -> Router {
	Router::new()
		.route(
			"/menu-items/",
			get(crate::apis::menu::list_items).post(crate::apis::menu::create_item),
		)
		.route(
			"/menu-items/{id}/",
			get(crate::apis::menu::get_item)
				.put(crate::apis::menu::replace_item)
				.patch(crate::apis::menu::patch_item)
				.delete(crate::apis::menu::delete_item),
		)
		.route("/groups/{name}/users/", get(crate::apis::groups::list_members))
		.route(
			"/groups/{name}/users/add/",
			post(crate::apis::groups::add_member),
		)
		.route(
			"/groups/{name}/users/{id}/",
			delete(crate::apis::groups::remove_member),
		)
		.route(
			"/cart/menu-items/",
			get(crate::apis::cart::list_cart).post(crate::apis::cart::add_to_cart),
		)
		.route(
			"/cart/menu-items/clear/",
			delete(crate::apis::cart::clear_cart),
		)
		.route(
			"/orders/",
			get(crate::apis::orders::list_orders).post(crate::apis::orders::create_order),
		)
		.route(
			"/orders/{id}/",
			get(crate::apis::orders::get_order)
				.put(crate::apis::orders::update_order)
				.patch(crate::apis::orders::update_order)
				.delete(crate::apis::orders::delete_order),
		)
		.layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
		.with_state(state)
}

/// Starts the HTTP server for the ordering API.
pub async fn start_server(
	config: Config,
	engine: Arc<Engine>,
) -> Result<(), Box<dyn std::error::Error>> {
	let bind_address = format!("{}:{}", config.api.host, config.api.port);
	let app = build_router(AppState::new(&config, engine));

	let listener = TcpListener::bind(&bind_address).await?;
	tracing::info!("Ordering API server starting on {}", bind_address);

	axum::serve(listener, app).await?;

	Ok(())
}

/// Extracts the bearer token from the Authorization header, if any.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
	headers
		.get(axum::http::header::AUTHORIZATION)?
		.to_str()
		.ok()?
		.strip_prefix("Bearer ")
}

/// Resolves the request's principal, or None for anonymous requests.
///
/// A present but unknown token is an error rather than anonymity, so a
/// mistyped token never silently downgrades a caller.
pub async fn maybe_authenticate(
	state: &AppState,
	headers: &HeaderMap,
) -> Result<Option<Principal>, ApiError> {
	let Some(token) = bearer_token(headers) else {
		return Ok(None);
	};

	let user_id = state.tokens.get(token).ok_or(ApiError::Unauthorized {
		message: "unrecognized token".to_string(),
	})?;

	let user = state
		.engine
		.lookup_user(*user_id)
		.await
		.map_err(crate::apis::domain_error)?
		.ok_or(ApiError::Unauthorized {
			message: "unknown principal".to_string(),
		})?;

	Ok(Some(Principal {
		id: user.id,
		username: user.username,
	}))
}

/// Resolves the request's principal, rejecting anonymous requests.
pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<Principal, ApiError> {
	maybe_authenticate(state, headers)
		.await?
		.ok_or(ApiError::Unauthorized {
			message: "authentication required".to_string(),
		})
}

#[cfg(test)]
mod tests {
	use super::*;
	use axum::body::Body;
	use axum::http::{header, Request, StatusCode};
	use bistro_storage::implementations::memory::MemoryStore;
	use bistro_storage::Store;
	use http_body_util::BodyExt;
	use serde_json::{json, Value};
	use tower::ServiceExt;

	const CONFIG: &str = r#"
		[service]
		id = "bistro-test"

		[storage]
		primary = "memory"

		[[identity.users]]
		id = 1
		username = "mia"
		token = "tok-manager"

		[[identity.users]]
		id = 2
		username = "dev"
		token = "tok-crew"

		[[identity.users]]
		id = 3
		username = "ana"
		token = "tok-ana"

		[[identity.users]]
		id = 4
		username = "bo"
		token = "tok-bo"

		[identity.groups]
		"Manager" = [1]
		"Delivery Crew" = [2]
	"#;

	async fn test_app() -> Router {
		let config: Config = CONFIG.parse().unwrap();
		let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
		let users = config
			.identity
			.users
			.iter()
			.map(|u| bistro_types::User {
				id: u.id,
				username: u.username.clone(),
			})
			.collect();
		bistro_core::identity::seed_directory(store.as_ref(), users, &config.identity.groups)
			.await
			.unwrap();
		let engine = Arc::new(Engine::new(store));
		build_router(AppState::new(&config, engine))
	}

	fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
		let mut builder = Request::builder().method(method).uri(uri);
		if let Some(token) = token {
			builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
		}
		match body {
			Some(value) => builder
				.header(header::CONTENT_TYPE, "application/json")
				.body(Body::from(value.to_string()))
				.unwrap(),
			None => builder.body(Body::empty()).unwrap(),
		}
	}

	async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
		let response = app.clone().oneshot(req).await.unwrap();
		let status = response.status();
		let bytes = response.into_body().collect().await.unwrap().to_bytes();
		let body = if bytes.is_empty() {
			Value::Null
		} else {
			serde_json::from_slice(&bytes).unwrap()
		};
		(status, body)
	}

	#[tokio::test]
	async fn menu_reads_are_anonymous_but_cart_is_not() {
		let app = test_app().await;

		let (status, body) = send(&app, request("GET", "/menu-items/", None, None)).await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(body, json!([]));

		let (status, _) = send(&app, request("GET", "/cart/menu-items/", None, None)).await;
		assert_eq!(status, StatusCode::UNAUTHORIZED);

		let (status, _) = send(
			&app,
			request("GET", "/cart/menu-items/", Some("tok-bogus"), None),
		)
		.await;
		assert_eq!(status, StatusCode::UNAUTHORIZED);
	}

	#[tokio::test]
	async fn menu_writes_require_manager() {
		let app = test_app().await;
		let draft = json!({"title": "soup", "price": "4.50", "category": "starters"});

		let (status, _) = send(
			&app,
			request("POST", "/menu-items/", Some("tok-ana"), Some(draft.clone())),
		)
		.await;
		assert_eq!(status, StatusCode::FORBIDDEN);

		let (status, body) = send(
			&app,
			request("POST", "/menu-items/", Some("tok-manager"), Some(draft)),
		)
		.await;
		assert_eq!(status, StatusCode::CREATED);
		assert_eq!(body["id"], json!(1));

		// Partial update touches only the given fields.
		let (status, body) = send(
			&app,
			request(
				"PATCH",
				"/menu-items/1/",
				Some("tok-manager"),
				Some(json!({"price": "5.00"})),
			),
		)
		.await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(body["title"], json!("soup"));
		assert_eq!(body["price"], json!("5.00"));
	}

	#[tokio::test]
	async fn order_flow_end_to_end() {
		let app = test_app().await;

		// Manager stocks the menu.
		let (_, item) = send(
			&app,
			request(
				"POST",
				"/menu-items/",
				Some("tok-manager"),
				Some(json!({"title": "pasta", "price": "10.00", "category": "mains"})),
			),
		)
		.await;
		let item_id = item["id"].as_u64().unwrap();

		// Placing an order on an empty cart is rejected.
		let (status, _) = send(&app, request("POST", "/orders/", Some("tok-ana"), None)).await;
		assert_eq!(status, StatusCode::BAD_REQUEST);

		// Customer fills the cart and places the order.
		let (status, _) = send(
			&app,
			request(
				"POST",
				"/cart/menu-items/",
				Some("tok-ana"),
				Some(json!({"menuitem_id": item_id, "quantity": 2})),
			),
		)
		.await;
		assert_eq!(status, StatusCode::CREATED);

		let (status, order) = send(&app, request("POST", "/orders/", Some("tok-ana"), None)).await;
		assert_eq!(status, StatusCode::CREATED);
		assert_eq!(order["total"], json!("20.00"));
		assert_eq!(order["status"], json!("pending"));
		let order_id = order["id"].as_u64().unwrap();

		// The cart is now empty.
		let (_, cart) = send(
			&app,
			request("GET", "/cart/menu-items/", Some("tok-ana"), None),
		)
		.await;
		assert_eq!(cart, json!([]));

		// Another customer cannot see the order, and gets the same 404
		// as for an id that does not exist.
		let uri = format!("/orders/{}/", order_id);
		let (status, _) = send(&app, request("GET", &uri, Some("tok-bo"), None)).await;
		assert_eq!(status, StatusCode::NOT_FOUND);
		let (status, _) = send(&app, request("GET", "/orders/999/", Some("tok-bo"), None)).await;
		assert_eq!(status, StatusCode::NOT_FOUND);

		// Manager assigns the crew; unassigned crew first gets 403.
		let (status, _) = send(
			&app,
			request(
				"PATCH",
				&uri,
				Some("tok-crew"),
				Some(json!({"status": "delivered"})),
			),
		)
		.await;
		assert_eq!(status, StatusCode::FORBIDDEN);

		let (status, _) = send(
			&app,
			request(
				"PATCH",
				&uri,
				Some("tok-manager"),
				Some(json!({"delivery_crew_id": 2})),
			),
		)
		.await;
		assert_eq!(status, StatusCode::OK);

		// Assigned crew may flip the status, but only the status.
		let (status, _) = send(
			&app,
			request(
				"PATCH",
				&uri,
				Some("tok-crew"),
				Some(json!({"status": "delivered", "delivery_crew_id": 1})),
			),
		)
		.await;
		assert_eq!(status, StatusCode::FORBIDDEN);

		let (status, updated) = send(
			&app,
			request(
				"PATCH",
				&uri,
				Some("tok-crew"),
				Some(json!({"status": "delivered"})),
			),
		)
		.await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(updated["status"], json!("delivered"));

		// Only the manager may delete.
		let (status, _) = send(&app, request("DELETE", &uri, Some("tok-ana"), None)).await;
		assert_eq!(status, StatusCode::FORBIDDEN);
		let (status, _) = send(&app, request("DELETE", &uri, Some("tok-manager"), None)).await;
		assert_eq!(status, StatusCode::NO_CONTENT);
	}

	#[tokio::test]
	async fn group_admin_routes() {
		let app = test_app().await;

		let (status, body) = send(
			&app,
			request(
				"GET",
				"/groups/Delivery%20Crew/users/",
				Some("tok-manager"),
				None,
			),
		)
		.await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(body[0]["username"], json!("dev"));

		let (status, _) = send(
			&app,
			request(
				"POST",
				"/groups/Delivery%20Crew/users/add/",
				Some("tok-manager"),
				Some(json!({"user_id": 4})),
			),
		)
		.await;
		assert_eq!(status, StatusCode::CREATED);

		let (status, _) = send(
			&app,
			request(
				"POST",
				"/groups/Delivery%20Crew/users/add/",
				Some("tok-manager"),
				Some(json!({"user_id": 99})),
			),
		)
		.await;
		assert_eq!(status, StatusCode::NOT_FOUND);

		let (status, _) = send(
			&app,
			request(
				"DELETE",
				"/groups/Delivery%20Crew/users/4/",
				Some("tok-manager"),
				None,
			),
		)
		.await;
		assert_eq!(status, StatusCode::OK);

		let (status, _) = send(
			&app,
			request(
				"GET",
				"/groups/Delivery%20Crew/users/",
				Some("tok-crew"),
				None,
			),
		)
		.await;
		assert_eq!(status, StatusCode::FORBIDDEN);
	}
}
