//! Administrative API.
//!
//! Mounted only when `admin.enabled` is set. Every route requires
//! `Authorization: Bearer <admin.api_key>`.

pub mod auth;
pub mod handlers;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use self::auth::admin_auth_middleware;
use self::handlers::{get_status, reset_store};
use crate::http::server::AppState;

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/reset", post(reset_store))
        .route_layer(middleware::from_fn_with_state(state, admin_auth_middleware))
}
