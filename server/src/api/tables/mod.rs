//! Dining Table API 模块

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, patch, post},
};

use crate::auth::{permissions, require_permission};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/v1/tables", routes())
}

fn routes() -> Router<ServerState> {
    let view_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .layer(middleware::from_fn(require_permission(
            permissions::TABLES_VIEW,
        )));

    let manage_routes = Router::new()
        .route("/", post(handler::create))
        .route("/{id}", delete(handler::delete))
        .route("/{id}/status", patch(handler::update_status))
        .layer(middleware::from_fn(require_permission(
            permissions::TABLES_MANAGE,
        )));

    view_routes.merge(manage_routes)
}
