//! Order API 模块

mod handler;

use axum::{
    Router, middleware,
    routing::{get, patch, post},
};

use crate::auth::{permissions, require_permission};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/v1/orders", routes())
}

fn routes() -> Router<ServerState> {
    let view_routes = Router::new()
        .route("/", get(handler::list))
        .route("/summary/daily", get(handler::daily_summary))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/payments", get(handler::list_payments))
        .layer(middleware::from_fn(require_permission(
            permissions::ORDERS_VIEW,
        )));

    let create_routes = Router::new()
        .route("/", post(handler::create))
        .layer(middleware::from_fn(require_permission(
            permissions::ORDERS_CREATE,
        )));

    let status_routes = Router::new()
        .route("/{id}/status", patch(handler::update_status))
        .route(
            "/{id}/items/{item_id}/status",
            patch(handler::update_item_status),
        )
        .layer(middleware::from_fn(require_permission(
            permissions::ORDERS_UPDATE_STATUS,
        )));

    let payment_routes = Router::new()
        .route("/{id}/payments", post(handler::record_payment))
        .layer(middleware::from_fn(require_permission(
            permissions::ORDERS_PAY,
        )));

    view_routes
        .merge(create_routes)
        .merge(status_routes)
        .merge(payment_routes)
}
