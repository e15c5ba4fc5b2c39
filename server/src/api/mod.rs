//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 认证相关接口 (登录/刷新/登出/当前用户)
//! - [`products`] - 商品目录接口
//! - [`tables`] - 桌台管理接口
//! - [`orders`] - 订单与收款接口
//!
//! 所有业务路由挂在 `/api/v1` 下，经过 [`require_auth`] 认证中间件；
//! 登录、刷新和健康检查是公共路由。

pub mod auth;
pub mod health;
pub mod orders;
pub mod products;
pub mod tables;

// Re-export common types for handlers
pub use crate::utils::{AppResponse, AppResult};

use axum::{Router, middleware};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::require_auth;
use crate::core::ServerState;

/// 组装完整路由树。
pub fn create_router(state: ServerState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(products::router())
        .merge(tables::router())
        .merge(orders::router())
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
