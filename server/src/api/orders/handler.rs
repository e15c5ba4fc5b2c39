//! Order API Handlers
//!
//! 写路径 (下单/状态/收款) 全部委托给 [`crate::orders`] 域服务，
//! 这里只做参数提取和权限之外的租户过滤。

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde_json::Value;

use shared::ErrorCode;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{
    CreateOrderRequest, CreatePaymentRequest, OrderDetail, OrderItem, OrderListEntry,
    OrderListQuery, Payment, UpdateItemStatusRequest, UpdateOrderStatusRequest,
};
use crate::db::repository::OrderRepository;
use crate::orders;
use crate::utils::{AppError, AppResult};

/// 日汇总缓存 TTL (秒)
const SUMMARY_CACHE_TTL: u64 = 60;

/// GET /api/v1/orders - 订单列表 (状态/桌台/日期过滤)
pub async fn list(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<Vec<OrderListEntry>>> {
    let repo = OrderRepository::new(state.db.clone());
    let entries = repo.find_all(&user.organization_id, &query).await?;
    Ok(Json(entries))
}

/// GET /api/v1/orders/{id} - 完整订单图
pub async fn get_by_id(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<OrderDetail>> {
    let repo = OrderRepository::new(state.db.clone());
    let detail = repo
        .find_detail(&user.organization_id, &id)
        .await?
        .ok_or_else(|| {
            AppError::not_found(ErrorCode::OrderNotFound, format!("Order {id} not found"))
        })?;
    Ok(Json(detail))
}

/// POST /api/v1/orders - 下单
pub async fn create(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<CreateOrderRequest>,
) -> AppResult<Json<OrderDetail>> {
    let detail = orders::create_order(&state, &user, req).await?;
    Ok(Json(detail))
}

/// PATCH /api/v1/orders/{id}/status - 推进订单状态
pub async fn update_status(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(req): Json<UpdateOrderStatusRequest>,
) -> AppResult<Json<crate::db::models::Order>> {
    let order = orders::update_order_status(&state, &user, &id, req.status).await?;
    Ok(Json(order))
}

/// PATCH /api/v1/orders/{id}/items/{item_id}/status - 推进菜品状态
pub async fn update_item_status(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path((id, item_id)): Path<(String, String)>,
    Json(req): Json<UpdateItemStatusRequest>,
) -> AppResult<Json<OrderItem>> {
    let item = orders::update_order_item_status(&state, &user, &id, &item_id, req.status).await?;
    Ok(Json(item))
}

/// POST /api/v1/orders/{id}/payments - 收款
pub async fn record_payment(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(req): Json<CreatePaymentRequest>,
) -> AppResult<Json<OrderDetail>> {
    let detail = orders::record_payment(&state, &user, &id, req).await?;
    Ok(Json(detail))
}

/// GET /api/v1/orders/{id}/payments - 收款记录
pub async fn list_payments(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<Payment>>> {
    let payments = orders::payment::list_payments(&state, &user, &id).await?;
    Ok(Json(payments))
}

/// 汇总查询参数
#[derive(Debug, serde::Deserialize)]
pub struct SummaryQuery {
    /// ISO 日期 (YYYY-MM-DD)，缺省为今天
    pub date: Option<String>,
}

/// GET /api/v1/orders/summary/daily - 按状态的单量与金额 (缓存 60 秒)
pub async fn daily_summary(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<SummaryQuery>,
) -> AppResult<Json<Value>> {
    let date = query
        .date
        .unwrap_or_else(|| chrono::Utc::now().format("%Y-%m-%d").to_string());

    let cache_key = format!("orders_summary:{}:{}", user.organization_id, date);
    if let Some(cached) = state.cache.get(&cache_key).await {
        let value: Value = serde_json::from_str(&cached)
            .map_err(|e| AppError::internal(format!("Corrupt cache entry: {e}")))?;
        return Ok(Json(value));
    }

    let repo = OrderRepository::new(state.db.clone());
    let rows = repo.daily_summary(&user.organization_id, &date).await?;

    let value = serde_json::json!({ "date": date, "by_status": rows });
    state
        .cache
        .set(cache_key, value.to_string(), SUMMARY_CACHE_TTL)
        .await;
    Ok(Json(value))
}
