//! Product API Handlers
//!
//! 读路径走缓存：列表键 `products:<org>:<query>` (300 秒)，详情键
//! `product:<id>` (600 秒)。任何目录写操作删除详情键并按前缀清掉
//! 本租户的列表缓存。

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use chrono::Utc;
use serde_json::Value;

use shared::ErrorCode;
use shared::events::{ProductStatusChangedEvent, event};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{
    CreateProductRequest, ProductListQuery, UpdateProductRequest, UpdateProductStatusRequest,
};
use crate::db::repository::ProductRepository;
use crate::utils::{AppError, AppResult};
use validator::Validate;

/// 列表缓存 TTL (秒)
const LIST_CACHE_TTL: u64 = 300;
/// 详情缓存 TTL (秒)
const DETAIL_CACHE_TTL: u64 = 600;

fn list_cache_key(org_id: &str, query: &ProductListQuery) -> String {
    let query_json = serde_json::to_string(query).unwrap_or_default();
    format!("products:{org_id}:{query_json}")
}

fn detail_cache_key(product_id: &str) -> String {
    format!("product:{product_id}")
}

async fn invalidate_catalog_cache(state: &ServerState, org_id: &str, product_id: &str) {
    state.cache.delete(&detail_cache_key(product_id)).await;
    state.cache.delete_prefix(&format!("products:{org_id}:"));
}

/// GET /api/v1/products - 商品列表 (带查询过滤，缓存 300 秒)
pub async fn list(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<ProductListQuery>,
) -> AppResult<Json<Value>> {
    let cache_key = list_cache_key(&user.organization_id, &query);
    if let Some(cached) = state.cache.get(&cache_key).await {
        let value: Value = serde_json::from_str(&cached)
            .map_err(|e| AppError::internal(format!("Corrupt cache entry: {e}")))?;
        return Ok(Json(value));
    }

    let repo = ProductRepository::new(state.db.clone());
    let products = repo.find_all(&user.organization_id, &query).await?;

    let value = serde_json::to_value(&products)
        .map_err(|e| AppError::internal(format!("Serialization failed: {e}")))?;
    state
        .cache
        .set(cache_key, value.to_string(), LIST_CACHE_TTL)
        .await;
    Ok(Json(value))
}

/// GET /api/v1/products/{id} - 商品详情含修饰符 (缓存 600 秒)
pub async fn get_by_id(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    let cache_key = detail_cache_key(&id);
    if let Some(cached) = state.cache.get(&cache_key).await {
        let value: Value = serde_json::from_str(&cached)
            .map_err(|e| AppError::internal(format!("Corrupt cache entry: {e}")))?;
        // 缓存按商品 ID 键入，租户校验不能省
        if value.get("organization_id").and_then(Value::as_str) == Some(user.organization_id.as_str())
        {
            return Ok(Json(value));
        }
    }

    let repo = ProductRepository::new(state.db.clone());
    let product = repo
        .find_with_modifiers(&user.organization_id, &id)
        .await?
        .ok_or_else(|| {
            AppError::not_found(ErrorCode::ProductNotFound, format!("Product {id} not found"))
        })?;

    let value = serde_json::to_value(&product)
        .map_err(|e| AppError::internal(format!("Serialization failed: {e}")))?;
    state
        .cache
        .set(cache_key, value.to_string(), DETAIL_CACHE_TTL)
        .await;
    Ok(Json(value))
}

/// POST /api/v1/products - 创建商品 (含嵌套修饰符)
pub async fn create(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<CreateProductRequest>,
) -> AppResult<Json<Value>> {
    req.validate()?;

    let repo = ProductRepository::new(state.db.clone());
    let created = repo.create(&user.organization_id, req).await?;

    invalidate_catalog_cache(&state, &user.organization_id, &created.product.id).await;

    let value = serde_json::to_value(&created)
        .map_err(|e| AppError::internal(format!("Serialization failed: {e}")))?;
    Ok(Json(value))
}

/// PUT /api/v1/products/{id} - 更新商品基础字段
pub async fn update(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(req): Json<UpdateProductRequest>,
) -> AppResult<Json<Value>> {
    req.validate()?;

    let repo = ProductRepository::new(state.db.clone());
    let updated = repo
        .update(&user.organization_id, &id, req)
        .await?
        .ok_or_else(|| {
            AppError::not_found(ErrorCode::ProductNotFound, format!("Product {id} not found"))
        })?;

    invalidate_catalog_cache(&state, &user.organization_id, &id).await;

    let value = serde_json::to_value(&updated)
        .map_err(|e| AppError::internal(format!("Serialization failed: {e}")))?;
    Ok(Json(value))
}

/// PATCH /api/v1/products/{id}/status - 可售状态切换 + 广播
pub async fn update_status(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(req): Json<UpdateProductStatusRequest>,
) -> AppResult<Json<Value>> {
    let repo = ProductRepository::new(state.db.clone());
    let updated = repo
        .set_status(&user.organization_id, &id, req.status)
        .await?
        .ok_or_else(|| {
            AppError::not_found(ErrorCode::ProductNotFound, format!("Product {id} not found"))
        })?;

    invalidate_catalog_cache(&state, &user.organization_id, &id).await;

    state
        .relay
        .emit_to_org(
            &user.organization_id,
            event::PRODUCT_STATUS_CHANGED,
            &ProductStatusChangedEvent {
                product_id: updated.id.clone(),
                product_name: updated.name.clone(),
                status: req.status,
                timestamp: Utc::now(),
            },
        )
        .await;

    let value = serde_json::to_value(&updated)
        .map_err(|e| AppError::internal(format!("Serialization failed: {e}")))?;
    Ok(Json(value))
}

/// DELETE /api/v1/products/{id} - 删除；有订单引用时降级为停用
pub async fn delete(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    let repo = ProductRepository::new(state.db.clone());
    let hard_deleted = repo
        .delete(&user.organization_id, &id)
        .await?
        .ok_or_else(|| {
            AppError::not_found(ErrorCode::ProductNotFound, format!("Product {id} not found"))
        })?;

    invalidate_catalog_cache(&state, &user.organization_id, &id).await;

    let message = if hard_deleted {
        "Product deleted"
    } else {
        "Product deactivated (referenced by order history)"
    };
    Ok(Json(serde_json::json!({ "message": message })))
}
