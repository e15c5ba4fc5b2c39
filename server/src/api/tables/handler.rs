//! Dining Table API Handlers

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use chrono::Utc;

use shared::ErrorCode;
use shared::events::{TableStatusChangedEvent, event};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{
    CreateTableRequest, DiningTable, TableWithOrders, UpdateTableStatusRequest,
};
use crate::db::repository::DiningTableRepository;
use crate::utils::{AppError, AppResult};
use validator::Validate;

/// GET /api/v1/tables - 桌台全景 (含每桌未完结订单)
pub async fn list(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<TableWithOrders>>> {
    let repo = DiningTableRepository::new(state.db.clone());
    let tables = repo.find_all_with_orders(&user.organization_id).await?;
    Ok(Json(tables))
}

/// GET /api/v1/tables/{id} - 单桌详情
pub async fn get_by_id(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<TableWithOrders>> {
    let repo = DiningTableRepository::new(state.db.clone());
    let table = repo
        .find_by_id(&user.organization_id, &id)
        .await?
        .ok_or_else(|| {
            AppError::not_found(ErrorCode::TableNotFound, format!("Table {id} not found"))
        })?;
    let active_orders = repo.active_orders(&table.id).await?;
    Ok(Json(TableWithOrders {
        table,
        active_orders,
    }))
}

/// POST /api/v1/tables - 新增桌台
pub async fn create(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<CreateTableRequest>,
) -> AppResult<Json<DiningTable>> {
    req.validate()?;

    let repo = DiningTableRepository::new(state.db.clone());
    let table = repo.create(&user.organization_id, req).await?;
    Ok(Json(table))
}

/// PATCH /api/v1/tables/{id}/status - 状态切换 + 广播
pub async fn update_status(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(req): Json<UpdateTableStatusRequest>,
) -> AppResult<Json<DiningTable>> {
    let repo = DiningTableRepository::new(state.db.clone());
    let table = repo
        .set_status(&user.organization_id, &id, req.status)
        .await?
        .ok_or_else(|| {
            AppError::not_found(ErrorCode::TableNotFound, format!("Table {id} not found"))
        })?;

    state
        .relay
        .emit_to_org(
            &user.organization_id,
            event::TABLE_STATUS_CHANGED,
            &TableStatusChangedEvent {
                table_id: table.id.clone(),
                table_number: table.number,
                status: req.status,
                timestamp: Utc::now(),
            },
        )
        .await;

    Ok(Json(table))
}

/// DELETE /api/v1/tables/{id} - 删除空闲桌台
pub async fn delete(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let repo = DiningTableRepository::new(state.db.clone());
    repo.delete(&user.organization_id, &id)
        .await?
        .ok_or_else(|| {
            AppError::not_found(ErrorCode::TableNotFound, format!("Table {id} not found"))
        })?;
    Ok(Json(serde_json::json!({ "message": "Table deleted" })))
}
