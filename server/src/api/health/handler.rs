//! Health Check Handler

use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::core::ServerState;
use crate::utils::AppResult;

/// GET /api/v1/health - 存活与数据库连通性
pub async fn health(State(state): State<ServerState>) -> AppResult<Json<Value>> {
    let db_ok = sqlx::query("SELECT 1").execute(&state.db).await.is_ok();

    Ok(Json(json!({
        "status": if db_ok { "ok" } else { "degraded" },
        "database": db_ok,
        "timestamp": chrono::Utc::now(),
    })))
}
