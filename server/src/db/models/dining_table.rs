//! Dining Table Model

use serde::{Deserialize, Serialize};
use shared::status::TableStatus;
use validator::Validate;

/// Dining table entity (桌台)
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DiningTable {
    pub id: String,
    pub organization_id: String,
    pub number: i64,
    pub name: Option<String>,
    pub capacity: i64,
    pub status: TableStatus,
}

/// Table with its active orders, as served by the floor-plan endpoint
#[derive(Debug, Clone, Serialize)]
pub struct TableWithOrders {
    #[serde(flatten)]
    pub table: DiningTable,
    pub active_orders: Vec<super::order::Order>,
}

/// Create table payload
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTableRequest {
    #[validate(range(min = 1))]
    pub number: i64,
    #[validate(length(max = 100))]
    pub name: Option<String>,
    #[validate(range(min = 1, max = 50))]
    pub capacity: Option<i64>,
}

/// Status change payload
#[derive(Debug, Deserialize)]
pub struct UpdateTableStatusRequest {
    pub status: TableStatus,
}
