//! Order Models
//!
//! 订单行类型与下单/改状态的请求载荷。金额字段在写入前已经
//! 按两位小数四舍五入，读出即是展示值。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::status::{OrderItemStatus, OrderStatus};
use validator::Validate;

/// Order row
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Order {
    pub id: String,
    pub organization_id: String,
    pub order_number: String,
    pub table_id: Option<String>,
    pub waiter_id: Option<String>,
    pub customer_name: Option<String>,
    pub guest_count: i64,
    pub status: OrderStatus,
    pub subtotal: f64,
    pub tax_amount: f64,
    pub service_charge: f64,
    pub total_amount: f64,
    pub notes: Option<String>,
    pub estimated_ready_time: Option<DateTime<Utc>>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub ready_at: Option<DateTime<Utc>>,
    pub served_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Order line row
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub total_price: f64,
    pub status: OrderItemStatus,
    pub notes: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Chosen modifier option on an order line
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderItemModifier {
    pub id: String,
    pub order_item_id: String,
    pub modifier_option_id: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub total_price: f64,
}

/// List entry: order plus its line count, kitchen displays sort on this
#[derive(Debug, Clone, Serialize)]
pub struct OrderListEntry {
    #[serde(flatten)]
    pub order: Order,
    pub item_count: i64,
}

/// Order line with product name and chosen modifiers
#[derive(Debug, Clone, Serialize)]
pub struct OrderItemWithModifiers {
    #[serde(flatten)]
    pub item: OrderItem,
    pub product_name: String,
    pub modifiers: Vec<OrderItemModifier>,
}

/// Full order graph for `GET /orders/{id}` and the `newOrder` broadcast
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItemWithModifiers>,
    pub payments: Vec<super::payment::Payment>,
}

/// List filter for `GET /orders`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderListQuery {
    pub status: Option<OrderStatus>,
    pub table_id: Option<String>,
    pub waiter_id: Option<String>,
    /// ISO date (YYYY-MM-DD); restricts to orders created that day
    pub date: Option<String>,
}

/// Aggregated line for the daily summary endpoint
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderSummaryRow {
    pub status: OrderStatus,
    pub order_count: i64,
    pub total_amount: f64,
}

// ========== Request payloads ==========

/// Submit order payload
#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderRequest {
    pub table_id: Option<String>,
    #[validate(length(max = 200))]
    pub customer_name: Option<String>,
    #[validate(range(min = 1, max = 50))]
    #[serde(default = "default_guest_count")]
    pub guest_count: i64,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
    #[validate(length(min = 1), nested)]
    pub items: Vec<CreateOrderItemRequest>,
}

fn default_guest_count() -> i64 {
    1
}

/// One line in a submit-order payload
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateOrderItemRequest {
    pub product_id: String,
    #[validate(range(min = 1, max = 99))]
    pub quantity: i64,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
    #[serde(default)]
    pub modifiers: Vec<CreateOrderItemModifier>,
}

/// Chosen modifier option in a submit-order payload
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateOrderItemModifier {
    pub modifier_option_id: String,
    #[serde(default = "default_modifier_quantity")]
    pub quantity: i64,
}

fn default_modifier_quantity() -> i64 {
    1
}

/// Order status change payload
#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

/// Item status change payload
#[derive(Debug, Deserialize)]
pub struct UpdateItemStatusRequest {
    pub status: OrderItemStatus,
}
