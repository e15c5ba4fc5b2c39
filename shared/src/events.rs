//! Realtime event payloads
//!
//! Server-to-client events carried over the Socket.IO relay. Event names are
//! camelCase on the wire (the dashboard and kitchen displays consume them
//! directly), so payload fields are renamed accordingly.
//!
//! Delivery is at-most-once and best-effort: a disconnected client misses
//! events until it reconnects and re-fetches state over REST.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::status::{OrderItemStatus, OrderStatus, ProductStatus, TableStatus};

/// Server-emitted event names.
pub mod event {
    pub const NEW_ORDER: &str = "newOrder";
    pub const ORDER_STATUS_CHANGED: &str = "orderStatusChanged";
    pub const ORDER_ITEM_STATUS_CHANGED: &str = "orderItemStatusChanged";
    pub const TABLE_STATUS_CHANGED: &str = "tableStatusChanged";
    pub const PRODUCT_STATUS_CHANGED: &str = "productStatusChanged";
    pub const WAITER_CALLED: &str = "waiterCalled";
    pub const INVENTORY_ALERT: &str = "inventoryAlert";
    pub const ERROR: &str = "error";
}

/// Client-emitted event names.
pub mod client_event {
    pub const UPDATE_ORDER_ITEM_STATUS: &str = "updateOrderItemStatus";
    pub const UPDATE_TABLE_STATUS: &str = "updateTableStatus";
    pub const UPDATE_PRODUCT_AVAILABILITY: &str = "updateProductAvailability";
    pub const CALL_WAITER: &str = "callWaiter";
    pub const INVENTORY_ALERT: &str = "inventoryAlert";
}

/// `newOrder` — a fully assembled order graph, as returned by the create
/// endpoint, so kitchen displays need no follow-up fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrderEvent {
    pub order: Value,
    pub timestamp: DateTime<Utc>,
}

/// `orderStatusChanged`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusChangedEvent {
    pub order_id: String,
    pub order_number: String,
    pub status: OrderStatus,
    pub timestamp: DateTime<Utc>,
}

/// `orderItemStatusChanged`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemStatusChangedEvent {
    pub order_item_id: String,
    pub order_id: String,
    pub order_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_id: Option<String>,
    pub status: OrderItemStatus,
    pub timestamp: DateTime<Utc>,
}

/// `tableStatusChanged`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableStatusChangedEvent {
    pub table_id: String,
    pub table_number: i64,
    pub status: TableStatus,
    pub timestamp: DateTime<Utc>,
}

/// `productStatusChanged`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductStatusChangedEvent {
    pub product_id: String,
    pub product_name: String,
    pub status: ProductStatus,
    pub timestamp: DateTime<Utc>,
}

/// `waiterCalled` — fanned out to waiter and manager role rooms.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaiterCalledEvent {
    pub table_id: String,
    pub table_number: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// `inventoryAlert` — free-form payload relayed to manager rooms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryAlertEvent {
    #[serde(flatten)]
    pub data: Value,
    pub timestamp: DateTime<Utc>,
}

/// `error` — sent back to the offending socket only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocketErrorEvent {
    pub message: String,
}
