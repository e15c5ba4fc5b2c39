//! Database Models
//!
//! Row types (`sqlx::FromRow`) plus the request/response DTOs the API layer
//! deserializes. Money is stored as REAL and rounded through
//! [`crate::orders::money`] before it is written.

pub mod dining_table;
pub mod order;
pub mod organization;
pub mod payment;
pub mod product;
pub mod user;

pub use dining_table::{CreateTableRequest, DiningTable, TableWithOrders, UpdateTableStatusRequest};
pub use order::{
    CreateOrderItemModifier, CreateOrderItemRequest, CreateOrderRequest, Order, OrderDetail,
    OrderItem, OrderItemModifier, OrderItemWithModifiers, OrderListEntry, OrderListQuery,
    OrderSummaryRow,
    UpdateItemStatusRequest, UpdateOrderStatusRequest,
};
pub use organization::Organization;
pub use payment::{CreatePaymentRequest, Payment};
pub use product::{
    CreateModifierOption, CreateProductModifier, CreateProductRequest, ModifierOption, Product,
    ProductListQuery, ProductModifier, ProductModifierWithOptions, ProductWithModifiers,
    UpdateProductRequest, UpdateProductStatusRequest,
};
pub use user::{LoginRequest, RefreshRequest, User, UserProfile};
