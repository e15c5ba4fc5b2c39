//! Product Catalog Models
//!
//! 商品、修饰符与选项。修饰符选项的价格调整参与订单定价。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::status::ProductStatus;
use validator::Validate;

/// Product row
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Product {
    pub id: String,
    pub organization_id: String,
    pub name: String,
    pub sku: Option<String>,
    pub price: f64,
    pub status: ProductStatus,
    pub prep_time_minutes: Option<i64>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Modifier group attached to a product (e.g. "Size", "Toppings")
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProductModifier {
    pub id: String,
    pub product_id: String,
    pub name: String,
    pub is_active: bool,
}

/// A selectable option inside a modifier group
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ModifierOption {
    pub id: String,
    pub modifier_id: String,
    pub name: String,
    pub price_adjustment: f64,
    pub is_active: bool,
}

/// Modifier group with its options, as served by the detail endpoint
#[derive(Debug, Clone, Serialize)]
pub struct ProductModifierWithOptions {
    #[serde(flatten)]
    pub modifier: ProductModifier,
    pub options: Vec<ModifierOption>,
}

/// Full product graph for `GET /products/{id}`
#[derive(Debug, Clone, Serialize)]
pub struct ProductWithModifiers {
    #[serde(flatten)]
    pub product: Product,
    pub modifiers: Vec<ProductModifierWithOptions>,
}

/// List filter (also embedded verbatim in the list cache key)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProductListQuery {
    pub status: Option<ProductStatus>,
    pub search: Option<String>,
    /// Include deactivated products; defaults to false
    pub include_inactive: Option<bool>,
}

/// Create product payload
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 64))]
    pub sku: Option<String>,
    #[validate(range(min = 0.0))]
    pub price: f64,
    #[validate(range(min = 0, max = 480))]
    pub prep_time_minutes: Option<i64>,
    #[validate(nested)]
    #[serde(default)]
    pub modifiers: Vec<CreateProductModifier>,
}

/// Nested modifier group in a create request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductModifier {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(nested)]
    #[serde(default)]
    pub options: Vec<CreateModifierOption>,
}

/// Nested modifier option in a create request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateModifierOption {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(default)]
    pub price_adjustment: f64,
}

/// Update product payload (partial)
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 64))]
    pub sku: Option<String>,
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
    #[validate(range(min = 0, max = 480))]
    pub prep_time_minutes: Option<i64>,
}

/// Availability toggle payload
#[derive(Debug, Deserialize)]
pub struct UpdateProductStatusRequest {
    pub status: ProductStatus,
}
