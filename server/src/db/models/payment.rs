//! Payment Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::status::PaymentMethod;
use validator::Validate;

/// Payment row. An order may carry several partial payments;
/// it flips to `paid` once they cover the total.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Payment {
    pub id: String,
    pub order_id: String,
    pub cashier_id: Option<String>,
    pub method: PaymentMethod,
    pub amount: f64,
    pub tip_amount: f64,
    pub change_amount: f64,
    pub processed_at: DateTime<Utc>,
}

/// Record payment payload
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePaymentRequest {
    pub method: PaymentMethod,
    #[validate(range(min = 0.01))]
    pub amount: f64,
    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub tip_amount: f64,
}
