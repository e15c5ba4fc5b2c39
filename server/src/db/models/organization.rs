//! Organization Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tenant entity. Tax and service charge rates are fractions
/// (`0.08` means 8%) and feed straight into order pricing.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Organization {
    pub id: String,
    pub name: String,
    pub tax_rate: f64,
    pub service_charge_rate: f64,
    pub created_at: DateTime<Utc>,
}
