//! Shared types for the TapTab POS stack
//!
//! Types used by both the server and its clients: lifecycle status enums,
//! realtime event payloads, and stable error codes. Wire format is JSON
//! everywhere, so everything here derives Serialize/Deserialize.

pub mod error;
pub mod events;
pub mod status;

// Re-exports
pub use error::ErrorCode;
pub use serde::{Deserialize, Serialize};
pub use status::{OrderItemStatus, OrderStatus, PaymentMethod, ProductStatus, TableStatus};
