//! Lifecycle status enums
//!
//! Every status column in the database stores the snake_case wire form of
//! these enums. Order and item transitions are constrained by an explicit
//! transition table instead of caller discipline: an update request that is
//! not in the table is rejected before anything is written.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Order lifecycle.
///
/// `pending → confirmed → preparing → ready → served → paid`, with
/// `cancelled` reachable from every non-terminal state. `paid` and
/// `cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Ready,
    Served,
    Paid,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Served => "served",
            OrderStatus::Paid => "paid",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Terminal states accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Paid | OrderStatus::Cancelled)
    }

    /// Whether the order still occupies its table.
    ///
    /// `served` and `paid` no longer hold the table; neither does a
    /// cancelled order.
    pub fn is_active(&self) -> bool {
        !matches!(
            self,
            OrderStatus::Served | OrderStatus::Paid | OrderStatus::Cancelled
        )
    }

    /// Explicit transition table.
    ///
    /// Forward one step along the happy path, or `cancelled` from any
    /// non-terminal state. Anything else is an illegal jump.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        if next == OrderStatus::Cancelled {
            return !self.is_terminal();
        }
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::Confirmed)
                | (OrderStatus::Confirmed, OrderStatus::Preparing)
                | (OrderStatus::Preparing, OrderStatus::Ready)
                | (OrderStatus::Ready, OrderStatus::Served)
                | (OrderStatus::Served, OrderStatus::Paid)
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "confirmed" => Ok(OrderStatus::Confirmed),
            "preparing" => Ok(OrderStatus::Preparing),
            "ready" => Ok(OrderStatus::Ready),
            "served" => Ok(OrderStatus::Served),
            "paid" => Ok(OrderStatus::Paid),
            "cancelled" => Ok(OrderStatus::Cancelled),
            _ => Err(ParseStatusError(s.to_string())),
        }
    }
}

/// Order item preparation progress. Forward-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum OrderItemStatus {
    Pending,
    Preparing,
    Ready,
}

impl OrderItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderItemStatus::Pending => "pending",
            OrderItemStatus::Preparing => "preparing",
            OrderItemStatus::Ready => "ready",
        }
    }

    /// Items only move forward: `pending → preparing → ready`.
    pub fn can_transition_to(&self, next: OrderItemStatus) -> bool {
        matches!(
            (self, next),
            (OrderItemStatus::Pending, OrderItemStatus::Preparing)
                | (OrderItemStatus::Pending, OrderItemStatus::Ready)
                | (OrderItemStatus::Preparing, OrderItemStatus::Ready)
        )
    }
}

impl fmt::Display for OrderItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dining table occupancy status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum TableStatus {
    Available,
    Occupied,
    Reserved,
    Cleaning,
    OutOfOrder,
}

impl TableStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableStatus::Available => "available",
            TableStatus::Occupied => "occupied",
            TableStatus::Reserved => "reserved",
            TableStatus::Cleaning => "cleaning",
            TableStatus::OutOfOrder => "out_of_order",
        }
    }
}

impl fmt::Display for TableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Product sale status.
///
/// `withdrawn` is the industry "86'd": temporarily pulled from sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum ProductStatus {
    Available,
    Unavailable,
    Withdrawn,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Available => "available",
            ProductStatus::Unavailable => "unavailable",
            ProductStatus::Withdrawn => "withdrawn",
        }
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum PaymentMethod {
    Cash,
    Card,
    Mobile,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Mobile => "mobile",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for parsing a status string.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown status: {0}")]
pub struct ParseStatusError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_happy_path_transitions() {
        use OrderStatus::*;
        let path = [Pending, Confirmed, Preparing, Ready, Served, Paid];
        for w in path.windows(2) {
            assert!(w[0].can_transition_to(w[1]), "{} -> {}", w[0], w[1]);
        }
    }

    #[test]
    fn order_illegal_jumps_rejected() {
        use OrderStatus::*;
        assert!(!Pending.can_transition_to(Served));
        assert!(!Pending.can_transition_to(Ready));
        assert!(!Confirmed.can_transition_to(Served));
        assert!(!Ready.can_transition_to(Paid));
        // Terminal states accept nothing
        assert!(!Paid.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Pending));
        assert!(!Cancelled.can_transition_to(Cancelled));
    }

    #[test]
    fn cancel_from_any_non_terminal() {
        use OrderStatus::*;
        for s in [Pending, Confirmed, Preparing, Ready, Served] {
            assert!(s.can_transition_to(Cancelled), "{} -> cancelled", s);
        }
    }

    #[test]
    fn item_transitions_forward_only() {
        use OrderItemStatus::*;
        assert!(Pending.can_transition_to(Preparing));
        assert!(Pending.can_transition_to(Ready));
        assert!(Preparing.can_transition_to(Ready));
        assert!(!Ready.can_transition_to(Pending));
        assert!(!Ready.can_transition_to(Preparing));
        assert!(!Preparing.can_transition_to(Pending));
    }

    #[test]
    fn wire_format_is_snake_case() {
        assert_eq!(
            serde_json::to_string(&TableStatus::OutOfOrder).unwrap(),
            "\"out_of_order\""
        );
        assert_eq!(
            serde_json::from_str::<OrderStatus>("\"preparing\"").unwrap(),
            OrderStatus::Preparing
        );
        assert_eq!(ProductStatus::Withdrawn.as_str(), "withdrawn");
    }

    #[test]
    fn active_status_holds_table() {
        use OrderStatus::*;
        for s in [Pending, Confirmed, Preparing, Ready] {
            assert!(s.is_active());
        }
        for s in [Served, Paid, Cancelled] {
            assert!(!s.is_active());
        }
    }
}
