//! Order Model
//!
//! The central aggregate: an order is created from a cart snapshot and
//! driven through payment reconciliation and shipper delivery. Line items
//! are frozen at creation time; the total is never recomputed from the
//! live catalog.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Order workflow status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum OrderStatus {
    Pending,
    Approved,
    Shipping,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Shipping => "SHIPPING",
            Self::Delivered => "DELIVERED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// DELIVERED and CANCELLED accept no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Legal forward moves of the workflow state machine.
    ///
    /// APPROVED is an administrative intermediate: nothing produces it
    /// automatically, but it is a valid stop between PENDING and SHIPPING.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Approved)
                | (Pending, Shipping)
                | (Pending, Cancelled)
                | (Approved, Shipping)
                | (Approved, Cancelled)
                | (Shipping, Delivered)
        )
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the customer pays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum PaymentMethod {
    Online,
    Cod,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "ONLINE",
            Self::Cod => "COD",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment settlement state
///
/// Online orders move PENDING -> PAID | FAILED; COD orders are COD_PAID
/// from creation. REFUNDED is reachable as a value but has no modeled
/// transition in this layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum PaymentStatus {
    Pending,
    Paid,
    CodPaid,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Paid => "PAID",
            Self::CodPaid => "COD_PAID",
            Self::Failed => "FAILED",
            Self::Refunded => "REFUNDED",
        }
    }

    /// Settled payments imply inventory was committed for the order
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Paid | Self::CodPaid)
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Owner of a cart or order: a registered user or an anonymous session.
///
/// At most one identity is authoritative at a time; a logged-in override
/// may be attached to a session order after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnerIdentity {
    User(i64),
    Session(String),
}

impl OwnerIdentity {
    /// Canonical cart key (`user:<id>` / `session:<sid>`)
    pub fn cart_key(&self) -> String {
        match self {
            Self::User(id) => format!("user:{id}"),
            Self::Session(sid) => format!("session:{sid}"),
        }
    }

    pub fn user_id(&self) -> Option<i64> {
        match self {
            Self::User(id) => Some(*id),
            Self::Session(_) => None,
        }
    }

    pub fn session_id(&self) -> Option<&str> {
        match self {
            Self::User(_) => None,
            Self::Session(sid) => Some(sid),
        }
    }
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    /// Human-facing unique order number (ORD + millis + 4 digits)
    pub order_no: String,
    pub user_id: Option<i64>,
    pub session_id: Option<String>,
    /// Recipient fields may be blank for an online-payment placeholder
    pub recipient_name: Option<String>,
    pub recipient_phone: Option<String>,
    pub shipping_address: Option<String>,
    pub note: Option<String>,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    /// Frozen sum of line-item snapshots, in currency units
    pub total_amount: f64,
    /// Fulfillment agent, assigned once
    pub shipper_id: Option<i64>,
    /// Gateway transaction id, present only once payment is confirmed
    pub transaction_id: Option<String>,
    pub paid_at: Option<i64>,
    pub delivered_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Immutable line-item snapshot captured at order creation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    /// Product name at order time
    pub product_name: String,
    /// Unit price at order time, in currency units
    pub unit_price: f64,
    pub quantity: i64,
}

impl OrderItem {
    pub fn line_total(&self) -> f64 {
        self.unit_price * self.quantity as f64
    }
}

/// Order with its line items (detail views)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Delivery recipient details
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecipientInfo {
    #[validate(length(min = 1, message = "recipient name is required"))]
    pub recipient_name: String,
    #[validate(length(min = 1, message = "recipient phone is required"))]
    pub recipient_phone: String,
    #[validate(length(min = 1, message = "shipping address is required"))]
    pub shipping_address: String,
    pub note: Option<String>,
}

/// Online checkout payload: recipient details may be supplied later,
/// the order starts as a payment placeholder
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OnlineCheckout {
    pub user_id: Option<i64>,
    pub session_id: Option<String>,
    #[validate(nested)]
    pub recipient: Option<RecipientInfo>,
}

/// COD checkout payload: recipient details are mandatory, `user_id` can
/// attach a logged-in owner to a session cart
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CodCheckout {
    pub user_id: Option<i64>,
    pub session_id: Option<String>,
    #[validate(nested)]
    pub recipient: RecipientInfo,
}

/// Administrative status override payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: OrderStatus,
}

/// Shipper accept/deliver payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipperAction {
    pub shipper_id: i64,
}

/// Per-status order counts
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusCounts {
    pub pending: i64,
    pub approved: i64,
    pub shipping: i64,
    pub delivered: i64,
    pub cancelled: i64,
}

/// Shipper performance summary (COD deliveries only)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ShipperStats {
    pub delivered_count: i64,
    pub cod_collected: f64,
}
