use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use log::error;
use rvg_common::Money;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

//--------------------------------------        OrderId        --------------------------------------------------------
/// The order identifier assigned by the marketplace. Globally unique; used as the idempotency key for ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct OrderId(pub String);

impl FromStr for OrderId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl OrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------  NotificationStatus  ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum NotificationStatus {
    /// The order has been ingested and no send has been attempted yet.
    Pending,
    /// A dispatcher has claimed the order and a send is in flight.
    Processing,
    /// The review request was handed to the messaging gateway.
    Sent,
    /// The gateway reported delivery to the recipient's device.
    Delivered,
    /// The recipient opened the message.
    Read,
    /// The last send attempt failed. Eligible for retry.
    Failed,
}

impl Display for NotificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationStatus::Pending => write!(f, "Pending"),
            NotificationStatus::Processing => write!(f, "Processing"),
            NotificationStatus::Sent => write!(f, "Sent"),
            NotificationStatus::Delivered => write!(f, "Delivered"),
            NotificationStatus::Read => write!(f, "Read"),
            NotificationStatus::Failed => write!(f, "Failed"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid notification status: {0}")]
pub struct ConversionError(String);

impl FromStr for NotificationStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Processing" => Ok(Self::Processing),
            "Sent" => Ok(Self::Sent),
            "Delivered" => Ok(Self::Delivered),
            "Read" => Ok(Self::Read),
            "Failed" => Ok(Self::Failed),
            s => Err(ConversionError(s.to_string())),
        }
    }
}

impl From<String> for NotificationStatus {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid notification status: {value}. But this conversion cannot fail. Defaulting to Pending");
            NotificationStatus::Pending
        })
    }
}

//--------------------------------------        Order        ----------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub order_id: OrderId,
    pub order_date: DateTime<Utc>,
    pub customer_name: Option<String>,
    pub customer_phone: String,
    /// The marketplace lifecycle state, e.g. "NEW" or "COMPLETED". Owned by the marketplace, stored verbatim.
    pub status: String,
    pub amount: Money,
    pub notification_status: NotificationStatus,
    pub notification_sent_at: Option<DateTime<Utc>>,
    pub last_notification_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Line items, loaded with a follow-up query. Not part of the `orders` row itself.
    #[sqlx(skip)]
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_ref: i64,
    pub entry_id: String,
    pub product_id: String,
    pub name: String,
    pub code: Option<String>,
    pub quantity: i64,
    pub unit_price: Money,
    pub total_price: Money,
}

//--------------------------------------       NewOrder       ---------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewOrder {
    /// The order id as assigned by the marketplace
    pub order_id: OrderId,
    /// The time the order was created on the marketplace
    pub order_date: DateTime<Utc>,
    pub customer_name: Option<String>,
    /// Normalized (digits-only) customer phone number
    pub customer_phone: String,
    pub status: String,
    pub amount: Money,
    pub items: Vec<NewOrderItem>,
}

#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub entry_id: String,
    pub product_id: String,
    pub name: String,
    pub code: Option<String>,
    pub quantity: i64,
    pub unit_price: Money,
    pub total_price: Money,
}

impl NewOrder {
    pub fn new(order_id: OrderId, customer_phone: String, amount: Money) -> Self {
        Self {
            order_id,
            order_date: Utc::now(),
            customer_name: None,
            customer_phone,
            status: "COMPLETED".to_string(),
            amount,
            items: Vec::new(),
        }
    }
}

//--------------------------------------     AllowedPhone     ---------------------------------------------------------
/// A phone number permitted to receive outbound messages. Dispatch to a phone that is not present *and*
/// active in this set fails closed.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AllowedPhone {
    pub id: i64,
    /// Digits only, unique
    pub phone: String,
    pub active: bool,
    pub description: Option<String>,
    /// Weak reference to the owning user. Lookup only, no ownership semantics.
    pub user_ref: Option<i64>,
    pub created_at: DateTime<Utc>,
}
