use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{
    db_types::{AllowedPhone, NewOrder, NotificationStatus, Order, OrderId},
    rve_api::objects::DailyStats,
};

/// Persistence contract for the review gateway.
///
/// Backends store orders keyed by the marketplace order id, the per-order notification state machine, and
/// the outbound-message allow-list. Ingestion creates `Pending` orders; the dispatcher claims and resolves
/// them; delivery callbacks move `Sent` orders onward.
#[allow(async_fn_in_trait)]
pub trait ReviewGatewayDatabase: Clone {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Stores the order, idempotently: if an order with the same marketplace order id already exists, the
    /// call is a no-op. Returns the internal row id and `true` if the order was inserted, `false` if it
    /// already existed.
    async fn insert_order(&self, order: NewOrder) -> Result<(i64, bool), ReviewGatewayError>;

    /// Fetches an order (with its items) by marketplace order id.
    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, ReviewGatewayError>;

    /// The de-dup gate used before insert. A race between this check and the insert is tolerated because
    /// [`Self::insert_order`] absorbs the unique-constraint violation.
    async fn order_exists(&self, order_id: &OrderId) -> Result<bool, ReviewGatewayError>;

    /// Up to `limit` orders in marketplace state `order_status` with notification status `Pending`, oldest
    /// order first.
    async fn fetch_pending_for_notification(
        &self,
        limit: u32,
        order_status: &str,
    ) -> Result<Vec<Order>, ReviewGatewayError>;

    /// Up to `limit` orders whose last send attempt failed, oldest order first.
    async fn fetch_failed_for_retry(&self, limit: u32) -> Result<Vec<Order>, ReviewGatewayError>;

    /// Compare-and-swap claim of an order for dispatch: `expected` → `Processing`. Returns `false` when the
    /// order was not in `expected` (another dispatcher got there first).
    async fn claim_for_dispatch(&self, id: i64, expected: NotificationStatus) -> Result<bool, ReviewGatewayError>;

    /// Records the outcome of a send attempt. Success clears the stored error; failure retains it.
    async fn update_notification(
        &self,
        id: i64,
        status: NotificationStatus,
        sent_at: Option<DateTime<Utc>>,
        error: Option<String>,
    ) -> Result<(), ReviewGatewayError>;

    /// Applies an externally reported delivery transition (`Delivered`/`Read`) without re-validating
    /// business state. Driven by provider callbacks, which are out of scope here.
    async fn record_delivery_status(
        &self,
        order_id: &OrderId,
        status: NotificationStatus,
    ) -> Result<(), ReviewGatewayError>;

    async fn count_by_notification_status(&self, status: NotificationStatus) -> Result<i64, ReviewGatewayError>;

    /// Per-day notification counts for the last `days` days, zero-filled and ascending by date. An empty
    /// store still yields `days` entries.
    async fn daily_counts(&self, days: u32) -> Result<Vec<DailyStats>, ReviewGatewayError>;

    /// Looks up a phone (normalized, digits only) in the allow-list.
    async fn fetch_allowed_phone(&self, phone: &str) -> Result<Option<AllowedPhone>, ReviewGatewayError>;

    /// `true` only when the phone is present *and* active.
    async fn is_phone_allowed(&self, phone: &str) -> Result<bool, ReviewGatewayError> {
        Ok(self.fetch_allowed_phone(phone).await?.map(|p| p.active).unwrap_or(false))
    }

    /// Inserts or re-activates an allow-list entry.
    async fn upsert_allowed_phone(
        &self,
        phone: &str,
        active: bool,
        description: Option<&str>,
        user_ref: Option<i64>,
    ) -> Result<AllowedPhone, ReviewGatewayError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), ReviewGatewayError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
pub enum ReviewGatewayError {
    #[error("We have an internal database engine error (configuration/uptime etc.): {0}")]
    DatabaseError(String),
    #[error("The requested order (internal id {0}) does not exist")]
    OrderIdNotFound(i64),
    #[error("The requested order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("Illegal notification status change: {0}")]
    StatusUpdateError(String),
}

impl From<sqlx::Error> for ReviewGatewayError {
    fn from(e: sqlx::Error) -> Self {
        ReviewGatewayError::DatabaseError(e.to_string())
    }
}
