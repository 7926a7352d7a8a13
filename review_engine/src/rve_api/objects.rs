use std::fmt::Display;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::db_types::OrderId;

//--------------------------------------    IngestSummary    ----------------------------------------------------------
/// Result of one ingestion run. `fetched` counts orders retrieved from the marketplace; `processed` counts
/// orders actually stored (new, with a usable customer phone).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct IngestSummary {
    pub fetched: usize,
    pub processed: usize,
}

//--------------------------------------   DispatchOutcome   ----------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SendOutcome {
    /// The message was handed to the gateway.
    Sent,
    /// The send failed (policy violation, gateway error, or bookkeeping error).
    Failed,
    /// Another dispatcher claimed the order first; nothing was attempted.
    Skipped,
}

impl Display for SendOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SendOutcome::Sent => write!(f, "sent"),
            SendOutcome::Failed => write!(f, "failed"),
            SendOutcome::Skipped => write!(f, "skipped"),
        }
    }
}

/// Per-order result of a dispatch batch. Individual failures are reported here, never raised.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchOutcome {
    pub order_id: OrderId,
    pub outcome: SendOutcome,
    pub error: Option<String>,
}

//--------------------------------------  NotificationStats  ----------------------------------------------------------
/// Counts of orders by notification status. Best-effort: a backend read failure degrades to zero counts.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct NotificationStats {
    pub pending: i64,
    pub sent: i64,
    pub delivered: i64,
    pub read: i64,
    pub failed: i64,
}

impl NotificationStats {
    pub fn total(&self) -> i64 {
        self.pending + self.sent + self.delivered + self.read + self.failed
    }
}

//--------------------------------------      DailyStats     ----------------------------------------------------------
/// Notification counts for a single day. Series produced by the backend are zero-filled and ascending.
#[derive(Debug, Clone, Copy, FromRow, Serialize, Deserialize)]
pub struct DailyStats {
    pub day: NaiveDate,
    pub pending: i64,
    pub sent: i64,
    pub delivered: i64,
    pub read: i64,
    pub failed: i64,
}

impl DailyStats {
    pub fn empty(day: NaiveDate) -> Self {
        Self { day, pending: 0, sent: 0, delivered: 0, read: 0, failed: 0 }
    }

    pub fn total(&self) -> i64 {
        self.pending + self.sent + self.delivered + self.read + self.failed
    }
}
