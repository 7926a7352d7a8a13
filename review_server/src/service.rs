use chat_tools::ChatApi;
use chrono::{DateTime, Duration, Utc};
use log::*;
use merchant_tools::MerchantApi;
use review_engine::{
    db_types::NotificationStatus,
    DailyStats,
    DispatchApi,
    DispatchOutcome,
    IngestApi,
    IngestSummary,
    NotificationStats,
    ReviewGatewayDatabase,
    SqliteDatabase,
};

use crate::{config::ServerConfig, errors::ServerError, scheduler::SchedulerState};

/// `ReviewService` is the boundary exposed to the (out-of-scope) HTTP/CLI layer. It validates inputs,
/// caps limits, and delegates to the engine APIs. Manual dispatch through this service deliberately
/// bypasses the scheduler's time-window gate.
pub struct ReviewService {
    db: SqliteDatabase,
    ingest: IngestApi<SqliteDatabase, MerchantApi>,
    dispatch: DispatchApi<SqliteDatabase, ChatApi>,
    scheduler_state: SchedulerState,
    max_batch_limit: u32,
    max_fetch_span_days: i64,
}

impl ReviewService {
    pub fn new(config: &ServerConfig, db: SqliteDatabase, scheduler_state: SchedulerState) -> Result<Self, ServerError> {
        let merchant_api = MerchantApi::new(config.merchant_config.clone())
            .map_err(|e| ServerError::InitializeError("merchant API client".to_string(), e.to_string()))?;
        let chat_api = ChatApi::new(config.chat_config.clone())
            .map_err(|e| ServerError::InitializeError("messaging gateway client".to_string(), e.to_string()))?;
        let ingest = IngestApi::new(db.clone(), merchant_api);
        let mut dispatch = DispatchApi::new(db.clone(), chat_api);
        if let Some(template) = &config.message_template {
            dispatch = dispatch.with_template(template.clone());
        }
        Ok(Self {
            db,
            ingest,
            dispatch,
            scheduler_state,
            max_batch_limit: config.max_batch_limit,
            max_fetch_span_days: config.max_fetch_span_days,
        })
    }

    /// Fetches and ingests completed orders created in `[from, to]`. The range must be well-formed and no
    /// longer than the configured maximum span; invalid ranges are an explicit error, never a silent empty
    /// success.
    pub async fn fetch_and_ingest(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<IngestSummary, ServerError> {
        validate_range(from, to, self.max_fetch_span_days)?;
        Ok(self.ingest.fetch_and_ingest(from, to).await)
    }

    /// Operator-initiated dispatch. Shares the batch logic with the scheduled trigger but ignores the
    /// dispatch window.
    pub async fn dispatch_batch(&self, limit: u32) -> Result<Vec<DispatchOutcome>, ServerError> {
        let limit = self.cap_limit(limit);
        let outcomes = self.dispatch.dispatch_batch(limit).await?;
        Ok(outcomes)
    }

    /// Re-attempts previously failed review requests.
    pub async fn retry_failed(&self, limit: u32) -> Result<Vec<DispatchOutcome>, ServerError> {
        let limit = self.cap_limit(limit);
        let outcomes = self.dispatch.retry_failed(limit).await?;
        Ok(outcomes)
    }

    /// Admin-settable daily dispatch window. Returns `false` (previous window retained) on invalid input.
    pub fn set_dispatch_window(&self, start_hour: u8, end_hour: u8) -> bool {
        self.scheduler_state.set_window(start_hour, end_hour)
    }

    /// The ingest API this service was wired with. The scheduler workers clone it so that `main` has a
    /// single construction path for the engine APIs.
    pub fn ingest_api(&self) -> &IngestApi<SqliteDatabase, MerchantApi> {
        &self.ingest
    }

    /// The dispatch API this service was wired with. See [`Self::ingest_api`].
    pub fn dispatch_api(&self) -> &DispatchApi<SqliteDatabase, ChatApi> {
        &self.dispatch
    }

    /// Best-effort counts by notification status. A storage failure degrades the affected count to zero
    /// rather than failing the call; callers only need indicative statistics here.
    pub async fn notification_stats(&self) -> NotificationStats {
        NotificationStats {
            pending: self.count_or_zero(NotificationStatus::Pending).await,
            sent: self.count_or_zero(NotificationStatus::Sent).await,
            delivered: self.count_or_zero(NotificationStatus::Delivered).await,
            read: self.count_or_zero(NotificationStatus::Read).await,
            failed: self.count_or_zero(NotificationStatus::Failed).await,
        }
    }

    /// Per-day counts for the last `days` days, zero-filled and ascending. Degrades to an empty series on
    /// storage failure.
    pub async fn daily_stats(&self, days: u32) -> Vec<DailyStats> {
        self.db.daily_counts(days).await.unwrap_or_else(|e| {
            warn!("📊️ Could not compute daily stats: {e}. Returning an empty series.");
            Vec::new()
        })
    }

    async fn count_or_zero(&self, status: NotificationStatus) -> i64 {
        self.db.count_by_notification_status(status).await.unwrap_or_else(|e| {
            warn!("📊️ Could not count {status} orders: {e}. Reporting 0.");
            0
        })
    }

    fn cap_limit(&self, limit: u32) -> u32 {
        if limit > self.max_batch_limit {
            debug!("Requested batch limit {limit} capped at {}", self.max_batch_limit);
            self.max_batch_limit
        } else {
            limit
        }
    }
}

fn validate_range(from: DateTime<Utc>, to: DateTime<Utc>, max_span_days: i64) -> Result<(), ServerError> {
    if from >= to {
        return Err(ServerError::InvalidDateRange(format!("'from' ({from}) must lie before 'to' ({to})")));
    }
    let span = to - from;
    if span > Duration::days(max_span_days) {
        return Err(ServerError::InvalidDateRange(format!(
            "Requested span of {} days exceeds the maximum of {max_span_days} days",
            span.num_days()
        )));
    }
    Ok(())
}
