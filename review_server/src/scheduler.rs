use std::{
    sync::{Arc, RwLock},
    time::Duration,
};

use chat_tools::ChatApi;
use chrono::{Duration as ChronoDuration, Local, Timelike, Utc};
use log::*;
use merchant_tools::MerchantApi;
use review_engine::{DispatchApi, IngestApi, SendOutcome, SqliteDatabase};
use tokio::task::JoinHandle;

//-------------------------------------------  DispatchWindow  --------------------------------------------------------
/// The daily hour range during which scheduled dispatch is permitted. Half-open: a run at `end_hour` is
/// already outside the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchWindow {
    start_hour: u8,
    end_hour: u8,
}

impl DispatchWindow {
    /// `None` unless `0 <= start < end <= 23`.
    pub fn new(start_hour: u8, end_hour: u8) -> Option<Self> {
        if start_hour < end_hour && end_hour <= 23 {
            Some(Self { start_hour, end_hour })
        } else {
            None
        }
    }

    pub fn contains(&self, hour: u32) -> bool {
        u32::from(self.start_hour) <= hour && hour < u32::from(self.end_hour)
    }

    pub fn start_hour(&self) -> u8 {
        self.start_hour
    }

    pub fn end_hour(&self) -> u8 {
        self.end_hour
    }
}

//-------------------------------------------  SchedulerState  --------------------------------------------------------
/// Mutable scheduler state, owned here and shared by `Arc` rather than living in process-wide globals.
/// Admin updates go through [`SchedulerState::set_window`], which rejects invalid ranges and keeps the
/// previous window.
#[derive(Clone, Debug)]
pub struct SchedulerState {
    window: Arc<RwLock<DispatchWindow>>,
}

impl SchedulerState {
    pub fn new(window: DispatchWindow) -> Self {
        Self { window: Arc::new(RwLock::new(window)) }
    }

    /// Applies a new dispatch window. Returns `false` (and keeps the previous window) when the range is
    /// invalid.
    pub fn set_window(&self, start_hour: u8, end_hour: u8) -> bool {
        match DispatchWindow::new(start_hour, end_hour) {
            Some(window) => {
                *self.window.write().expect("dispatch window lock poisoned") = window;
                info!("🕰️ Dispatch window set to {start_hour}:00 - {end_hour}:00");
                true
            },
            None => {
                warn!("🕰️ Rejected invalid dispatch window {start_hour}:00 - {end_hour}:00. Keeping the previous one.");
                false
            },
        }
    }

    pub fn window(&self) -> DispatchWindow {
        *self.window.read().expect("dispatch window lock poisoned")
    }

    pub fn is_open_at(&self, hour: u32) -> bool {
        self.window().contains(hour)
    }
}

//-------------------------------------------     Workers      --------------------------------------------------------
/// Starts the ingestion worker: every `interval` it pulls the last 24 h of completed orders. Do not await
/// the returned JoinHandle, as it will run indefinitely. Failed runs are logged; the next tick proceeds
/// independently (self-healing by periodicity, not retry).
pub fn start_ingest_worker(api: IngestApi<SqliteDatabase, MerchantApi>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(interval);
        info!("🕰️ Order ingestion worker started ({}s interval)", interval.as_secs());
        loop {
            timer.tick().await;
            let to = Utc::now();
            let from = to - ChronoDuration::hours(24);
            info!("🕰️ Running scheduled ingestion for the last 24h");
            let summary = api.fetch_and_ingest(from, to).await;
            info!("🕰️ Scheduled ingestion done. Fetched {}, stored {}", summary.fetched, summary.processed);
        }
    })
}

/// Starts the dispatch worker: every `interval` it sends a batch of review requests, unless the current
/// local hour falls outside the dispatch window, in which case the tick is a logged no-op.
pub fn start_dispatch_worker(
    api: DispatchApi<SqliteDatabase, ChatApi>,
    state: SchedulerState,
    interval: Duration,
    batch_limit: u32,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(interval);
        info!("🕰️ Review dispatch worker started ({}s interval)", interval.as_secs());
        loop {
            timer.tick().await;
            let hour = Local::now().hour();
            if !state.is_open_at(hour) {
                let window = state.window();
                info!(
                    "🕰️ Dispatch window {}:00 - {}:00 is closed at {hour}:00. Skipping this tick.",
                    window.start_hour(),
                    window.end_hour()
                );
                continue;
            }
            match api.dispatch_batch(batch_limit).await {
                Ok(outcomes) => {
                    let sent = outcomes.iter().filter(|o| o.outcome == SendOutcome::Sent).count();
                    info!("🕰️ Scheduled dispatch done. {sent}/{} sent", outcomes.len());
                },
                Err(e) => error!("🕰️ Error running scheduled dispatch: {e}"),
            }
        }
    })
}
