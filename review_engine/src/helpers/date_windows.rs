use chrono::{DateTime, Duration, Utc};

/// The maximum span the marketplace API accepts in a single order-listing request.
pub const MAX_WINDOW_DAYS: i64 = 14;

/// A single fetch window. `from < to` always holds for windows produced by [`split_range`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl DateWindow {
    pub fn from_ms(&self) -> i64 {
        self.from.timestamp_millis()
    }

    pub fn to_ms(&self) -> i64 {
        self.to.timestamp_millis()
    }
}

/// Splits `[from, to]` into an ordered sequence of contiguous, non-overlapping windows of at most `max_days`
/// each. Consecutive windows advance by exactly 1 ms past the previous window's end, the resolution of the
/// marketplace's creation-date filter, so no boundary instant is covered twice and none is skipped.
///
/// `from >= to` or a non-positive `max_days` yields an empty vector; callers are expected to reject such
/// ranges before asking for windows.
pub fn split_range(from: DateTime<Utc>, to: DateTime<Utc>, max_days: i64) -> Vec<DateWindow> {
    if from >= to || max_days <= 0 {
        return Vec::new();
    }
    let max_span = Duration::days(max_days);
    let step = Duration::milliseconds(1);
    let mut windows = Vec::new();
    let mut cursor = from;
    while cursor < to {
        let end = (cursor + max_span).min(to);
        windows.push(DateWindow { from: cursor, to: end });
        cursor = end + step;
    }
    windows
}
