use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use log::*;
use merchant_tools::{MerchantOrder, OrderEntry};
use rvg_common::Money;

use crate::{
    db_types::{NewOrder, NewOrderItem, OrderId},
    helpers::{normalize_phone, split_range, DateWindow, MAX_WINDOW_DAYS},
    rve_api::objects::IngestSummary,
    traits::{OrderSource, ReviewGatewayDatabase},
};

/// Orders in this marketplace state are eligible for review requests.
pub const COMPLETED_STATUS: &str = "COMPLETED";
const DEFAULT_WINDOW_DELAY: Duration = Duration::from_secs(1);
const UNKNOWN_PRODUCT: &str = "Unknown Product";

/// `IngestApi` pulls orders from the marketplace over bounded date windows, enriches them with line-item
/// and product detail, and stores them idempotently as `Pending` notification candidates.
#[derive(Clone)]
pub struct IngestApi<B, S> {
    db: B,
    source: S,
    max_window_days: i64,
    window_delay: Duration,
}

impl<B, S> IngestApi<B, S> {
    pub fn new(db: B, source: S) -> Self {
        Self { db, source, max_window_days: MAX_WINDOW_DAYS, window_delay: DEFAULT_WINDOW_DELAY }
    }

    /// Overrides the inter-window delay. Tests set this to zero.
    pub fn with_window_delay(mut self, delay: Duration) -> Self {
        self.window_delay = delay;
        self
    }

    pub fn with_max_window_days(mut self, days: i64) -> Self {
        self.max_window_days = days;
        self
    }
}

impl<B, S> IngestApi<B, S>
where
    B: ReviewGatewayDatabase,
    S: OrderSource,
{
    /// Fetches all completed orders created in `[from, to]` and stores the ones not seen before.
    ///
    /// The fetch is best-effort and never fails the caller: an empty summary signals nothing retrievable.
    /// Range validation (presence, order, maximum span) is the responsibility of the external-facing
    /// caller; this method will happily ingest any well-formed window.
    pub async fn fetch_and_ingest(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> IngestSummary {
        let orders = self.fetch_orders(COMPLETED_STATUS, from, to).await;
        let fetched = orders.len();
        let mut processed = 0;
        for raw in orders {
            match self.ingest_one(raw).await {
                Ok(true) => processed += 1,
                Ok(false) => {},
                Err(e) => warn!("📦️ Order could not be stored: {e}"),
            }
        }
        info!("📦️ Ingestion run complete. Fetched: {fetched}, newly stored: {processed}");
        IngestSummary { fetched, processed }
    }

    /// Retrieves every order with the given marketplace state in `[from, to]`, chunked through the window
    /// splitter. A failure inside one window is logged and the remaining windows are still fetched;
    /// partial results are better than none.
    pub async fn fetch_orders(&self, status: &str, from: DateTime<Utc>, to: DateTime<Utc>) -> Vec<MerchantOrder> {
        let windows = split_range(from, to, self.max_window_days);
        if windows.is_empty() {
            warn!("📦️ Degenerate fetch range {from} - {to}. Nothing to do.");
            return Vec::new();
        }
        let window_count = windows.len();
        debug!("📦️ Fetching {status} orders over {window_count} window(s)");
        let mut orders = Vec::new();
        for (i, window) in windows.iter().enumerate() {
            if i > 0 {
                // fixed pause between windows to respect marketplace rate limits
                tokio::time::sleep(self.window_delay).await;
            }
            match self.fetch_window(status, window).await {
                Ok(mut batch) => orders.append(&mut batch),
                Err(e) => {
                    warn!("📦️ Window {} - {} failed, moving on to the next one: {e}", window.from, window.to);
                },
            }
        }
        info!("📦️ Fetched {} {status} orders across {window_count} window(s)", orders.len());
        orders
    }

    async fn fetch_window(
        &self,
        status: &str,
        window: &DateWindow,
    ) -> Result<Vec<MerchantOrder>, merchant_tools::MerchantApiError> {
        let mut orders = Vec::new();
        let mut page = 0;
        loop {
            let result = self.source.fetch_orders_page(status, window, page).await?;
            let count = result.orders.len();
            orders.extend(result.orders);
            trace!("📦️ Window page {page}: {count} orders");
            let more = match result.page_count {
                Some(pages) => page + 1 < pages,
                None => count == merchant_tools::ORDERS_PAGE_SIZE as usize,
            };
            if !more {
                break;
            }
            page += 1;
        }
        Ok(orders)
    }

    /// Enriches and stores a single raw order. `Ok(true)` when a new order was persisted, `Ok(false)` when
    /// it was skipped (already stored, or unusable).
    async fn ingest_one(&self, raw: MerchantOrder) -> Result<bool, crate::ReviewGatewayError> {
        let order_id = OrderId::from(raw.id.clone());
        if self.db.order_exists(&order_id).await? {
            trace!("📦️ Order {order_id} already stored. Skipping.");
            return Ok(false);
        }
        let Some(order) = self.enrich(raw).await else {
            return Ok(false);
        };
        let (_, inserted) = self.db.insert_order(order).await?;
        if inserted {
            debug!("📦️ Order {order_id} stored");
        }
        Ok(inserted)
    }

    /// Builds a [`NewOrder`] from the raw marketplace record. Orders without a customer phone are dropped
    /// here (a distinct failure category from fetch errors); a malformed line item is dropped on its own
    /// without discarding the order.
    async fn enrich(&self, raw: MerchantOrder) -> Option<NewOrder> {
        let attrs = raw.attributes;
        let phone = attrs.customer.as_ref().and_then(|c| c.cell_phone.as_deref()).map(normalize_phone);
        let phone = match phone {
            Some(p) if !p.is_empty() => p,
            _ => {
                warn!("📦️ Order #{} has no customer phone and cannot receive a review request. Skipping.", raw.id);
                return None;
            },
        };
        let customer_name = attrs.customer.as_ref().and_then(|c| c.first_name.clone());
        let order_date = attrs
            .creation_date
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
            .unwrap_or_else(|| {
                warn!("📦️ Order #{} has no usable creation date. Using now.", raw.id);
                Utc::now()
            });
        let mut order = NewOrder {
            order_id: OrderId::from(raw.id.clone()),
            order_date,
            customer_name,
            customer_phone: phone,
            status: attrs.status.unwrap_or_else(|| COMPLETED_STATUS.to_string()),
            amount: attrs.total_price.map(Money::from_f64).unwrap_or_default(),
            items: Vec::new(),
        };
        let entries = match self.source.fetch_order_entries(&raw.id).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("📦️ Could not fetch entries for order #{}: {e}. Storing the order without items.", raw.id);
                Vec::new()
            },
        };
        for entry in entries {
            match self.resolve_item(&entry).await {
                Some(item) => order.items.push(item),
                None => debug!("📦️ Entry {} of order #{} skipped", entry.id, raw.id),
            }
        }
        Some(order)
    }

    /// A single bad line item never discards the whole order: any entry whose data cannot be resolved is
    /// skipped individually.
    async fn resolve_item(&self, entry: &OrderEntry) -> Option<NewOrderItem> {
        if entry.id.is_empty() {
            return None;
        }
        let product = match self.source.fetch_entry_product(&entry.id).await {
            Ok(p) => p,
            Err(e) => {
                warn!("📦️ Could not resolve product for entry {}: {e}", entry.id);
                None
            },
        };
        let (product_id, name, code) = match product {
            Some(p) => (p.id, p.attributes.name.unwrap_or_else(|| UNKNOWN_PRODUCT.to_string()), p.attributes.code),
            None => (String::new(), UNKNOWN_PRODUCT.to_string(), None),
        };
        let quantity = i64::from(entry.attributes.quantity.unwrap_or(1));
        let unit_price = entry.attributes.base_price.map(Money::from_f64).unwrap_or_default();
        let total_price = entry.attributes.total_price.map(Money::from_f64).unwrap_or(unit_price * quantity);
        Some(NewOrderItem {
            entry_id: entry.id.clone(),
            product_id,
            name,
            code,
            quantity,
            unit_price,
            total_price,
        })
    }
}
