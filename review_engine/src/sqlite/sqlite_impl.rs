//! `SqliteDatabase` is the concrete SQLite implementation of the review gateway backend.
use std::fmt::Debug;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use super::db::{allowed_phones, db_url, new_pool, orders};
use crate::{
    db_types::{AllowedPhone, NewOrder, NotificationStatus, Order, OrderId},
    rve_api::objects::DailyStats,
    traits::{ReviewGatewayDatabase, ReviewGatewayError},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Connects to the database given by the `RVG_DATABASE_URL` environment variable, or the default.
    pub async fn new(max_connections: u32) -> Result<Self, ReviewGatewayError> {
        let url = db_url();
        Self::new_with_url(&url, max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, ReviewGatewayError> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl ReviewGatewayDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn insert_order(&self, order: NewOrder) -> Result<(i64, bool), ReviewGatewayError> {
        let mut tx = self.pool.begin().await?;
        let result = orders::idempotent_insert(order, &mut tx).await?;
        tx.commit().await?;
        Ok(result)
    }

    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, ReviewGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_order_id(order_id, &mut conn).await?;
        Ok(order)
    }

    async fn order_exists(&self, order_id: &OrderId) -> Result<bool, ReviewGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let id = orders::order_exists(order_id, &mut conn).await?;
        Ok(id.is_some())
    }

    async fn fetch_pending_for_notification(
        &self,
        limit: u32,
        order_status: &str,
    ) -> Result<Vec<Order>, ReviewGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let result =
            orders::fetch_for_dispatch(NotificationStatus::Pending, Some(order_status), limit, &mut conn).await?;
        Ok(result)
    }

    async fn fetch_failed_for_retry(&self, limit: u32) -> Result<Vec<Order>, ReviewGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let result = orders::fetch_for_dispatch(NotificationStatus::Failed, None, limit, &mut conn).await?;
        Ok(result)
    }

    async fn claim_for_dispatch(&self, id: i64, expected: NotificationStatus) -> Result<bool, ReviewGatewayError> {
        let mut conn = self.pool.acquire().await?;
        orders::claim_for_dispatch(id, expected, &mut conn).await
    }

    async fn update_notification(
        &self,
        id: i64,
        status: NotificationStatus,
        sent_at: Option<DateTime<Utc>>,
        error: Option<String>,
    ) -> Result<(), ReviewGatewayError> {
        let mut conn = self.pool.acquire().await?;
        orders::update_notification(id, status, sent_at, error, &mut conn).await
    }

    async fn record_delivery_status(
        &self,
        order_id: &OrderId,
        status: NotificationStatus,
    ) -> Result<(), ReviewGatewayError> {
        let mut conn = self.pool.acquire().await?;
        orders::record_delivery_status(order_id, status, &mut conn).await
    }

    async fn count_by_notification_status(&self, status: NotificationStatus) -> Result<i64, ReviewGatewayError> {
        let mut conn = self.pool.acquire().await?;
        orders::count_by_notification_status(status, &mut conn).await
    }

    async fn daily_counts(&self, days: u32) -> Result<Vec<DailyStats>, ReviewGatewayError> {
        let mut conn = self.pool.acquire().await?;
        orders::daily_counts(days, &mut conn).await
    }

    async fn fetch_allowed_phone(&self, phone: &str) -> Result<Option<AllowedPhone>, ReviewGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let entry = allowed_phones::fetch_phone(phone, &mut conn).await?;
        Ok(entry)
    }

    async fn upsert_allowed_phone(
        &self,
        phone: &str,
        active: bool,
        description: Option<&str>,
        user_ref: Option<i64>,
    ) -> Result<AllowedPhone, ReviewGatewayError> {
        let mut conn = self.pool.acquire().await?;
        allowed_phones::upsert_phone(phone, active, description, user_ref, &mut conn).await
    }

    async fn close(&mut self) -> Result<(), ReviewGatewayError> {
        self.pool.close().await;
        Ok(())
    }
}
