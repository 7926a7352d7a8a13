use chrono::{DateTime, Duration, NaiveDate, Utc};
use log::{debug, trace, warn};
use sqlx::{QueryBuilder, SqliteConnection};

use crate::{
    db_types::{NewOrder, NewOrderItem, NotificationStatus, Order, OrderId, OrderItem},
    rve_api::objects::DailyStats,
    traits::ReviewGatewayError,
};

/// Inserts the order into the database, returning `false` in the second parameter if the order already
/// exists. A unique-constraint violation on the insert itself (a concurrent run got there first) is also
/// treated as "already exists", not as an error.
pub async fn idempotent_insert(
    order: NewOrder,
    conn: &mut SqliteConnection,
) -> Result<(i64, bool), ReviewGatewayError> {
    if let Some(id) = order_exists(&order.order_id, conn).await? {
        trace!("📝️ Order {} already exists with id {id}", order.order_id);
        return Ok((id, false));
    }
    let order_id = order.order_id.clone();
    match insert_order(order, conn).await {
        Ok(id) => {
            debug!("📝️ Order {order_id} inserted with id {id}");
            Ok((id, true))
        },
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            let id = order_exists(&order_id, conn)
                .await?
                .ok_or_else(|| ReviewGatewayError::OrderNotFound(order_id.clone()))?;
            debug!("📝️ Order {order_id} was inserted concurrently (id {id}). Treating as already present.");
            Ok((id, false))
        },
        Err(e) => Err(e.into()),
    }
}

/// Inserts a new order and its items using the given connection. This is not atomic on its own. You can
/// embed this call inside a transaction if you need atomicity, and pass `&mut *tx` as the connection
/// argument.
async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    let id: i64 = sqlx::query_scalar(
        r#"
            INSERT INTO orders (
                order_id,
                order_date,
                customer_name,
                customer_phone,
                status,
                amount
            ) VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id;
        "#,
    )
    .bind(order.order_id)
    .bind(order.order_date)
    .bind(order.customer_name)
    .bind(order.customer_phone)
    .bind(order.status)
    .bind(order.amount)
    .fetch_one(&mut *conn)
    .await?;
    for item in order.items {
        insert_order_item(id, item, conn).await?;
    }
    Ok(id)
}

async fn insert_order_item(order_ref: i64, item: NewOrderItem, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
            INSERT INTO order_items (
                order_ref,
                entry_id,
                product_id,
                name,
                code,
                quantity,
                unit_price,
                total_price
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8);
        "#,
    )
    .bind(order_ref)
    .bind(item.entry_id)
    .bind(item.product_id)
    .bind(item.name)
    .bind(item.code)
    .bind(item.quantity)
    .bind(item.unit_price)
    .bind(item.total_price)
    .execute(conn)
    .await?;
    Ok(())
}

/// Returns the order with the given marketplace order id, items included.
pub async fn fetch_order_by_order_id(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order: Option<Order> = sqlx::query_as("SELECT * FROM orders WHERE order_id = $1")
        .bind(order_id.as_str())
        .fetch_optional(&mut *conn)
        .await?;
    match order {
        Some(mut order) => {
            order.items = fetch_items_for_order(order.id, conn).await?;
            Ok(Some(order))
        },
        None => Ok(None),
    }
}

async fn fetch_items_for_order(order_ref: i64, conn: &mut SqliteConnection) -> Result<Vec<OrderItem>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM order_items WHERE order_ref = $1 ORDER BY id ASC")
        .bind(order_ref)
        .fetch_all(conn)
        .await
}

/// Checks whether the order with the given marketplace order id already exists. If it does, the internal
/// `id` of the order is returned; otherwise `None`.
pub async fn order_exists(order_id: &OrderId, conn: &mut SqliteConnection) -> Result<Option<i64>, ReviewGatewayError> {
    let id: Option<i64> = sqlx::query_scalar("SELECT id FROM orders WHERE order_id = $1")
        .bind(order_id.as_str())
        .fetch_optional(conn)
        .await?;
    Ok(id)
}

/// Fetches orders eligible for dispatch: notification status matching, optionally filtered by marketplace
/// state, oldest order first, items included.
pub async fn fetch_for_dispatch(
    notification_status: NotificationStatus,
    order_status: Option<&str>,
    limit: u32,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, sqlx::Error> {
    let mut builder = QueryBuilder::new("SELECT * FROM orders WHERE notification_status = ");
    builder.push_bind(notification_status.to_string());
    if let Some(status) = order_status {
        builder.push(" AND status = ");
        builder.push_bind(status.to_string());
    }
    builder.push(" ORDER BY order_date ASC LIMIT ");
    builder.push_bind(i64::from(limit));
    trace!("📝️ Executing query: {}", builder.sql());
    let mut orders: Vec<Order> = builder.build_query_as().fetch_all(&mut *conn).await?;
    for order in &mut orders {
        order.items = fetch_items_for_order(order.id, conn).await?;
    }
    trace!("📝️ fetch_for_dispatch returned {} orders", orders.len());
    Ok(orders)
}

/// Compare-and-swap claim: moves the order from `expected` to `Processing`. Returns `false` when the row
/// was no longer in `expected`, i.e. another dispatcher claimed it between selection and now.
pub async fn claim_for_dispatch(
    id: i64,
    expected: NotificationStatus,
    conn: &mut SqliteConnection,
) -> Result<bool, ReviewGatewayError> {
    let result = sqlx::query(
        "UPDATE orders SET notification_status = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 AND \
         notification_status = $3",
    )
    .bind(NotificationStatus::Processing.to_string())
    .bind(id)
    .bind(expected.to_string())
    .execute(conn)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// Records the outcome of a send attempt on the notification fields. These fields are mutated exclusively
/// through this function and [`claim_for_dispatch`]/[`record_delivery_status`].
pub async fn update_notification(
    id: i64,
    status: NotificationStatus,
    sent_at: Option<DateTime<Utc>>,
    error: Option<String>,
    conn: &mut SqliteConnection,
) -> Result<(), ReviewGatewayError> {
    let result = sqlx::query(
        "UPDATE orders SET notification_status = $1, notification_sent_at = $2, last_notification_error = $3, \
         updated_at = CURRENT_TIMESTAMP WHERE id = $4",
    )
    .bind(status.to_string())
    .bind(sent_at)
    .bind(error)
    .bind(id)
    .execute(conn)
    .await?;
    if result.rows_affected() == 0 {
        return Err(ReviewGatewayError::OrderIdNotFound(id));
    }
    Ok(())
}

/// Applies an externally reported delivery transition. No business-state validation: the provider is the
/// source of truth for `Delivered`/`Read`.
pub async fn record_delivery_status(
    order_id: &OrderId,
    status: NotificationStatus,
    conn: &mut SqliteConnection,
) -> Result<(), ReviewGatewayError> {
    let result = sqlx::query(
        "UPDATE orders SET notification_status = $1, updated_at = CURRENT_TIMESTAMP WHERE order_id = $2",
    )
    .bind(status.to_string())
    .bind(order_id.as_str())
    .execute(conn)
    .await?;
    if result.rows_affected() == 0 {
        return Err(ReviewGatewayError::OrderNotFound(order_id.clone()));
    }
    Ok(())
}

pub async fn count_by_notification_status(
    status: NotificationStatus,
    conn: &mut SqliteConnection,
) -> Result<i64, ReviewGatewayError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE notification_status = $1")
        .bind(status.to_string())
        .fetch_one(conn)
        .await?;
    Ok(count)
}

/// Per-day notification counts for the last `days` days (today included), zero-filled and ascending by
/// date. An empty orders table still yields `days` entries.
pub async fn daily_counts(days: u32, conn: &mut SqliteConnection) -> Result<Vec<DailyStats>, ReviewGatewayError> {
    if days == 0 {
        return Ok(Vec::new());
    }
    let today = Utc::now().date_naive();
    let first_day = today - Duration::days(i64::from(days) - 1);
    let rows: Vec<(String, String, i64)> = sqlx::query_as(
        r#"
        SELECT date(order_date) AS day, notification_status, COUNT(*) AS n
        FROM orders
        WHERE date(order_date) >= $1
        GROUP BY day, notification_status
        "#,
    )
    .bind(first_day.format("%Y-%m-%d").to_string())
    .fetch_all(conn)
    .await?;
    let mut series: Vec<DailyStats> =
        (0..days).map(|i| DailyStats::empty(first_day + Duration::days(i64::from(i)))).collect();
    for (day, status, n) in rows {
        let Ok(day) = NaiveDate::parse_from_str(&day, "%Y-%m-%d") else {
            warn!("📝️ Unparseable day '{day}' in daily stats. Skipping row.");
            continue;
        };
        let Some(entry) = series.iter_mut().find(|s| s.day == day) else {
            continue;
        };
        match status.parse::<NotificationStatus>() {
            Ok(NotificationStatus::Pending) | Ok(NotificationStatus::Processing) => entry.pending += n,
            Ok(NotificationStatus::Sent) => entry.sent += n,
            Ok(NotificationStatus::Delivered) => entry.delivered += n,
            Ok(NotificationStatus::Read) => entry.read += n,
            Ok(NotificationStatus::Failed) => entry.failed += n,
            Err(_) => warn!("📝️ Unknown notification status '{status}' in daily stats. Skipping row."),
        }
    }
    Ok(series)
}
