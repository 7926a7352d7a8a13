use log::trace;
use sqlx::SqliteConnection;

use crate::{db_types::AllowedPhone, traits::ReviewGatewayError};

/// Looks up a phone (normalized, digits only) in the allow-list.
pub async fn fetch_phone(phone: &str, conn: &mut SqliteConnection) -> Result<Option<AllowedPhone>, sqlx::Error> {
    let result = sqlx::query_as("SELECT * FROM allowed_phones WHERE phone = $1").bind(phone).fetch_optional(conn).await;
    trace!("📇️ Allow-list lookup for {phone}: {}", if result.is_ok() { "ok" } else { "error" });
    result
}

/// Inserts an allow-list entry, or updates the existing entry for the phone in place.
pub async fn upsert_phone(
    phone: &str,
    active: bool,
    description: Option<&str>,
    user_ref: Option<i64>,
    conn: &mut SqliteConnection,
) -> Result<AllowedPhone, ReviewGatewayError> {
    let entry = sqlx::query_as(
        r#"
            INSERT INTO allowed_phones (phone, active, description, user_ref)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (phone) DO UPDATE
                SET active = excluded.active,
                    description = excluded.description,
                    user_ref = excluded.user_ref
            RETURNING *;
        "#,
    )
    .bind(phone)
    .bind(active)
    .bind(description)
    .bind(user_ref)
    .fetch_one(conn)
    .await?;
    Ok(entry)
}
