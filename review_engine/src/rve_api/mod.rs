//! # Review engine public API
//!
//! * [`ingest_api`] pulls orders from the marketplace in bounded date windows, enriches them with line-item
//!   and product data, and stores them idempotently.
//! * [`dispatch_api`] selects stored orders that still owe a review request and drives the per-order
//!   notification state machine against the messaging gateway.
//!
//! The pattern for both APIs is the same as elsewhere in this workspace: an API instance is created by
//! supplying backends that implement the required seam traits, e.g.
//!
//! ```rust,ignore
//! use review_engine::{DispatchApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url(url, 5).await?;
//! let api = DispatchApi::new(db, chat_api);
//! let outcomes = api.dispatch_batch(50).await?;
//! ```

pub mod dispatch_api;
pub mod ingest_api;
pub mod objects;
