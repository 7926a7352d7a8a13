//! Review Engine
//!
//! Core logic for the review gateway: ingesting completed marketplace orders and dispatching review-request
//! messages for them. The library is divided into three main sections:
//!
//! 1. Database management and control ([`mod@sqlite`]). SQLite is the supported backend. Callers should not
//!    access the database directly; they go through the public API. The exception is the data types used by
//!    the database, which live in [`db_types`] and are public.
//! 2. The seam traits ([`mod@traits`]). [`ReviewGatewayDatabase`] is the persistence contract, while
//!    [`OrderSource`] and [`MessageGateway`] abstract the marketplace API and the messaging gateway so that
//!    the ingest and dispatch flows can be exercised against fakes.
//! 3. The engine public API ([`mod@rve_api`]): [`IngestApi`] pulls, enriches and stores orders;
//!    [`DispatchApi`] drives the per-order notification state machine.

pub mod db_types;
pub mod helpers;
mod rve_api;
mod sqlite;
pub mod traits;

pub use rve_api::{
    dispatch_api::DispatchApi,
    ingest_api::IngestApi,
    objects::{DailyStats, DispatchOutcome, IngestSummary, NotificationStats, SendOutcome},
};
pub use sqlite::SqliteDatabase;
pub use traits::{MessageGateway, OrderSource, ReviewGatewayDatabase, ReviewGatewayError};
