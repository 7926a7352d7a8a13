//! Interface contracts for the review engine's collaborators.
//!
//! * [`ReviewGatewayDatabase`] defines the behaviour a persistence backend must expose.
//! * [`OrderSource`] abstracts the marketplace order API (implemented by `merchant_tools::MerchantApi`).
//! * [`MessageGateway`] abstracts the messaging provider (implemented by `chat_tools::ChatApi`).
//!
//! The ingest and dispatch APIs are generic over these traits so that the flows can be exercised against
//! programmable fakes in tests.

mod message_gateway;
mod order_source;
mod review_gateway_database;

pub use message_gateway::MessageGateway;
pub use order_source::OrderSource;
pub use review_gateway_database::{ReviewGatewayDatabase, ReviewGatewayError};
