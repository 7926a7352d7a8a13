mod api;
mod config;
mod data_objects;
mod error;

pub use api::ChatApi;
pub use config::ChatConfig;
pub use data_objects::{GatewayState, MessageReceipt};
pub use error::ChatApiError;
