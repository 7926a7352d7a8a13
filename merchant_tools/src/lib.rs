mod api;
mod config;
mod data_objects;
mod error;

pub use api::MerchantApi;
pub use config::MerchantConfig;
pub use data_objects::{
    MerchantCustomer,
    MerchantOrder,
    OrderAttributes,
    OrderEntry,
    OrderEntryAttributes,
    OrdersPage,
    PageMeta,
    Product,
    ProductAttributes,
};
pub use error::MerchantApiError;

/// The number of orders requested per page. The merchant API caps page sizes at 100.
pub const ORDERS_PAGE_SIZE: u32 = 100;
