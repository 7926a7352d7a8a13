use merchant_tools::{MerchantApi, MerchantApiError, OrderEntry, OrdersPage, Product};

use crate::helpers::DateWindow;

/// A paginated source of marketplace orders and their line-item/product detail.
#[allow(async_fn_in_trait)]
pub trait OrderSource: Clone {
    /// Fetch one page (zero-based) of orders with the given marketplace state created inside `window`.
    async fn fetch_orders_page(
        &self,
        status: &str,
        window: &DateWindow,
        page: u32,
    ) -> Result<OrdersPage, MerchantApiError>;

    /// Fetch the line entries for an order.
    async fn fetch_order_entries(&self, order_id: &str) -> Result<Vec<OrderEntry>, MerchantApiError>;

    /// Resolve the product referenced by an order entry.
    async fn fetch_entry_product(&self, entry_id: &str) -> Result<Option<Product>, MerchantApiError>;
}

impl OrderSource for MerchantApi {
    async fn fetch_orders_page(
        &self,
        status: &str,
        window: &DateWindow,
        page: u32,
    ) -> Result<OrdersPage, MerchantApiError> {
        MerchantApi::fetch_orders_page(self, status, window.from_ms(), window.to_ms(), page).await
    }

    async fn fetch_order_entries(&self, order_id: &str) -> Result<Vec<OrderEntry>, MerchantApiError> {
        MerchantApi::fetch_order_entries(self, order_id).await
    }

    async fn fetch_entry_product(&self, entry_id: &str) -> Result<Option<Product>, MerchantApiError> {
        MerchantApi::fetch_entry_product(self, entry_id).await
    }
}
