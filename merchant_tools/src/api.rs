use std::{sync::Arc, time::Duration};

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
    Method,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    config::MerchantConfig,
    data_objects::{Document, MerchantOrder, OrderEntry, OrdersPage, Product},
    MerchantApiError,
    ORDERS_PAGE_SIZE,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Clone)]
pub struct MerchantApi {
    config: MerchantConfig,
    client: Arc<Client>,
}

impl MerchantApi {
    pub fn new(config: MerchantConfig) -> Result<Self, MerchantApiError> {
        let mut headers = HeaderMap::with_capacity(2);
        let val = HeaderValue::from_str(config.api_token.reveal().as_str())
            .map_err(|e| MerchantApiError::Initialization(e.to_string()))?;
        headers.insert("X-Auth-Token", val);
        headers.insert("Accept", HeaderValue::from_static("application/vnd.api+json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| MerchantApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub async fn rest_query<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, String)],
        body: Option<Value>,
    ) -> Result<T, MerchantApiError> {
        let url = self.url(path);
        trace!("Sending REST query: {url}");
        let mut req = self.client.request(method, url);
        if !params.is_empty() {
            req = req.query(params);
        }
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(|e| MerchantApiError::ResponseError(e.to_string()))?;
        if response.status().is_success() {
            trace!("REST query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| MerchantApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| MerchantApiError::ResponseError(e.to_string()))?;
            Err(MerchantApiError::QueryError { status, message })
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url)
    }

    /// Fetches a single page of orders with the given marketplace state, created inside `[from_ms, to_ms]`
    /// (epoch milliseconds). Pages are zero-based. An absent `data` member yields an empty page.
    pub async fn fetch_orders_page(
        &self,
        status: &str,
        from_ms: i64,
        to_ms: i64,
        page: u32,
    ) -> Result<OrdersPage, MerchantApiError> {
        let params = [
            ("page[number]", page.to_string()),
            ("page[size]", ORDERS_PAGE_SIZE.to_string()),
            ("filter[orders][state]", status.to_string()),
            ("filter[orders][creationDate][$ge]", from_ms.to_string()),
            ("filter[orders][creationDate][$le]", to_ms.to_string()),
        ];
        debug!("Fetching orders page {page} for state {status}");
        let doc = self.rest_query::<Document<Vec<MerchantOrder>>>(Method::GET, "/orders", &params, None).await?;
        let orders = doc.data.unwrap_or_default();
        let page_count = doc.meta.and_then(|m| m.page_count);
        debug!("Fetched {} orders on page {page}. Reported page count: {page_count:?}", orders.len());
        Ok(OrdersPage { orders, page_count })
    }

    /// Fetches the line entries for an order. An absent `data` member yields an empty list.
    pub async fn fetch_order_entries(&self, order_id: &str) -> Result<Vec<OrderEntry>, MerchantApiError> {
        let path = format!("/orders/{order_id}/entries");
        debug!("Fetching entries for order {order_id}");
        let doc = self.rest_query::<Document<Vec<OrderEntry>>>(Method::GET, &path, &[], None).await?;
        Ok(doc.data.unwrap_or_default())
    }

    /// Resolves the product referenced by an order entry. `None` if the API has no product for the entry.
    pub async fn fetch_entry_product(&self, entry_id: &str) -> Result<Option<Product>, MerchantApiError> {
        let path = format!("/orderentries/{entry_id}/product");
        debug!("Fetching product for entry {entry_id}");
        let doc = self.rest_query::<Document<Product>>(Method::GET, &path, &[], None).await?;
        Ok(doc.data)
    }
}
