use serde::{Deserialize, Serialize};

/// The merchant API wraps every response in a JSON:API style document. A missing `data` member means
/// "no results", not an error, so every field here is optional and resolved explicitly at the call site.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Document<T> {
    pub data: Option<T>,
    pub meta: Option<PageMeta>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total_count: Option<u64>,
    pub page_count: Option<u32>,
}

//--------------------------------------      Orders        -----------------------------------------------------------
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MerchantOrder {
    pub id: String,
    #[serde(default)]
    pub attributes: OrderAttributes,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderAttributes {
    /// The human-facing order code, e.g. "409123456-A1"
    pub code: Option<String>,
    /// The marketplace lifecycle state, e.g. "NEW", "SIGN_REQUIRED", "COMPLETED"
    pub status: Option<String>,
    /// Order creation instant in epoch milliseconds
    pub creation_date: Option<i64>,
    pub total_price: Option<f64>,
    pub customer: Option<MerchantCustomer>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MerchantCustomer {
    pub cell_phone: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// A single page of the order listing, with the page count reported by the server (when present).
#[derive(Debug, Clone, Default)]
pub struct OrdersPage {
    pub orders: Vec<MerchantOrder>,
    pub page_count: Option<u32>,
}

//--------------------------------------   Order entries    -----------------------------------------------------------
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OrderEntry {
    pub id: String,
    #[serde(default)]
    pub attributes: OrderEntryAttributes,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderEntryAttributes {
    pub quantity: Option<u32>,
    pub base_price: Option<f64>,
    pub total_price: Option<f64>,
}

//--------------------------------------      Products      -----------------------------------------------------------
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Product {
    pub id: String,
    #[serde(default)]
    pub attributes: ProductAttributes,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductAttributes {
    pub name: Option<String>,
    pub code: Option<String>,
}
