use log::*;
use rvg_common::Secret;

#[derive(Debug, Clone, Default)]
pub struct MerchantConfig {
    /// Base URL of the merchant API, e.g. "https://marketplace.example/shop/api/v2"
    pub base_url: String,
    pub api_token: Secret<String>,
}

impl MerchantConfig {
    pub fn new_from_env_or_default() -> Self {
        let base_url = std::env::var("RVG_MERCHANT_BASE_URL").unwrap_or_else(|_| {
            warn!("RVG_MERCHANT_BASE_URL not set, using (probably useless) default");
            "https://marketplace.example/shop/api/v2".to_string()
        });
        let api_token = Secret::from(std::env::var("RVG_MERCHANT_API_TOKEN").unwrap_or_else(|_| {
            warn!("RVG_MERCHANT_API_TOKEN not set, using (probably useless) default");
            "merchant_00000000000000".to_string()
        }));
        Self { base_url, api_token }
    }
}
