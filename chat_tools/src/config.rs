use log::*;
use rvg_common::Secret;

#[derive(Debug, Clone, Default)]
pub struct ChatConfig {
    /// Base URL of the messaging gateway, e.g. "https://api.chat-gateway.example"
    pub base_url: String,
    /// The gateway instance that owns the sending phone number
    pub instance_id: String,
    pub api_token: Secret<String>,
}

impl ChatConfig {
    pub fn new_from_env_or_default() -> Self {
        let base_url = std::env::var("RVG_CHAT_BASE_URL").unwrap_or_else(|_| {
            warn!("RVG_CHAT_BASE_URL not set, using (probably useless) default");
            "https://api.chat-gateway.example".to_string()
        });
        let instance_id = std::env::var("RVG_CHAT_INSTANCE_ID").unwrap_or_else(|_| {
            warn!("RVG_CHAT_INSTANCE_ID not set, using (probably useless) default");
            "0000000000".to_string()
        });
        let api_token = Secret::from(std::env::var("RVG_CHAT_API_TOKEN").unwrap_or_else(|_| {
            warn!("RVG_CHAT_API_TOKEN not set, using (probably useless) default");
            "chat_00000000000000".to_string()
        }));
        Self { base_url, instance_id, api_token }
    }
}
