use std::{sync::Arc, time::Duration};

use log::*;
use reqwest::{header::HeaderValue, Client, Method};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    config::ChatConfig,
    data_objects::{GatewayState, MessageReceipt},
    ChatApiError,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Clone)]
pub struct ChatApi {
    config: ChatConfig,
    client: Arc<Client>,
}

impl ChatApi {
    pub fn new(config: ChatConfig) -> Result<Self, ChatApiError> {
        let mut headers = reqwest::header::HeaderMap::with_capacity(1);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ChatApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    async fn query<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
    ) -> Result<T, ChatApiError> {
        let url = self.url(endpoint);
        trace!("Sending gateway query: {endpoint}");
        let mut req = self.client.request(method, url);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(|e| ChatApiError::ResponseError(e.to_string()))?;
        if response.status().is_success() {
            response.json::<T>().await.map_err(|e| ChatApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| ChatApiError::ResponseError(e.to_string()))?;
            Err(ChatApiError::SendError { status, message })
        }
    }

    /// The token lives in the URL path on this gateway, so it never appears in logged endpoint names.
    pub fn url(&self, endpoint: &str) -> String {
        format!(
            "{}/waInstance{}/{endpoint}/{}",
            self.config.base_url,
            self.config.instance_id,
            self.config.api_token.reveal()
        )
    }

    /// Sends a freeform text message to the given phone number (digits only).
    pub async fn send_text(&self, phone: &str, message: &str) -> Result<MessageReceipt, ChatApiError> {
        let body = serde_json::json!({
            "chatId": format!("{phone}@c.us"),
            "message": message,
        });
        debug!("Sending text message to {phone}");
        let receipt = self.query::<MessageReceipt>(Method::POST, "sendMessage", Some(body)).await?;
        info!("Message sent to {phone}. Receipt: {:?}", receipt.id_message);
        Ok(receipt)
    }

    /// Sends a pre-approved named template with positional parameters.
    pub async fn send_template(
        &self,
        phone: &str,
        template: &str,
        params: &[String],
    ) -> Result<MessageReceipt, ChatApiError> {
        let body = serde_json::json!({
            "chatId": format!("{phone}@c.us"),
            "templateName": template,
            "params": params,
        });
        debug!("Sending template '{template}' to {phone}");
        let receipt = self.query::<MessageReceipt>(Method::POST, "sendTemplate", Some(body)).await?;
        info!("Template '{template}' sent to {phone}. Receipt: {:?}", receipt.id_message);
        Ok(receipt)
    }

    /// Fetches the instance state. Used as a liveness/authorization check before dispatch runs.
    pub async fn get_state(&self) -> Result<GatewayState, ChatApiError> {
        self.query::<GatewayState>(Method::GET, "getStateInstance", None).await
    }
}
