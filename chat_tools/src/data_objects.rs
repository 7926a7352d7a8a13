use serde::{Deserialize, Serialize};

/// Returned by the gateway on a successful send.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageReceipt {
    pub id_message: Option<String>,
}

/// The gateway instance state, used as a health check. An instance must be "authorized" before it can send.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayState {
    pub state_instance: String,
}

impl GatewayState {
    pub fn is_authorized(&self) -> bool {
        self.state_instance == "authorized"
    }
}
