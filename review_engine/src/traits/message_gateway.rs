use chat_tools::{ChatApi, ChatApiError, MessageReceipt};

/// Outbound messaging seam. Recipient keys are normalized (digits-only) phone numbers.
#[allow(async_fn_in_trait)]
pub trait MessageGateway: Clone {
    async fn send_text(&self, phone: &str, message: &str) -> Result<MessageReceipt, ChatApiError>;

    async fn send_template(
        &self,
        phone: &str,
        template: &str,
        params: &[String],
    ) -> Result<MessageReceipt, ChatApiError>;
}

impl MessageGateway for ChatApi {
    async fn send_text(&self, phone: &str, message: &str) -> Result<MessageReceipt, ChatApiError> {
        ChatApi::send_text(self, phone, message).await
    }

    async fn send_template(
        &self,
        phone: &str,
        template: &str,
        params: &[String],
    ) -> Result<MessageReceipt, ChatApiError> {
        ChatApi::send_template(self, phone, template, params).await
    }
}
