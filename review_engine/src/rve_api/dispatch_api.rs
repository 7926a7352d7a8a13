use std::time::Duration;

use chrono::Utc;
use log::*;

use crate::{
    db_types::{NotificationStatus, Order},
    helpers::{order_code_from_id, review_link, DEFAULT_RATING},
    rve_api::{
        ingest_api::COMPLETED_STATUS,
        objects::{DispatchOutcome, SendOutcome},
    },
    traits::{MessageGateway, ReviewGatewayDatabase, ReviewGatewayError},
};

const DEFAULT_SEND_DELAY: Duration = Duration::from_secs(2);

/// `DispatchApi` drives the per-order notification state machine: it claims eligible orders, enforces the
/// phone allow-list, compiles the review-request message and records the outcome of each send.
#[derive(Clone)]
pub struct DispatchApi<B, G> {
    db: B,
    gateway: G,
    /// Named gateway template to try first; freeform text is the fallback (and the only path when `None`).
    template: Option<String>,
    send_delay: Duration,
}

impl<B, G> DispatchApi<B, G> {
    pub fn new(db: B, gateway: G) -> Self {
        Self { db, gateway, template: None, send_delay: DEFAULT_SEND_DELAY }
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    /// Overrides the inter-send delay. Tests set this to zero.
    pub fn with_send_delay(mut self, delay: Duration) -> Self {
        self.send_delay = delay;
        self
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }
}

impl<B, G> DispatchApi<B, G>
where
    B: ReviewGatewayDatabase,
    G: MessageGateway,
{
    /// Sends review requests for up to `limit` pending orders, oldest first.
    ///
    /// One order's failure never stops the batch; each order gets its own [`DispatchOutcome`]. The only
    /// error this method returns is an infrastructure-level one: the eligible set could not be queried at
    /// all.
    pub async fn dispatch_batch(&self, limit: u32) -> Result<Vec<DispatchOutcome>, ReviewGatewayError> {
        let orders = self.db.fetch_pending_for_notification(limit, COMPLETED_STATUS).await?;
        info!("📨️ Dispatching review requests for {} pending order(s)", orders.len());
        Ok(self.process_batch(orders, NotificationStatus::Pending).await)
    }

    /// Re-attempts up to `limit` previously failed orders. Same contract as [`Self::dispatch_batch`].
    pub async fn retry_failed(&self, limit: u32) -> Result<Vec<DispatchOutcome>, ReviewGatewayError> {
        let orders = self.db.fetch_failed_for_retry(limit).await?;
        info!("📨️ Retrying review requests for {} failed order(s)", orders.len());
        Ok(self.process_batch(orders, NotificationStatus::Failed).await)
    }

    async fn process_batch(&self, orders: Vec<Order>, claim_from: NotificationStatus) -> Vec<DispatchOutcome> {
        let mut outcomes = Vec::with_capacity(orders.len());
        for (i, order) in orders.into_iter().enumerate() {
            if i > 0 {
                // fixed pause between sends to respect messaging-provider throughput limits
                tokio::time::sleep(self.send_delay).await;
            }
            let outcome = self.process_one(order, claim_from).await;
            outcomes.push(outcome);
        }
        let sent = outcomes.iter().filter(|o| o.outcome == SendOutcome::Sent).count();
        info!("📨️ Batch complete. {sent}/{} sent", outcomes.len());
        outcomes
    }

    async fn process_one(&self, order: Order, claim_from: NotificationStatus) -> DispatchOutcome {
        let order_id = order.order_id.clone();
        match self.try_send(order, claim_from).await {
            Ok(outcome) => outcome,
            Err(e) => {
                // Bookkeeping failed; report the order as failed rather than aborting the batch.
                error!("📨️ Error while dispatching order {order_id}: {e}");
                DispatchOutcome { order_id, outcome: SendOutcome::Failed, error: Some(e.to_string()) }
            },
        }
    }

    async fn try_send(
        &self,
        order: Order,
        claim_from: NotificationStatus,
    ) -> Result<DispatchOutcome, ReviewGatewayError> {
        let order_id = order.order_id.clone();
        if !self.db.claim_for_dispatch(order.id, claim_from).await? {
            debug!("📨️ Order {order_id} was claimed by another dispatcher. Skipping.");
            return Ok(DispatchOutcome { order_id, outcome: SendOutcome::Skipped, error: None });
        }
        if !self.db.is_phone_allowed(&order.customer_phone).await? {
            let error = format!("Recipient phone {} is not on the active allow-list", order.customer_phone);
            warn!("📨️ Order {order_id}: {error}. Failing closed, no send attempted.");
            self.db.update_notification(order.id, NotificationStatus::Failed, None, Some(error.clone())).await?;
            return Ok(DispatchOutcome { order_id, outcome: SendOutcome::Failed, error: Some(error) });
        }
        let message = compile_message(&order);
        match self.send(&order.customer_phone, &message).await {
            Ok(()) => {
                self.db.update_notification(order.id, NotificationStatus::Sent, Some(Utc::now()), None).await?;
                debug!("📨️ Review request for order {order_id} sent");
                Ok(DispatchOutcome { order_id, outcome: SendOutcome::Sent, error: None })
            },
            Err(e) => {
                let error = e.to_string();
                warn!("📨️ Send failed for order {order_id}: {error}");
                self.db.update_notification(order.id, NotificationStatus::Failed, None, Some(error.clone())).await?;
                Ok(DispatchOutcome { order_id, outcome: SendOutcome::Failed, error: Some(error) })
            },
        }
    }

    /// Template-first send: when a named template is configured, try it and fall back to freeform text on
    /// template failure. The fallback is logged, not surfaced as a failure.
    async fn send(&self, phone: &str, message: &str) -> Result<(), chat_tools::ChatApiError> {
        if let Some(template) = &self.template {
            match self.gateway.send_template(phone, template, &[message.to_string()]).await {
                Ok(_) => return Ok(()),
                Err(e) => {
                    info!("📨️ Template '{template}' send failed ({e}). Falling back to freeform text.");
                },
            }
        }
        self.gateway.send_text(phone, message).await.map(|_| ())
    }
}

/// Compiles the outbound message from the first order item and its review link.
fn compile_message(order: &Order) -> String {
    let greeting = match &order.customer_name {
        Some(name) if !name.is_empty() => format!("Hello, {name}!"),
        _ => "Hello!".to_string(),
    };
    let order_code = order_code_from_id(order.order_id.as_str());
    let (product_name, link) = match order.items.first() {
        Some(item) => {
            let link = review_link(item.code.as_deref().unwrap_or(""), order_code, DEFAULT_RATING);
            (item.name.as_str(), link)
        },
        None => ("your purchase", review_link("", order_code, DEFAULT_RATING)),
    };
    format!(
        "{greeting} Thank you for your order {order_code}. If you are happy with {product_name}, \
         we would love a review: {link}"
    )
}

#[cfg(test)]
mod test {
    use chrono::Utc;
    use rvg_common::Money;

    use super::compile_message;
    use crate::db_types::{NotificationStatus, Order, OrderId, OrderItem};

    fn order_with_item(code: Option<&str>) -> Order {
        let now = Utc::now();
        Order {
            id: 1,
            order_id: OrderId::from("409123456-A1".to_string()),
            order_date: now,
            customer_name: Some("Aigerim".to_string()),
            customer_phone: "77011234567".to_string(),
            status: "COMPLETED".to_string(),
            amount: Money::from(159_900),
            notification_status: NotificationStatus::Pending,
            notification_sent_at: None,
            last_notification_error: None,
            created_at: now,
            updated_at: now,
            items: vec![OrderItem {
                id: 1,
                order_ref: 1,
                entry_id: "e-1".to_string(),
                product_id: "p-1".to_string(),
                name: "Kettle".to_string(),
                code: code.map(String::from),
                quantity: 1,
                unit_price: Money::from(159_900),
                total_price: Money::from(159_900),
            }],
        }
    }

    #[test]
    fn message_contains_name_product_and_link() {
        let msg = compile_message(&order_with_item(Some("K-100")));
        assert!(msg.starts_with("Hello, Aigerim!"));
        assert!(msg.contains("Kettle"));
        assert!(msg.contains("productCode=K-100"));
        assert!(msg.contains("orderCode=409123456"));
    }

    #[test]
    fn message_without_product_code_uses_placeholder_link() {
        let msg = compile_message(&order_with_item(None));
        assert!(msg.contains(crate::helpers::REVIEW_LINK_PLACEHOLDER));
    }
}
