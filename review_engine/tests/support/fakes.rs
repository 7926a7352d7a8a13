use std::{
    collections::{HashMap, HashSet},
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
        Mutex,
    },
};

use chat_tools::{ChatApiError, MessageReceipt};
use merchant_tools::{MerchantApiError, MerchantOrder, OrderEntry, OrdersPage, Product};
use review_engine::{helpers::DateWindow, MessageGateway, OrderSource};

//-------------------------------------------  FakeOrderSource  -------------------------------------------------------
/// An in-memory `OrderSource`. Orders are matched against the requested state and window, and individual
/// windows can be scripted to fail.
#[derive(Clone, Default)]
pub struct FakeOrderSource {
    inner: Arc<Mutex<SourceState>>,
}

#[derive(Default)]
struct SourceState {
    orders: Vec<MerchantOrder>,
    entries: HashMap<String, Vec<OrderEntry>>,
    products: HashMap<String, Product>,
    broken_range: Option<(i64, i64)>,
}

impl FakeOrderSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_order(&self, order: MerchantOrder, entries: Vec<OrderEntry>, products: Vec<(String, Product)>) {
        let mut state = self.inner.lock().unwrap();
        state.entries.insert(order.id.clone(), entries);
        for (entry_id, product) in products {
            state.products.insert(entry_id, product);
        }
        state.orders.push(order);
    }

    /// Any window overlapping `[from_ms, to_ms]` will fail with a simulated server error.
    pub fn break_range(&self, from_ms: i64, to_ms: i64) {
        self.inner.lock().unwrap().broken_range = Some((from_ms, to_ms));
    }
}

impl OrderSource for FakeOrderSource {
    async fn fetch_orders_page(
        &self,
        status: &str,
        window: &DateWindow,
        page: u32,
    ) -> Result<OrdersPage, MerchantApiError> {
        let state = self.inner.lock().unwrap();
        if let Some((from, to)) = state.broken_range {
            if window.from_ms() <= to && from <= window.to_ms() {
                return Err(MerchantApiError::QueryError { status: 500, message: "simulated outage".to_string() });
            }
        }
        let orders = if page == 0 {
            state
                .orders
                .iter()
                .filter(|o| o.attributes.status.as_deref() == Some(status))
                .filter(|o| {
                    o.attributes
                        .creation_date
                        .map(|ms| window.from_ms() <= ms && ms <= window.to_ms())
                        .unwrap_or(false)
                })
                .cloned()
                .collect()
        } else {
            Vec::new()
        };
        Ok(OrdersPage { orders, page_count: Some(1) })
    }

    async fn fetch_order_entries(&self, order_id: &str) -> Result<Vec<OrderEntry>, MerchantApiError> {
        let state = self.inner.lock().unwrap();
        Ok(state.entries.get(order_id).cloned().unwrap_or_default())
    }

    async fn fetch_entry_product(&self, entry_id: &str) -> Result<Option<Product>, MerchantApiError> {
        let state = self.inner.lock().unwrap();
        Ok(state.products.get(entry_id).cloned())
    }
}

//-------------------------------------------  FakeChatGateway  -------------------------------------------------------
#[derive(Clone, Debug)]
pub struct SentMessage {
    pub phone: String,
    pub body: String,
    pub via_template: bool,
}

/// An in-memory `MessageGateway` that records every accepted send and can be scripted to fail specific
/// text sends (by zero-based call index) or all template sends.
#[derive(Clone, Default)]
pub struct FakeChatGateway {
    sent: Arc<Mutex<Vec<SentMessage>>>,
    fail_on_call: Arc<Mutex<HashSet<usize>>>,
    template_always_fails: Arc<AtomicBool>,
    text_calls: Arc<AtomicUsize>,
}

impl FakeChatGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_on_call(&self, idx: usize) {
        self.fail_on_call.lock().unwrap().insert(idx);
    }

    pub fn fail_templates(&self) {
        self.template_always_fails.store(true, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn text_call_count(&self) -> usize {
        self.text_calls.load(Ordering::SeqCst)
    }
}

impl MessageGateway for FakeChatGateway {
    async fn send_text(&self, phone: &str, message: &str) -> Result<MessageReceipt, ChatApiError> {
        let idx = self.text_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_on_call.lock().unwrap().contains(&idx) {
            return Err(ChatApiError::SendError { status: 500, message: "simulated gateway failure".to_string() });
        }
        self.sent.lock().unwrap().push(SentMessage {
            phone: phone.to_string(),
            body: message.to_string(),
            via_template: false,
        });
        Ok(MessageReceipt { id_message: Some(format!("msg-{idx}")) })
    }

    async fn send_template(
        &self,
        phone: &str,
        _template: &str,
        params: &[String],
    ) -> Result<MessageReceipt, ChatApiError> {
        if self.template_always_fails.load(Ordering::SeqCst) {
            return Err(ChatApiError::SendError { status: 400, message: "unknown template".to_string() });
        }
        self.sent.lock().unwrap().push(SentMessage {
            phone: phone.to_string(),
            body: params.join(" "),
            via_template: true,
        });
        Ok(MessageReceipt { id_message: Some("msg-template".to_string()) })
    }
}
