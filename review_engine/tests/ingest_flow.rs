mod support;

use std::time::Duration;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use log::*;
use merchant_tools::{
    MerchantCustomer,
    MerchantOrder,
    OrderAttributes,
    OrderEntry,
    OrderEntryAttributes,
    Product,
    ProductAttributes,
};
use review_engine::{db_types::OrderId, IngestApi, ReviewGatewayDatabase, SqliteDatabase};
use support::{
    fakes::FakeOrderSource,
    prepare_env::{prepare_test_env, random_db_url},
};
use tokio::runtime::Runtime;

fn completed_order(id: &str, phone: Option<&str>, created: DateTime<Utc>) -> MerchantOrder {
    MerchantOrder {
        id: id.to_string(),
        attributes: OrderAttributes {
            code: Some(format!("{id}-A1")),
            status: Some("COMPLETED".to_string()),
            creation_date: Some(created.timestamp_millis()),
            total_price: Some(15990.0),
            customer: Some(MerchantCustomer {
                cell_phone: phone.map(String::from),
                first_name: Some("Aigerim".to_string()),
                last_name: None,
            }),
        },
    }
}

fn entry(id: &str, quantity: u32) -> OrderEntry {
    OrderEntry {
        id: id.to_string(),
        attributes: OrderEntryAttributes {
            quantity: Some(quantity),
            base_price: Some(5000.0),
            total_price: None,
        },
    }
}

fn product(id: &str, name: &str, code: &str) -> Product {
    Product {
        id: id.to_string(),
        attributes: ProductAttributes { name: Some(name.to_string()), code: Some(code.to_string()) },
    }
}

#[test]
fn double_ingestion_stores_the_order_once() {
    let sys = Runtime::new().unwrap();
    sys.block_on(async move {
        let url = random_db_url("double_ingest");
        prepare_test_env(&url).await;
        let db = SqliteDatabase::new_with_url(&url, 1).await.expect("Error creating database");
        let source = FakeOrderSource::new();
        let now = Utc::now();
        source.add_order(
            completed_order("409123456", Some("+7 701 123 45 67"), now - ChronoDuration::hours(1)),
            vec![entry("e-1", 1)],
            vec![("e-1".to_string(), product("p-1", "Kettle", "K-100"))],
        );
        let api = IngestApi::new(db.clone(), source).with_window_delay(Duration::ZERO);
        let from = now - ChronoDuration::days(1);

        let summary = api.fetch_and_ingest(from, now).await;
        assert_eq!(summary.fetched, 1);
        assert_eq!(summary.processed, 1);

        let summary = api.fetch_and_ingest(from, now).await;
        assert_eq!(summary.fetched, 1, "Second run still sees the order");
        assert_eq!(summary.processed, 0, "But does not store it again");

        let order = db
            .fetch_order_by_order_id(&OrderId::from("409123456".to_string()))
            .await
            .unwrap()
            .expect("Order was not stored");
        assert_eq!(order.customer_phone, "77011234567", "Phone is stored normalized");
        assert_eq!(order.customer_name.as_deref(), Some("Aigerim"));
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].name, "Kettle");
        assert_eq!(order.items[0].code.as_deref(), Some("K-100"));
    });
    info!("🚀️ double_ingestion_stores_the_order_once complete");
}

#[test]
fn orders_without_a_usable_phone_are_never_stored() {
    let sys = Runtime::new().unwrap();
    sys.block_on(async move {
        let url = random_db_url("no_phone");
        prepare_test_env(&url).await;
        let db = SqliteDatabase::new_with_url(&url, 1).await.expect("Error creating database");
        let source = FakeOrderSource::new();
        let now = Utc::now();
        source.add_order(completed_order("ord-no-phone", None, now - ChronoDuration::hours(2)), vec![], vec![]);
        // normalizes to the empty string, which is just as unusable
        source.add_order(completed_order("ord-junk-phone", Some("n/a"), now - ChronoDuration::hours(1)), vec![], vec![]);
        let api = IngestApi::new(db.clone(), source).with_window_delay(Duration::ZERO);

        let summary = api.fetch_and_ingest(now - ChronoDuration::days(1), now).await;
        assert_eq!(summary.fetched, 2);
        assert_eq!(summary.processed, 0);
        assert!(!db.order_exists(&OrderId::from("ord-no-phone".to_string())).await.unwrap());
        assert!(!db.order_exists(&OrderId::from("ord-junk-phone".to_string())).await.unwrap());
    });
}

#[test]
fn malformed_line_item_does_not_discard_the_order() {
    let sys = Runtime::new().unwrap();
    sys.block_on(async move {
        let url = random_db_url("bad_item");
        prepare_test_env(&url).await;
        let db = SqliteDatabase::new_with_url(&url, 1).await.expect("Error creating database");
        let source = FakeOrderSource::new();
        let now = Utc::now();
        source.add_order(
            completed_order("409555000", Some("77015550000"), now - ChronoDuration::hours(1)),
            // the middle entry has no id and cannot be resolved
            vec![entry("e-1", 1), entry("", 2), entry("e-3", 1)],
            vec![
                ("e-1".to_string(), product("p-1", "Kettle", "K-100")),
                ("e-3".to_string(), product("p-3", "Toaster", "T-300")),
            ],
        );
        let api = IngestApi::new(db.clone(), source).with_window_delay(Duration::ZERO);

        let summary = api.fetch_and_ingest(now - ChronoDuration::days(1), now).await;
        assert_eq!(summary.processed, 1);
        let order = db
            .fetch_order_by_order_id(&OrderId::from("409555000".to_string()))
            .await
            .unwrap()
            .expect("Order was not stored");
        assert_eq!(order.items.len(), 2, "The two good items survive");
        assert_eq!(order.items[0].name, "Kettle");
        assert_eq!(order.items[1].name, "Toaster");
    });
}

#[test]
fn unresolvable_product_falls_back_to_placeholder_name() {
    let sys = Runtime::new().unwrap();
    sys.block_on(async move {
        let url = random_db_url("no_product");
        prepare_test_env(&url).await;
        let db = SqliteDatabase::new_with_url(&url, 1).await.expect("Error creating database");
        let source = FakeOrderSource::new();
        let now = Utc::now();
        // no product registered for e-1
        source.add_order(
            completed_order("409555111", Some("77015551111"), now - ChronoDuration::hours(1)),
            vec![entry("e-1", 1)],
            vec![],
        );
        let api = IngestApi::new(db.clone(), source).with_window_delay(Duration::ZERO);

        let summary = api.fetch_and_ingest(now - ChronoDuration::days(1), now).await;
        assert_eq!(summary.processed, 1);
        let order = db
            .fetch_order_by_order_id(&OrderId::from("409555111".to_string()))
            .await
            .unwrap()
            .expect("Order was not stored");
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].name, "Unknown Product");
        assert!(order.items[0].code.is_none());
    });
}

#[test]
fn failed_window_does_not_abort_the_fetch() {
    let sys = Runtime::new().unwrap();
    sys.block_on(async move {
        let url = random_db_url("broken_window");
        prepare_test_env(&url).await;
        let db = SqliteDatabase::new_with_url(&url, 1).await.expect("Error creating database");
        let source = FakeOrderSource::new();
        let now = Utc::now();
        let from = now - ChronoDuration::days(30);
        // 30 days split into 3 windows; one order in the first window, one in the last
        source.add_order(completed_order("ord-early", Some("77010000001"), from + ChronoDuration::days(1)), vec![], vec![]);
        source.add_order(completed_order("ord-late", Some("77010000002"), now - ChronoDuration::hours(1)), vec![], vec![]);
        // the middle window fails with a simulated server error
        let broken_from = (from + ChronoDuration::days(15)).timestamp_millis();
        let broken_to = (from + ChronoDuration::days(16)).timestamp_millis();
        source.break_range(broken_from, broken_to);
        let api = IngestApi::new(db.clone(), source).with_window_delay(Duration::ZERO);

        let summary = api.fetch_and_ingest(from, now).await;
        assert_eq!(summary.fetched, 2, "Both healthy windows are still fetched");
        assert_eq!(summary.processed, 2);
        assert!(db.order_exists(&OrderId::from("ord-early".to_string())).await.unwrap());
        assert!(db.order_exists(&OrderId::from("ord-late".to_string())).await.unwrap());
    });
}
