mod support;

use chrono::{Duration as ChronoDuration, Utc};
use review_engine::{
    db_types::{NewOrder, NotificationStatus, OrderId},
    ReviewGatewayDatabase,
    SqliteDatabase,
};
use rvg_common::Money;
use support::prepare_env::{prepare_test_env, random_db_url};
use tokio::runtime::Runtime;

async fn seed_order(db: &SqliteDatabase, order_id: &str, hours_ago: i64) -> i64 {
    let mut order = NewOrder::new(OrderId::from(order_id.to_string()), "77011234567".to_string(), Money::from(100_000));
    order.order_date = Utc::now() - ChronoDuration::hours(hours_ago);
    let (id, inserted) = db.insert_order(order).await.expect("Error seeding order");
    assert!(inserted);
    id
}

#[test]
fn empty_store_still_yields_a_full_daily_series() {
    let sys = Runtime::new().unwrap();
    sys.block_on(async move {
        let url = random_db_url("empty_series");
        prepare_test_env(&url).await;
        let db = SqliteDatabase::new_with_url(&url, 1).await.expect("Error creating database");

        let series = db.daily_counts(30).await.unwrap();
        assert_eq!(series.len(), 30);
        assert!(series.iter().all(|s| s.total() == 0));
        for pair in series.windows(2) {
            assert_eq!(pair[1].day, pair[0].day.succ_opt().unwrap(), "Days are consecutive and ascending");
        }
        assert_eq!(series.last().unwrap().day, Utc::now().date_naive());
    });
}

#[test]
fn daily_series_groups_todays_orders_by_status() {
    let sys = Runtime::new().unwrap();
    sys.block_on(async move {
        let url = random_db_url("daily_groups");
        prepare_test_env(&url).await;
        let db = SqliteDatabase::new_with_url(&url, 1).await.expect("Error creating database");
        let id_pending = seed_order(&db, "ord-1", 0).await;
        let id_sent = seed_order(&db, "ord-2", 0).await;
        let id_failed = seed_order(&db, "ord-3", 0).await;
        db.update_notification(id_sent, NotificationStatus::Sent, Some(Utc::now()), None).await.unwrap();
        db.update_notification(id_failed, NotificationStatus::Failed, None, Some("boom".to_string())).await.unwrap();
        // a claimed-but-unresolved order still counts as pending
        assert!(db.claim_for_dispatch(id_pending, NotificationStatus::Pending).await.unwrap());

        let series = db.daily_counts(7).await.unwrap();
        assert_eq!(series.len(), 7);
        let today = series.last().unwrap();
        assert_eq!(today.pending, 1);
        assert_eq!(today.sent, 1);
        assert_eq!(today.failed, 1);
        assert_eq!(today.delivered, 0);
        assert_eq!(today.total(), 3);
    });
}

#[test]
fn counts_by_notification_status() {
    let sys = Runtime::new().unwrap();
    sys.block_on(async move {
        let url = random_db_url("status_counts");
        prepare_test_env(&url).await;
        let db = SqliteDatabase::new_with_url(&url, 1).await.expect("Error creating database");
        seed_order(&db, "ord-1", 3).await;
        seed_order(&db, "ord-2", 2).await;
        let id = seed_order(&db, "ord-3", 1).await;
        db.update_notification(id, NotificationStatus::Sent, Some(Utc::now()), None).await.unwrap();

        assert_eq!(db.count_by_notification_status(NotificationStatus::Pending).await.unwrap(), 2);
        assert_eq!(db.count_by_notification_status(NotificationStatus::Sent).await.unwrap(), 1);
        assert_eq!(db.count_by_notification_status(NotificationStatus::Failed).await.unwrap(), 0);
    });
}

#[test]
fn pending_orders_are_selected_oldest_first_and_capped() {
    let sys = Runtime::new().unwrap();
    sys.block_on(async move {
        let url = random_db_url("pending_ordering");
        prepare_test_env(&url).await;
        let db = SqliteDatabase::new_with_url(&url, 1).await.expect("Error creating database");
        seed_order(&db, "ord-young", 1).await;
        seed_order(&db, "ord-old", 5).await;
        seed_order(&db, "ord-middle", 3).await;

        let orders = db.fetch_pending_for_notification(10, "COMPLETED").await.unwrap();
        let ids: Vec<&str> = orders.iter().map(|o| o.order_id.as_str()).collect();
        assert_eq!(ids, vec!["ord-old", "ord-middle", "ord-young"]);

        let capped = db.fetch_pending_for_notification(2, "COMPLETED").await.unwrap();
        assert_eq!(capped.len(), 2);
        assert_eq!(capped[0].order_id.as_str(), "ord-old");
    });
}

#[test]
fn delivery_callbacks_move_sent_orders_onward() {
    let sys = Runtime::new().unwrap();
    sys.block_on(async move {
        let url = random_db_url("delivery_status");
        prepare_test_env(&url).await;
        let db = SqliteDatabase::new_with_url(&url, 1).await.expect("Error creating database");
        let id = seed_order(&db, "ord-1", 1).await;
        db.update_notification(id, NotificationStatus::Sent, Some(Utc::now()), None).await.unwrap();

        let order_id = OrderId::from("ord-1".to_string());
        db.record_delivery_status(&order_id, NotificationStatus::Delivered).await.unwrap();
        let order = db.fetch_order_by_order_id(&order_id).await.unwrap().unwrap();
        assert_eq!(order.notification_status, NotificationStatus::Delivered);

        db.record_delivery_status(&order_id, NotificationStatus::Read).await.unwrap();
        let order = db.fetch_order_by_order_id(&order_id).await.unwrap().unwrap();
        assert_eq!(order.notification_status, NotificationStatus::Read);

        let missing = OrderId::from("ord-does-not-exist".to_string());
        assert!(db.record_delivery_status(&missing, NotificationStatus::Delivered).await.is_err());
    });
}

#[test]
fn allow_list_upsert_toggles_the_same_entry() {
    let sys = Runtime::new().unwrap();
    sys.block_on(async move {
        let url = random_db_url("allow_list");
        prepare_test_env(&url).await;
        let db = SqliteDatabase::new_with_url(&url, 1).await.expect("Error creating database");

        let entry = db.upsert_allowed_phone("77011234567", true, Some("pilot user"), None).await.unwrap();
        assert!(entry.active);
        assert!(db.is_phone_allowed("77011234567").await.unwrap());

        let updated = db.upsert_allowed_phone("77011234567", false, Some("opted out"), None).await.unwrap();
        assert_eq!(updated.id, entry.id, "Upsert reuses the existing row");
        assert!(!updated.active);
        assert!(!db.is_phone_allowed("77011234567").await.unwrap());
        assert!(!db.is_phone_allowed("70000000000").await.unwrap(), "Unknown phones are not allowed");
    });
}
