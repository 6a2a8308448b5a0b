//! Lifecycle acceptance flows against in-memory SQLite

use std::sync::Arc;

use shared::models::{
    CodCheckout, OnlineCheckout, OrderStatus, OwnerIdentity, PaymentMethod, PaymentStatus,
    ProductCreate, RecipientInfo,
};
use sqlx::SqlitePool;

use super::{OrderFlowError, OrderLifecycleManager};
use crate::db::memory_pool;
use crate::db::repository::{cart, order, product};
use crate::payment::{CallbackData, GatewayConfig, PaymentGateway};

fn test_gateway() -> Arc<PaymentGateway> {
    Arc::new(PaymentGateway::new(GatewayConfig {
        merchant_code: "TEST01".into(),
        secret_key: "testsecret".into(),
        pay_url: "https://pay.example.com/checkout".into(),
        return_url: "https://shop.example.com/payment/callback".into(),
    }))
}

async fn setup() -> (OrderLifecycleManager, SqlitePool) {
    let pool = memory_pool().await;
    let manager = OrderLifecycleManager::new(pool.clone(), test_gateway());
    (manager, pool)
}

async fn seed_product(pool: &SqlitePool, name: &str, price: f64, stock: i64) -> i64 {
    product::create(
        pool,
        ProductCreate {
            name: name.into(),
            price,
            stock,
        },
    )
    .await
    .unwrap()
    .id
}

fn session_key(sid: &str) -> String {
    OwnerIdentity::Session(sid.into()).cart_key()
}

fn recipient() -> RecipientInfo {
    RecipientInfo {
        recipient_name: "Alice".into(),
        recipient_phone: "0900000001".into(),
        shipping_address: "1 Main Street".into(),
        note: None,
    }
}

fn online_req(sid: &str) -> OnlineCheckout {
    OnlineCheckout {
        user_id: None,
        session_id: Some(sid.into()),
        recipient: Some(recipient()),
    }
}

fn cod_req(sid: &str) -> CodCheckout {
    CodCheckout {
        user_id: None,
        session_id: Some(sid.into()),
        recipient: recipient(),
    }
}

fn success_callback(order_id: i64, transaction_id: &str, amount: f64) -> CallbackData {
    CallbackData {
        order_ref: order_id,
        transaction_id: transaction_id.into(),
        amount_minor: (amount * 100.0).round() as i64,
        response_code: "00".into(),
        success: true,
    }
}

async fn stock_of(pool: &SqlitePool, product_id: i64) -> i64 {
    sqlx::query_scalar("SELECT stock FROM product WHERE id = ?")
        .bind(product_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

#[tokio::test]
async fn checkout_rejects_empty_cart() {
    let (manager, _pool) = setup().await;
    let err = manager.checkout_online(online_req("s1")).await.unwrap_err();
    assert!(matches!(err, OrderFlowError::CartEmpty));
    let err = manager.checkout_cod(cod_req("s1")).await.unwrap_err();
    assert!(matches!(err, OrderFlowError::CartEmpty));
}

#[tokio::test]
async fn online_totals_are_frozen_across_price_changes() {
    let (manager, pool) = setup().await;
    let pid = seed_product(&pool, "Widget", 100_000.0, 10).await;
    cart::add_item(&pool, &session_key("s1"), pid, 2).await.unwrap();

    let (created, url) = manager.checkout_online(online_req("s1")).await.unwrap();
    assert_eq!(created.order.total_amount, 200_000.0);
    assert_eq!(created.order.payment_status, PaymentStatus::Pending);
    assert!(url.contains(&format!("vnp_TxnRef={}", created.order.id)));

    // Catalog price moves, the frozen snapshot does not
    sqlx::query("UPDATE product SET price = 150000 WHERE id = ?")
        .bind(pid)
        .execute(&pool)
        .await
        .unwrap();

    let detail = order::find_with_items(&pool, created.order.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(detail.order.total_amount, 200_000.0);
    assert_eq!(detail.items[0].unit_price, 100_000.0);

    // Online checkout reserves nothing until payment settles
    assert_eq!(stock_of(&pool, pid).await, 10);
    assert!(!cart::find_by_identity(&pool, &session_key("s1"))
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn double_payment_confirmation_decrements_once() {
    let (manager, pool) = setup().await;
    let pid = seed_product(&pool, "Widget", 100_000.0, 10).await;
    cart::add_item(&pool, &session_key("s1"), pid, 2).await.unwrap();
    let (created, _) = manager.checkout_online(online_req("s1")).await.unwrap();
    let id = created.order.id;

    let paid = manager
        .confirm_online_payment_success(&success_callback(id, "GW1", 200_000.0))
        .await
        .unwrap();
    assert_eq!(paid.payment_status, PaymentStatus::Paid);
    assert_eq!(paid.transaction_id.as_deref(), Some("GW1"));
    assert!(paid.paid_at.is_some());
    assert_eq!(stock_of(&pool, pid).await, 8);
    assert!(cart::find_by_identity(&pool, &session_key("s1"))
        .await
        .unwrap()
        .is_empty());

    // The replayed notification loses the CAS and changes nothing
    let replay = manager
        .confirm_online_payment_success(&success_callback(id, "GW2", 200_000.0))
        .await
        .unwrap();
    assert_eq!(replay.payment_status, PaymentStatus::Paid);
    assert_eq!(replay.transaction_id.as_deref(), Some("GW1"));
    assert_eq!(stock_of(&pool, pid).await, 8);
}

#[tokio::test]
async fn payment_success_shortfall_rolls_everything_back() {
    let (manager, pool) = setup().await;
    let pid = seed_product(&pool, "Widget", 100_000.0, 1).await;
    cart::add_item(&pool, &session_key("s1"), pid, 2).await.unwrap();
    let (created, _) = manager.checkout_online(online_req("s1")).await.unwrap();

    let err = manager
        .confirm_online_payment_success(&success_callback(created.order.id, "GW1", 200_000.0))
        .await
        .unwrap_err();
    assert!(matches!(err, OrderFlowError::InsufficientStock { requested: 2, available: 1, .. }));

    // The CAS flip was rolled back with the decrement
    let order = order::find_by_id(&pool, created.order.id).await.unwrap().unwrap();
    assert_eq!(order.payment_status, PaymentStatus::Pending);
    assert!(order.transaction_id.is_none());
    assert_eq!(stock_of(&pool, pid).await, 1);
}

#[tokio::test]
async fn payment_failure_cancels_but_keeps_cart() {
    let (manager, pool) = setup().await;
    let pid = seed_product(&pool, "Widget", 100_000.0, 10).await;
    cart::add_item(&pool, &session_key("s1"), pid, 2).await.unwrap();
    let (created, _) = manager.checkout_online(online_req("s1")).await.unwrap();

    let failed = manager
        .confirm_online_payment_failure(created.order.id, "24")
        .await
        .unwrap();
    assert_eq!(failed.status, OrderStatus::Cancelled);
    assert_eq!(failed.payment_status, PaymentStatus::Failed);
    assert_eq!(stock_of(&pool, pid).await, 10);

    // Customer keeps the cart to retry
    assert_eq!(
        cart::find_by_identity(&pool, &session_key("s1"))
            .await
            .unwrap()
            .len(),
        1
    );

    // Replayed failure notification is a no-op
    let replay = manager
        .confirm_online_payment_failure(created.order.id, "24")
        .await
        .unwrap();
    assert_eq!(replay.status, OrderStatus::Cancelled);
}

#[tokio::test]
async fn failure_after_success_does_not_unpay() {
    let (manager, pool) = setup().await;
    let pid = seed_product(&pool, "Widget", 100_000.0, 10).await;
    cart::add_item(&pool, &session_key("s1"), pid, 1).await.unwrap();
    let (created, _) = manager.checkout_online(online_req("s1")).await.unwrap();
    let id = created.order.id;

    manager
        .confirm_online_payment_success(&success_callback(id, "GW1", 100_000.0))
        .await
        .unwrap();
    let after = manager.confirm_online_payment_failure(id, "97").await.unwrap();
    assert_eq!(after.payment_status, PaymentStatus::Paid);
    assert_eq!(after.status, OrderStatus::Pending);
    assert_eq!(stock_of(&pool, pid).await, 9);
}

#[tokio::test]
async fn cod_shortfall_persists_nothing() {
    let (manager, pool) = setup().await;
    let a = seed_product(&pool, "A", 100_000.0, 5).await;
    let b = seed_product(&pool, "B", 50_000.0, 1).await;
    let key = session_key("session_abc");
    cart::add_item(&pool, &key, a, 2).await.unwrap();
    cart::add_item(&pool, &key, b, 3).await.unwrap();

    let err = manager.checkout_cod(cod_req("session_abc")).await.unwrap_err();
    assert!(matches!(err, OrderFlowError::InsufficientStock { product_id, .. } if product_id == b));

    // Nothing persisted: no order, sibling stock untouched, cart intact
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
    assert_eq!(stock_of(&pool, a).await, 5);
    assert_eq!(stock_of(&pool, b).await, 1);
    assert_eq!(cart::find_by_identity(&pool, &key).await.unwrap().len(), 2);
}

#[tokio::test]
async fn cod_end_to_end_flow() {
    let (manager, pool) = setup().await;
    let a = seed_product(&pool, "A", 100_000.0, 5).await;
    let b = seed_product(&pool, "B", 50_000.0, 1).await;
    let key = session_key("session_abc");
    cart::add_item(&pool, &key, a, 2).await.unwrap();
    cart::add_item(&pool, &key, b, 3).await.unwrap();
    cart::set_quantity(&pool, &key, b, 1).await.unwrap();

    let created = manager.checkout_cod(cod_req("session_abc")).await.unwrap();
    let id = created.order.id;
    assert_eq!(created.order.status, OrderStatus::Pending);
    assert_eq!(created.order.payment_method, PaymentMethod::Cod);
    assert_eq!(created.order.payment_status, PaymentStatus::CodPaid);
    assert_eq!(created.order.total_amount, 250_000.0);
    assert!(created.order.paid_at.is_some());
    assert_eq!(created.items.len(), 2);
    assert_eq!(stock_of(&pool, a).await, 3);
    assert_eq!(stock_of(&pool, b).await, 0);
    assert!(cart::find_by_identity(&pool, &key).await.unwrap().is_empty());

    let shipping = manager.accept_by_shipper(id, 7).await.unwrap();
    assert_eq!(shipping.status, OrderStatus::Shipping);
    assert_eq!(shipping.shipper_id, Some(7));

    let delivered = manager.confirm_cod_delivered(id, 7).await.unwrap();
    assert_eq!(delivered.status, OrderStatus::Delivered);
    assert!(delivered.delivered_at.is_some());

    let stats = order::shipper_stats(&pool, 7).await.unwrap();
    assert_eq!(stats.delivered_count, 1);
    assert_eq!(stats.cod_collected, 250_000.0);
}

#[tokio::test]
async fn pending_order_cannot_be_delivered() {
    let (manager, pool) = setup().await;
    let pid = seed_product(&pool, "Widget", 100_000.0, 5).await;
    cart::add_item(&pool, &session_key("s1"), pid, 1).await.unwrap();
    let created = manager.checkout_cod(cod_req("s1")).await.unwrap();

    let err = manager
        .confirm_delivered_by_shipper(created.order.id, 7)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        OrderFlowError::InvalidState { from: OrderStatus::Pending, .. }
    ));

    let err = manager
        .admin_set_status(created.order.id, OrderStatus::Delivered)
        .await
        .unwrap_err();
    assert!(matches!(err, OrderFlowError::InvalidState { .. }));
}

#[tokio::test]
async fn unpaid_online_order_cannot_ship() {
    let (manager, pool) = setup().await;
    let pid = seed_product(&pool, "Widget", 100_000.0, 5).await;
    cart::add_item(&pool, &session_key("s1"), pid, 1).await.unwrap();
    let (created, _) = manager.checkout_online(online_req("s1")).await.unwrap();

    let err = manager.accept_by_shipper(created.order.id, 7).await.unwrap_err();
    assert!(matches!(err, OrderFlowError::InvalidState { .. }));
}

#[tokio::test]
async fn settled_order_cannot_be_cancelled() {
    let (manager, pool) = setup().await;
    let pid = seed_product(&pool, "Widget", 100_000.0, 5).await;
    cart::add_item(&pool, &session_key("s1"), pid, 1).await.unwrap();
    let created = manager.checkout_cod(cod_req("s1")).await.unwrap();

    let err = manager
        .admin_set_status(created.order.id, OrderStatus::Cancelled)
        .await
        .unwrap_err();
    assert!(matches!(err, OrderFlowError::InvalidState { .. }));
}

#[tokio::test]
async fn unpaid_online_order_can_be_cancelled_by_admin() {
    let (manager, pool) = setup().await;
    let pid = seed_product(&pool, "Widget", 100_000.0, 5).await;
    cart::add_item(&pool, &session_key("s1"), pid, 1).await.unwrap();
    let (created, _) = manager.checkout_online(online_req("s1")).await.unwrap();

    let cancelled = manager
        .admin_set_status(created.order.id, OrderStatus::Cancelled)
        .await
        .unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert_eq!(stock_of(&pool, pid).await, 5);
}

#[tokio::test]
async fn admin_shipping_order_adopts_confirming_shipper() {
    let (manager, pool) = setup().await;
    let pid = seed_product(&pool, "Widget", 100_000.0, 5).await;
    cart::add_item(&pool, &session_key("s1"), pid, 1).await.unwrap();
    let created = manager.checkout_cod(cod_req("s1")).await.unwrap();
    let id = created.order.id;

    let approved = manager.admin_set_status(id, OrderStatus::Approved).await.unwrap();
    assert_eq!(approved.status, OrderStatus::Approved);

    // Admin forces SHIPPING without an assignee
    let shipping = manager.admin_set_status(id, OrderStatus::Shipping).await.unwrap();
    assert_eq!(shipping.status, OrderStatus::Shipping);
    assert_eq!(shipping.shipper_id, None);

    let delivered = manager.confirm_delivered_by_shipper(id, 9).await.unwrap();
    assert_eq!(delivered.shipper_id, Some(9));
    assert_eq!(delivered.status, OrderStatus::Delivered);
}

#[tokio::test]
async fn delivery_by_wrong_shipper_is_rejected() {
    let (manager, pool) = setup().await;
    let pid = seed_product(&pool, "Widget", 100_000.0, 5).await;
    cart::add_item(&pool, &session_key("s1"), pid, 1).await.unwrap();
    let created = manager.checkout_cod(cod_req("s1")).await.unwrap();
    let id = created.order.id;

    manager.accept_by_shipper(id, 7).await.unwrap();
    let err = manager.confirm_delivered_by_shipper(id, 8).await.unwrap_err();
    assert!(matches!(err, OrderFlowError::InvalidState { .. }));
}

#[tokio::test]
async fn cod_collection_rejected_for_online_orders() {
    let (manager, pool) = setup().await;
    let pid = seed_product(&pool, "Widget", 100_000.0, 5).await;
    cart::add_item(&pool, &session_key("s1"), pid, 1).await.unwrap();
    let (created, _) = manager.checkout_online(online_req("s1")).await.unwrap();
    let id = created.order.id;

    manager
        .confirm_online_payment_success(&success_callback(id, "GW1", 100_000.0))
        .await
        .unwrap();
    manager.accept_by_shipper(id, 7).await.unwrap();

    let err = manager.confirm_cod_delivered(id, 7).await.unwrap_err();
    assert!(matches!(err, OrderFlowError::InvalidState { .. }));

    // The regular confirmation still works
    let delivered = manager.confirm_delivered_by_shipper(id, 7).await.unwrap();
    assert_eq!(delivered.status, OrderStatus::Delivered);
}

#[tokio::test]
async fn session_order_attaches_logged_in_owner() {
    let (manager, pool) = setup().await;
    let pid = seed_product(&pool, "Widget", 100_000.0, 5).await;
    cart::add_item(&pool, &session_key("s1"), pid, 1).await.unwrap();

    let req = CodCheckout {
        user_id: Some(42),
        session_id: Some("s1".into()),
        recipient: recipient(),
    };
    let created = manager.checkout_cod(req).await.unwrap();
    assert_eq!(created.order.user_id, Some(42));
    assert_eq!(created.order.session_id.as_deref(), Some("s1"));

    let counts = order::count_by_status_for_owner(&pool, &OwnerIdentity::User(42))
        .await
        .unwrap();
    assert_eq!(counts.pending, 1);
}

#[tokio::test]
async fn cod_recipient_is_mandatory() {
    let (manager, pool) = setup().await;
    let pid = seed_product(&pool, "Widget", 100_000.0, 5).await;
    cart::add_item(&pool, &session_key("s1"), pid, 1).await.unwrap();

    let req = CodCheckout {
        user_id: None,
        session_id: Some("s1".into()),
        recipient: RecipientInfo {
            recipient_name: "".into(),
            recipient_phone: "0900000001".into(),
            shipping_address: "1 Main Street".into(),
            note: None,
        },
    };
    let err = manager.checkout_cod(req).await.unwrap_err();
    assert!(matches!(err, OrderFlowError::Validation(_)));
}
