//! 并发竞争测试
//!
//! 文件数据库 (WAL + busy_timeout)，多任务同时驱动同一订单，
//! 验证 CAS 状态机在真实并发下的幂等性。

use tempfile::TempDir;

use shared::models::{OwnerIdentity, RecipientInfo};
use storefront_server::db::repository::{cart, product};
use storefront_server::payment::CallbackData;
use storefront_server::{Config, ServerState};

async fn test_state() -> (ServerState, TempDir) {
    let dir = TempDir::new().expect("tempdir");
    let mut config = Config::with_overrides(dir.path().to_string_lossy().to_string(), 0);
    config.gateway_merchant_code = "TESTMC".into();
    config.gateway_secret_key = "race-secret".into();
    let state = ServerState::initialize(&config).await.expect("state");
    (state, dir)
}

fn recipient() -> RecipientInfo {
    RecipientInfo {
        recipient_name: "Le Van C".into(),
        recipient_phone: "0912345678".into(),
        shipping_address: "5 Nguyen Trai, Da Nang".into(),
        note: None,
    }
}

async fn seed_cart(state: &ServerState, session: &str, price: f64, stock: i64, qty: i64) -> i64 {
    let p = product::create(
        state.pool(),
        shared::models::ProductCreate {
            name: format!("Race Widget {session}"),
            price,
            stock,
        },
    )
    .await
    .expect("product");
    let key = OwnerIdentity::Session(session.to_string()).cart_key();
    cart::add_item(state.pool(), &key, p.id, qty)
        .await
        .expect("cart");
    p.id
}

async fn stock_of(state: &ServerState, product_id: i64) -> i64 {
    product::find_by_id(state.pool(), product_id)
        .await
        .expect("query")
        .expect("product")
        .stock
}

#[tokio::test]
async fn concurrent_payment_confirmations_decrement_once() {
    let (state, _dir) = test_state().await;
    let product_id = seed_cart(&state, "race-pay", 100_000.0, 10, 3).await;

    let (order, _url) = state
        .orders
        .checkout_online(shared::models::OnlineCheckout {
            user_id: None,
            session_id: Some("race-pay".into()),
            recipient: None,
        })
        .await
        .expect("checkout");
    let order_id = order.order.id;

    let callback = CallbackData {
        order_ref: order_id,
        transaction_id: "GW-RACE-1".into(),
        amount_minor: 30_000_000,
        response_code: "00".into(),
        success: true,
    };

    let mut handles = Vec::new();
    for _ in 0..4 {
        let manager = state.orders.clone();
        let cb = callback.clone();
        handles.push(tokio::spawn(async move {
            manager.confirm_online_payment_success(&cb).await
        }));
    }

    // Every confirmation settles into PAID, losers of the CAS included
    for handle in handles {
        let order = handle.await.expect("join").expect("confirm");
        assert_eq!(order.payment_status, shared::models::PaymentStatus::Paid);
    }
    assert_eq!(stock_of(&state, product_id).await, 7);
}

#[tokio::test]
async fn concurrent_shipper_accepts_assign_exactly_one() {
    let (state, _dir) = test_state().await;
    seed_cart(&state, "race-ship", 80_000.0, 5, 1).await;

    let order = state
        .orders
        .checkout_cod(shared::models::CodCheckout {
            user_id: None,
            session_id: Some("race-ship".into()),
            recipient: recipient(),
        })
        .await
        .expect("checkout");
    let order_id = order.order.id;

    let mut handles = Vec::new();
    for shipper_id in 1..=4 {
        let manager = state.orders.clone();
        handles.push(tokio::spawn(async move {
            manager.accept_by_shipper(order_id, shipper_id).await
        }));
    }

    let mut winners = Vec::new();
    for handle in handles {
        if let Ok(order) = handle.await.expect("join") {
            winners.push(order.shipper_id.expect("assigned"));
        }
    }
    assert_eq!(winners.len(), 1, "exactly one shipper wins the order");

    let settled = storefront_server::db::repository::order::find_by_id(state.pool(), order_id)
        .await
        .expect("query")
        .expect("order");
    assert_eq!(settled.shipper_id, Some(winners[0]));
    assert_eq!(settled.status, shared::models::OrderStatus::Shipping);
}
