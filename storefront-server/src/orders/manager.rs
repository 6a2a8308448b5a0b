//! Order Lifecycle Manager
//!
//! Every mutation is one SQLite transaction covering the order row and
//! the stock rows it touches. State moves are delegated to conditional
//! UPDATEs in the repository; when a move reports zero rows this layer
//! re-reads the order and decides between "someone else already did it"
//! (idempotent success) and a genuine `InvalidState`.

use std::sync::Arc;

use shared::models::{
    CartLine, CodCheckout, OnlineCheckout, Order, OrderStatus, OrderWithItems, OwnerIdentity,
    PaymentMethod, PaymentStatus,
};
use sqlx::SqlitePool;
use validator::Validate;

use super::error::{OrderFlowError, OrderFlowResult};
use crate::db::repository::order::NewOrder;
use crate::db::repository::{cart, order};
use crate::inventory::InventoryLedger;
use crate::payment::{CallbackData, PaymentGateway};

/// Resolve which cart an order is created from.
///
/// A session key wins when both are present: a customer logging in at
/// checkout keeps the guest cart, the user id only attaches as owner.
fn cart_identity(user_id: Option<i64>, session_id: Option<&str>) -> OrderFlowResult<OwnerIdentity> {
    match (user_id, session_id) {
        (_, Some(sid)) => Ok(OwnerIdentity::Session(sid.to_string())),
        (Some(uid), None) => Ok(OwnerIdentity::User(uid)),
        (None, None) => Err(OrderFlowError::Validation(
            "user_id or session_id is required".into(),
        )),
    }
}

fn cart_total(lines: &[CartLine]) -> f64 {
    lines.iter().map(CartLine::line_total).sum()
}

#[derive(Clone)]
pub struct OrderLifecycleManager {
    pool: SqlitePool,
    ledger: InventoryLedger,
    gateway: Arc<PaymentGateway>,
}

impl OrderLifecycleManager {
    pub fn new(pool: SqlitePool, gateway: Arc<PaymentGateway>) -> Self {
        let ledger = InventoryLedger::new(pool.clone());
        Self {
            pool,
            ledger,
            gateway,
        }
    }

    async fn require_order(&self, order_id: i64) -> OrderFlowResult<Order> {
        order::find_by_id(&self.pool, order_id)
            .await?
            .ok_or_else(|| OrderFlowError::NotFound(format!("Order {order_id} not found")))
    }

    /// Online checkout: freeze the cart into a PENDING order and hand
    /// back the gateway redirect URL. Inventory is not touched and the
    /// cart is kept until the payment settles.
    pub async fn checkout_online(
        &self,
        req: OnlineCheckout,
    ) -> OrderFlowResult<(OrderWithItems, String)> {
        req.validate()?;
        let identity = cart_identity(req.user_id, req.session_id.as_deref())?;
        let lines = cart::find_by_identity(&self.pool, &identity.cart_key()).await?;
        if lines.is_empty() {
            return Err(OrderFlowError::CartEmpty);
        }
        let total = cart_total(&lines);

        let draft = NewOrder {
            order_no: shared::util::order_no(),
            user_id: req.user_id,
            session_id: req.session_id.clone(),
            recipient: req.recipient.clone(),
            payment_method: PaymentMethod::Online,
            payment_status: PaymentStatus::Pending,
            total_amount: total,
            paid_at: None,
        };

        let mut tx = self.pool.begin().await?;
        let order_id = order::insert(&mut tx, &draft).await?;
        order::insert_items(&mut tx, order_id, &lines).await?;
        tx.commit().await?;

        let order = order::find_with_items(&self.pool, order_id)
            .await?
            .ok_or_else(|| OrderFlowError::NotFound(format!("Order {order_id} not found")))?;
        let url = self.gateway.build_redirect_url(
            order_id,
            total,
            &format!("Order {}", order.order.order_no),
        )?;
        tracing::info!(order_id, order_no = %order.order.order_no, total, "online order created");
        Ok((order, url))
    }

    /// Fresh gateway redirect for an order still awaiting payment
    pub async fn payment_url(&self, order_id: i64) -> OrderFlowResult<String> {
        let order = self.require_order(order_id).await?;
        if order.payment_method != PaymentMethod::Online
            || order.payment_status != PaymentStatus::Pending
        {
            return Err(OrderFlowError::invalid_state(order.status, "initiate payment"));
        }
        Ok(self.gateway.build_redirect_url(
            order.id,
            order.total_amount,
            &format!("Order {}", order.order_no),
        )?)
    }

    /// Settle an order from a verified success callback.
    ///
    /// The PAID flip, the stock decrements and the cart clear share one
    /// transaction; a duplicate notification loses the CAS and returns
    /// the already-settled order unchanged.
    pub async fn confirm_online_payment_success(
        &self,
        callback: &CallbackData,
    ) -> OrderFlowResult<Order> {
        let order_id = callback.order_ref;
        let order = self.require_order(order_id).await?;
        if (callback.amount() - order.total_amount).abs() > 0.005 {
            return Err(OrderFlowError::Validation(format!(
                "Callback amount {} does not match order total {}",
                callback.amount(),
                order.total_amount
            )));
        }
        // Line items are immutable once frozen, safe to read outside the tx
        let items = order::find_items(&self.pool, order_id).await?;

        let mut tx = self.pool.begin().await?;
        let now = shared::util::now_millis();
        let won = order::mark_paid(&mut tx, order_id, &callback.transaction_id, now).await?;
        if !won {
            tx.rollback().await?;
            let order = self.require_order(order_id).await?;
            return if order.payment_status == PaymentStatus::Paid {
                tracing::info!(order_id, "duplicate payment confirmation ignored");
                Ok(order)
            } else {
                Err(OrderFlowError::invalid_state(order.status, "confirm payment"))
            };
        }

        for item in &items {
            self.ledger
                .decrement_in(&mut tx, item.product_id, item.quantity)
                .await?;
        }

        let (user_id, session_id): (Option<i64>, Option<String>) =
            sqlx::query_as("SELECT user_id, session_id FROM orders WHERE id = ?")
                .bind(order_id)
                .fetch_one(&mut *tx)
                .await?;
        let identity = cart_identity(user_id, session_id.as_deref())?;
        cart::clear(&mut tx, &identity.cart_key()).await?;
        tx.commit().await?;

        tracing::info!(order_id, transaction_id = %callback.transaction_id, "online payment confirmed");
        self.require_order(order_id).await
    }

    /// Record a failed payment: the order is cancelled, the cart is kept
    /// so the customer can retry. Orders already settled or already
    /// failed pass through unchanged.
    pub async fn confirm_online_payment_failure(
        &self,
        order_id: i64,
        reason: &str,
    ) -> OrderFlowResult<Order> {
        let changed = order::mark_payment_failed(&self.pool, order_id).await?;
        let order = self.require_order(order_id).await?;
        if changed {
            tracing::warn!(order_id, reason, "online payment failed, order cancelled");
        }
        Ok(order)
    }

    /// COD checkout: order creation and the all-or-nothing stock
    /// commitment happen in one transaction, so a shortfall on any line
    /// persists nothing.
    pub async fn checkout_cod(&self, req: CodCheckout) -> OrderFlowResult<OrderWithItems> {
        req.validate()?;
        let identity = cart_identity(req.user_id, req.session_id.as_deref())?;
        let lines = cart::find_by_identity(&self.pool, &identity.cart_key()).await?;
        if lines.is_empty() {
            return Err(OrderFlowError::CartEmpty);
        }
        let total = cart_total(&lines);
        let now = shared::util::now_millis();

        let draft = NewOrder {
            order_no: shared::util::order_no(),
            user_id: req.user_id,
            session_id: req.session_id.clone(),
            recipient: Some(req.recipient.clone()),
            payment_method: PaymentMethod::Cod,
            payment_status: PaymentStatus::CodPaid,
            total_amount: total,
            paid_at: Some(now),
        };

        let mut tx = self.pool.begin().await?;
        let order_id = order::insert(&mut tx, &draft).await?;
        order::insert_items(&mut tx, order_id, &lines).await?;
        self.ledger.decrement_for_order(&mut tx, &lines).await?;
        cart::clear(&mut tx, &identity.cart_key()).await?;
        tx.commit().await?;

        tracing::info!(order_id, total, "COD order created");
        order::find_with_items(&self.pool, order_id)
            .await?
            .ok_or_else(|| OrderFlowError::NotFound(format!("Order {order_id} not found")))
    }

    /// Administrative override, held to the same transition matrix as the
    /// regular workflow. Settled orders cannot be cancelled: their stock
    /// is committed and cancellation does not restock.
    pub async fn admin_set_status(
        &self,
        order_id: i64,
        to: OrderStatus,
    ) -> OrderFlowResult<Order> {
        let order = self.require_order(order_id).await?;
        if !order.status.can_transition_to(to) {
            return Err(OrderFlowError::invalid_state(
                order.status,
                format!("move to {to}"),
            ));
        }
        if to == OrderStatus::Cancelled && order.payment_status.is_settled() {
            return Err(OrderFlowError::invalid_state(
                order.status,
                "cancel a settled order",
            ));
        }

        let moved = order::set_status(&self.pool, order_id, order.status, to).await?;
        if !moved {
            // Lost the race to a concurrent writer
            let current = self.require_order(order_id).await?;
            return Err(OrderFlowError::invalid_state(
                current.status,
                format!("move to {to}"),
            ));
        }
        tracing::info!(order_id, status = %to, "order status overridden");
        self.require_order(order_id).await
    }

    /// Shipper takes an unassigned, settled order
    pub async fn accept_by_shipper(
        &self,
        order_id: i64,
        shipper_id: i64,
    ) -> OrderFlowResult<Order> {
        let accepted = order::accept_shipping(&self.pool, order_id, shipper_id).await?;
        if !accepted {
            let order = self.require_order(order_id).await?;
            if order.shipper_id.is_some_and(|id| id != shipper_id) {
                return Err(OrderFlowError::invalid_state(
                    order.status,
                    "accept an order already assigned",
                ));
            }
            if !order.payment_status.is_settled() {
                return Err(OrderFlowError::invalid_state(
                    order.status,
                    "accept an unpaid order",
                ));
            }
            return Err(OrderFlowError::invalid_state(order.status, "accept for shipping"));
        }
        tracing::info!(order_id, shipper_id, "order accepted for shipping");
        self.require_order(order_id).await
    }

    /// Delivery confirmation by the carrying shipper
    pub async fn confirm_delivered_by_shipper(
        &self,
        order_id: i64,
        shipper_id: i64,
    ) -> OrderFlowResult<Order> {
        let delivered = order::mark_delivered(&self.pool, order_id, shipper_id).await?;
        if !delivered {
            let order = self.require_order(order_id).await?;
            return Err(OrderFlowError::invalid_state(order.status, "confirm delivery"));
        }
        tracing::info!(order_id, shipper_id, "order delivered");
        self.require_order(order_id).await
    }

    /// COD delivery confirmation: cash collection and delivery in one move
    pub async fn confirm_cod_delivered(
        &self,
        order_id: i64,
        shipper_id: i64,
    ) -> OrderFlowResult<Order> {
        let delivered = order::mark_cod_delivered(&self.pool, order_id, shipper_id).await?;
        if !delivered {
            let order = self.require_order(order_id).await?;
            if order.payment_method != PaymentMethod::Cod {
                return Err(OrderFlowError::invalid_state(
                    order.status,
                    "collect COD on an online order",
                ));
            }
            return Err(OrderFlowError::invalid_state(
                order.status,
                "confirm COD delivery",
            ));
        }
        tracing::info!(order_id, shipper_id, "COD order delivered and collected");
        self.require_order(order_id).await
    }
}
