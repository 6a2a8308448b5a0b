//! Order Repository
//!
//! All state moves are conditional UPDATEs: the WHERE clause carries the
//! expected current state and `rows_affected` reports whether this caller
//! won the transition. Concurrent writers therefore race at the storage
//! layer, not in application code.

use super::RepoResult;
use shared::models::{
    CartLine, Order, OrderItem, OrderStatus, OrderWithItems, OwnerIdentity, PaymentMethod,
    PaymentStatus, RecipientInfo, ShipperStats, StatusCounts,
};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

/// New order row, status starts at PENDING
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_no: String,
    pub user_id: Option<i64>,
    pub session_id: Option<String>,
    pub recipient: Option<RecipientInfo>,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub total_amount: f64,
    pub paid_at: Option<i64>,
}

/// Sort whitelist for order listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrderSort {
    #[default]
    CreatedDesc,
    CreatedAsc,
    TotalDesc,
    TotalAsc,
}

impl OrderSort {
    fn order_clause(&self) -> &'static str {
        match self {
            Self::CreatedDesc => " ORDER BY created_at DESC",
            Self::CreatedAsc => " ORDER BY created_at ASC",
            Self::TotalDesc => " ORDER BY total_amount DESC",
            Self::TotalAsc => " ORDER BY total_amount ASC",
        }
    }

    /// Parse a `sort_by`/`sort_dir` pair, anything unknown falls back to default
    pub fn from_params(sort_by: Option<&str>, sort_dir: Option<&str>) -> Self {
        let asc = matches!(sort_dir, Some("asc") | Some("ASC"));
        match sort_by {
            Some("total_amount") => {
                if asc {
                    Self::TotalAsc
                } else {
                    Self::TotalDesc
                }
            }
            _ => {
                if asc {
                    Self::CreatedAsc
                } else {
                    Self::CreatedDesc
                }
            }
        }
    }
}

/// Listing filter, all criteria optional and AND-combined
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub user_id: Option<i64>,
    pub session_id: Option<String>,
    pub recipient_phone: Option<String>,
    /// Fuzzy match on recipient name
    pub recipient_name: Option<String>,
    pub transaction_id: Option<String>,
    pub created_from: Option<i64>,
    /// Exclusive upper bound
    pub created_to: Option<i64>,
    pub sort: OrderSort,
    pub page: u32,
    pub per_page: u32,
}

// ========== Writes ==========

pub async fn insert(conn: &mut SqliteConnection, draft: &NewOrder) -> RepoResult<i64> {
    let now = shared::util::now_millis();
    let recipient = draft.recipient.as_ref();
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO orders (order_no, user_id, session_id, recipient_name, recipient_phone, shipping_address, note, status, payment_method, payment_status, total_amount, paid_at, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 'PENDING', ?8, ?9, ?10, ?11, ?12, ?12) RETURNING id",
    )
    .bind(&draft.order_no)
    .bind(draft.user_id)
    .bind(draft.session_id.as_deref())
    .bind(recipient.map(|r| r.recipient_name.as_str()))
    .bind(recipient.map(|r| r.recipient_phone.as_str()))
    .bind(recipient.map(|r| r.shipping_address.as_str()))
    .bind(recipient.and_then(|r| r.note.as_deref()))
    .bind(draft.payment_method.as_str())
    .bind(draft.payment_status.as_str())
    .bind(draft.total_amount)
    .bind(draft.paid_at)
    .bind(now)
    .fetch_one(conn)
    .await?;
    Ok(id)
}

/// Freeze cart lines into immutable order items
pub async fn insert_items(
    conn: &mut SqliteConnection,
    order_id: i64,
    lines: &[CartLine],
) -> RepoResult<()> {
    for line in lines {
        sqlx::query(
            "INSERT INTO order_item (order_id, product_id, product_name, unit_price, quantity) VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(order_id)
        .bind(line.product_id)
        .bind(&line.product_name)
        .bind(line.unit_price)
        .bind(line.quantity)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

/// Confirm an online payment. Returns `false` when the order was not in
/// PENDING payment state, i.e. another caller settled it first.
pub async fn mark_paid(
    conn: &mut SqliteConnection,
    id: i64,
    transaction_id: &str,
    paid_at: i64,
) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE orders SET payment_status = 'PAID', transaction_id = ?1, paid_at = ?2, updated_at = ?2 WHERE id = ?3 AND payment_status = 'PENDING'",
    )
    .bind(transaction_id)
    .bind(paid_at)
    .bind(id)
    .execute(conn)
    .await?;
    Ok(rows.rows_affected() == 1)
}

/// Record a failed online payment: the order is cancelled, no gateway
/// reference is retained. Same PENDING guard as [`mark_paid`].
pub async fn mark_payment_failed(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE orders SET status = 'CANCELLED', payment_status = 'FAILED', transaction_id = NULL, paid_at = NULL, updated_at = ?1 WHERE id = ?2 AND payment_status = 'PENDING'",
    )
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() == 1)
}

/// Move the workflow state, guarded by the expected current status.
///
/// Stamps `delivered_at` when the target is DELIVERED.
pub async fn set_status(
    pool: &SqlitePool,
    id: i64,
    from: OrderStatus,
    to: OrderStatus,
) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE orders SET status = ?1, delivered_at = CASE WHEN ?1 = 'DELIVERED' THEN ?2 ELSE delivered_at END, updated_at = ?2 WHERE id = ?3 AND status = ?4",
    )
    .bind(to.as_str())
    .bind(now)
    .bind(id)
    .bind(from.as_str())
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() == 1)
}

/// Assign a shipper and move to SHIPPING.
///
/// Only unassigned, settled orders are acceptable: an unpaid online order
/// has no inventory committed yet and must not ship.
pub async fn accept_shipping(pool: &SqlitePool, id: i64, shipper_id: i64) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE orders SET status = 'SHIPPING', shipper_id = ?1, updated_at = ?2 WHERE id = ?3 AND status IN ('PENDING', 'APPROVED') AND shipper_id IS NULL AND payment_status IN ('PAID', 'COD_PAID')",
    )
    .bind(shipper_id)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() == 1)
}

/// Complete delivery. An admin can force an order into SHIPPING without an
/// assignee, so the confirming shipper is adopted when the slot is empty;
/// a different assigned shipper cannot confirm.
pub async fn mark_delivered(pool: &SqlitePool, id: i64, shipper_id: i64) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE orders SET status = 'DELIVERED', shipper_id = COALESCE(shipper_id, ?1), delivered_at = ?2, updated_at = ?2 WHERE id = ?3 AND status = 'SHIPPING' AND (shipper_id IS NULL OR shipper_id = ?1)",
    )
    .bind(shipper_id)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() == 1)
}

/// COD delivery confirmation: delivery and cash collection in one move
pub async fn mark_cod_delivered(pool: &SqlitePool, id: i64, shipper_id: i64) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE orders SET status = 'DELIVERED', shipper_id = COALESCE(shipper_id, ?1), delivered_at = ?2, updated_at = ?2 WHERE id = ?3 AND status = 'SHIPPING' AND (shipper_id IS NULL OR shipper_id = ?1) AND payment_method = 'COD'",
    )
    .bind(shipper_id)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() == 1)
}

// ========== Reads ==========

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Order>> {
    let order = sqlx::query_as::<_, Order>(
        "SELECT id, order_no, user_id, session_id, recipient_name, recipient_phone, shipping_address, note, status, payment_method, payment_status, total_amount, shipper_id, transaction_id, paid_at, delivered_at, created_at, updated_at FROM orders WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(order)
}

pub async fn find_by_order_no(pool: &SqlitePool, order_no: &str) -> RepoResult<Option<Order>> {
    let order = sqlx::query_as::<_, Order>(
        "SELECT id, order_no, user_id, session_id, recipient_name, recipient_phone, shipping_address, note, status, payment_method, payment_status, total_amount, shipper_id, transaction_id, paid_at, delivered_at, created_at, updated_at FROM orders WHERE order_no = ?",
    )
    .bind(order_no)
    .fetch_optional(pool)
    .await?;
    Ok(order)
}

pub async fn find_by_transaction_id(
    pool: &SqlitePool,
    transaction_id: &str,
) -> RepoResult<Option<Order>> {
    let order = sqlx::query_as::<_, Order>(
        "SELECT id, order_no, user_id, session_id, recipient_name, recipient_phone, shipping_address, note, status, payment_method, payment_status, total_amount, shipper_id, transaction_id, paid_at, delivered_at, created_at, updated_at FROM orders WHERE transaction_id = ?",
    )
    .bind(transaction_id)
    .fetch_optional(pool)
    .await?;
    Ok(order)
}

pub async fn find_items(pool: &SqlitePool, order_id: i64) -> RepoResult<Vec<OrderItem>> {
    let items = sqlx::query_as::<_, OrderItem>(
        "SELECT id, order_id, product_id, product_name, unit_price, quantity FROM order_item WHERE order_id = ? ORDER BY id",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;
    Ok(items)
}

pub async fn find_with_items(pool: &SqlitePool, id: i64) -> RepoResult<Option<OrderWithItems>> {
    let Some(order) = find_by_id(pool, id).await? else {
        return Ok(None);
    };
    let items = find_items(pool, order.id).await?;
    Ok(Some(OrderWithItems { order, items }))
}

fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, filter: &OrderFilter) {
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status.as_str());
    }
    if let Some(payment_status) = filter.payment_status {
        qb.push(" AND payment_status = ")
            .push_bind(payment_status.as_str());
    }
    if let Some(user_id) = filter.user_id {
        qb.push(" AND user_id = ").push_bind(user_id);
    }
    if let Some(session_id) = filter.session_id.clone() {
        qb.push(" AND session_id = ").push_bind(session_id);
    }
    if let Some(phone) = filter.recipient_phone.clone() {
        qb.push(" AND recipient_phone = ").push_bind(phone);
    }
    if let Some(name) = &filter.recipient_name {
        qb.push(" AND recipient_name LIKE ")
            .push_bind(format!("%{name}%"));
    }
    if let Some(transaction_id) = filter.transaction_id.clone() {
        qb.push(" AND transaction_id = ").push_bind(transaction_id);
    }
    if let Some(from) = filter.created_from {
        qb.push(" AND created_at >= ").push_bind(from);
    }
    if let Some(to) = filter.created_to {
        qb.push(" AND created_at < ").push_bind(to);
    }
}

/// Filtered listing with total count for pagination
pub async fn list(pool: &SqlitePool, filter: &OrderFilter) -> RepoResult<(Vec<Order>, u64)> {
    let mut count_qb: QueryBuilder<'_, Sqlite> =
        QueryBuilder::new("SELECT COUNT(*) FROM orders WHERE 1 = 1");
    push_filters(&mut count_qb, filter);
    let total: i64 = count_qb.build_query_scalar().fetch_one(pool).await?;

    let per_page = filter.per_page.max(1);
    let page = filter.page.max(1);
    let offset = (page as i64 - 1) * per_page as i64;

    let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new(
        "SELECT id, order_no, user_id, session_id, recipient_name, recipient_phone, shipping_address, note, status, payment_method, payment_status, total_amount, shipper_id, transaction_id, paid_at, delivered_at, created_at, updated_at FROM orders WHERE 1 = 1",
    );
    push_filters(&mut qb, filter);
    qb.push(filter.sort.order_clause());
    qb.push(" LIMIT ").push_bind(per_page as i64);
    qb.push(" OFFSET ").push_bind(offset);

    let orders = qb.build_query_as::<Order>().fetch_all(pool).await?;
    Ok((orders, total as u64))
}

fn fold_status_counts(rows: Vec<(String, i64)>) -> StatusCounts {
    let mut counts = StatusCounts::default();
    for (status, count) in rows {
        match status.as_str() {
            "PENDING" => counts.pending = count,
            "APPROVED" => counts.approved = count,
            "SHIPPING" => counts.shipping = count,
            "DELIVERED" => counts.delivered = count,
            "CANCELLED" => counts.cancelled = count,
            _ => {}
        }
    }
    counts
}

pub async fn count_by_status(pool: &SqlitePool) -> RepoResult<StatusCounts> {
    let rows: Vec<(String, i64)> =
        sqlx::query_as("SELECT status, COUNT(*) FROM orders GROUP BY status")
            .fetch_all(pool)
            .await?;
    Ok(fold_status_counts(rows))
}

pub async fn count_by_status_for_owner(
    pool: &SqlitePool,
    owner: &OwnerIdentity,
) -> RepoResult<StatusCounts> {
    let rows: Vec<(String, i64)> = match owner {
        OwnerIdentity::User(user_id) => {
            sqlx::query_as(
                "SELECT status, COUNT(*) FROM orders WHERE user_id = ? GROUP BY status",
            )
            .bind(user_id)
            .fetch_all(pool)
            .await?
        }
        OwnerIdentity::Session(session_id) => {
            sqlx::query_as(
                "SELECT status, COUNT(*) FROM orders WHERE session_id = ? GROUP BY status",
            )
            .bind(session_id)
            .fetch_all(pool)
            .await?
        }
    };
    Ok(fold_status_counts(rows))
}

/// Work queue for one shipper: every unassigned settled order plus the
/// orders this shipper is already carrying
pub async fn find_dispatchable(pool: &SqlitePool, shipper_id: i64) -> RepoResult<Vec<Order>> {
    let orders = sqlx::query_as::<_, Order>(
        "SELECT id, order_no, user_id, session_id, recipient_name, recipient_phone, shipping_address, note, status, payment_method, payment_status, total_amount, shipper_id, transaction_id, paid_at, delivered_at, created_at, updated_at FROM orders WHERE (shipper_id IS NULL AND status IN ('PENDING', 'APPROVED') AND payment_status IN ('PAID', 'COD_PAID')) OR (shipper_id = ? AND status = 'SHIPPING') ORDER BY created_at",
    )
    .bind(shipper_id)
    .fetch_all(pool)
    .await?;
    Ok(orders)
}

pub async fn find_by_shipper(
    pool: &SqlitePool,
    shipper_id: i64,
    limit: i64,
    offset: i64,
) -> RepoResult<Vec<Order>> {
    let orders = sqlx::query_as::<_, Order>(
        "SELECT id, order_no, user_id, session_id, recipient_name, recipient_phone, shipping_address, note, status, payment_method, payment_status, total_amount, shipper_id, transaction_id, paid_at, delivered_at, created_at, updated_at FROM orders WHERE shipper_id = ? ORDER BY created_at DESC LIMIT ? OFFSET ?",
    )
    .bind(shipper_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(orders)
}

/// Delivered COD totals for one shipper
pub async fn shipper_stats(pool: &SqlitePool, shipper_id: i64) -> RepoResult<ShipperStats> {
    let stats = sqlx::query_as::<_, ShipperStats>(
        "SELECT COUNT(*) AS delivered_count, COALESCE(SUM(total_amount), 0) AS cod_collected FROM orders WHERE shipper_id = ? AND status = 'DELIVERED' AND payment_method = 'COD'",
    )
    .bind(shipper_id)
    .fetch_one(pool)
    .await?;
    Ok(stats)
}
