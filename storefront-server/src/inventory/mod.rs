//! Inventory Ledger
//!
//! Stock moves are single conditional UPDATEs: the `stock >= n` guard
//! lives in the WHERE clause, so SQLite serializes concurrent decrements
//! and the column can never go negative. Multi-line reservations run on
//! the caller's transaction connection and roll back as a unit.

use shared::models::CartLine;
use sqlx::{SqliteConnection, SqlitePool};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Product not found: {0}")]
    ProductNotFound(i64),

    #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    Insufficient {
        product_id: i64,
        requested: i64,
        available: i64,
    },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Guarded stock mutations over the product table
#[derive(Clone)]
pub struct InventoryLedger {
    pool: SqlitePool,
}

impl InventoryLedger {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Decrement one product's stock, refusing to go below zero.
    ///
    /// Returns the remaining stock after the decrement.
    pub async fn decrement(&self, product_id: i64, quantity: i64) -> LedgerResult<i64> {
        let mut conn = self.pool.acquire().await?;
        decrement_on(&mut conn, product_id, quantity).await
    }

    /// Return stock to the shelf (cancellation, failed payment cleanup)
    pub async fn increment(&self, product_id: i64, quantity: i64) -> LedgerResult<i64> {
        let now = shared::util::now_millis();
        let stock = sqlx::query_scalar::<_, i64>(
            "UPDATE product SET stock = stock + ?1, updated_at = ?2 WHERE id = ?3 RETURNING stock",
        )
        .bind(quantity)
        .bind(now)
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;
        stock.ok_or(LedgerError::ProductNotFound(product_id))
    }

    /// Single-product decrement on the caller's transaction
    pub async fn decrement_in(
        &self,
        conn: &mut SqliteConnection,
        product_id: i64,
        quantity: i64,
    ) -> LedgerResult<i64> {
        decrement_on(conn, product_id, quantity).await
    }

    /// Reserve stock for every line of an order, on the caller's
    /// transaction. The first failing line aborts the whole reservation;
    /// the caller's rollback undoes the earlier decrements.
    pub async fn decrement_for_order(
        &self,
        conn: &mut SqliteConnection,
        lines: &[CartLine],
    ) -> LedgerResult<()> {
        for line in lines {
            decrement_on(&mut *conn, line.product_id, line.quantity).await?;
        }
        Ok(())
    }
}

async fn decrement_on(
    conn: &mut SqliteConnection,
    product_id: i64,
    quantity: i64,
) -> LedgerResult<i64> {
    let now = shared::util::now_millis();
    let stock = sqlx::query_scalar::<_, i64>(
        "UPDATE product SET stock = stock - ?1, updated_at = ?2 WHERE id = ?3 AND stock >= ?1 RETURNING stock",
    )
    .bind(quantity)
    .bind(now)
    .bind(product_id)
    .fetch_optional(&mut *conn)
    .await?;

    match stock {
        Some(remaining) => Ok(remaining),
        // The guard failed: distinguish a missing product from a short shelf
        None => {
            let available =
                sqlx::query_scalar::<_, i64>("SELECT stock FROM product WHERE id = ?")
                    .bind(product_id)
                    .fetch_optional(&mut *conn)
                    .await?;
            match available {
                Some(available) => Err(LedgerError::Insufficient {
                    product_id,
                    requested: quantity,
                    available,
                }),
                None => Err(LedgerError::ProductNotFound(product_id)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory_pool;
    use shared::models::ProductCreate;

    async fn seed(pool: &SqlitePool, name: &str, stock: i64) -> i64 {
        crate::db::repository::product::create(
            pool,
            ProductCreate {
                name: name.into(),
                price: 10.0,
                stock,
            },
        )
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn decrement_stops_at_zero() {
        let pool = memory_pool().await;
        let id = seed(&pool, "Widget", 3).await;
        let ledger = InventoryLedger::new(pool.clone());

        assert_eq!(ledger.decrement(id, 2).await.unwrap(), 1);
        let err = ledger.decrement(id, 2).await.unwrap_err();
        match err {
            LedgerError::Insufficient {
                requested,
                available,
                ..
            } => {
                assert_eq!(requested, 2);
                assert_eq!(available, 1);
            }
            other => panic!("unexpected error: {other}"),
        }

        // The failed decrement must not have touched the shelf
        assert_eq!(ledger.decrement(id, 1).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn decrement_unknown_product() {
        let pool = memory_pool().await;
        let ledger = InventoryLedger::new(pool);
        assert!(matches!(
            ledger.decrement(999, 1).await.unwrap_err(),
            LedgerError::ProductNotFound(999)
        ));
    }

    #[tokio::test]
    async fn multi_line_reservation_is_all_or_nothing() {
        let pool = memory_pool().await;
        let a = seed(&pool, "A", 5).await;
        let b = seed(&pool, "B", 1).await;
        let ledger = InventoryLedger::new(pool.clone());

        let lines = vec![
            CartLine {
                product_id: a,
                product_name: "A".into(),
                unit_price: 10.0,
                quantity: 2,
            },
            CartLine {
                product_id: b,
                product_name: "B".into(),
                unit_price: 10.0,
                quantity: 3,
            },
        ];

        let mut tx = pool.begin().await.unwrap();
        let err = ledger.decrement_for_order(&mut tx, &lines).await;
        assert!(err.is_err());
        tx.rollback().await.unwrap();

        // Line A's decrement was rolled back with the transaction
        let stock: i64 = sqlx::query_scalar("SELECT stock FROM product WHERE id = ?")
            .bind(a)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(stock, 5);
    }

    #[tokio::test]
    async fn increment_returns_stock_to_shelf() {
        let pool = memory_pool().await;
        let id = seed(&pool, "Widget", 2).await;
        let ledger = InventoryLedger::new(pool);
        assert_eq!(ledger.decrement(id, 2).await.unwrap(), 0);
        assert_eq!(ledger.increment(id, 2).await.unwrap(), 2);
    }
}
