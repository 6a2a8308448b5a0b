//! Cart Repository
//!
//! Cart rows are keyed by the canonical owner identity string
//! (`user:<id>` / `session:<sid>`). Reads join live product data; the
//! cart itself never stores prices.

use super::{RepoError, RepoResult};
use shared::models::{CartItem, CartLine};
use sqlx::{SqliteConnection, SqlitePool};

pub async fn add_item(
    pool: &SqlitePool,
    identity: &str,
    product_id: i64,
    quantity: i64,
) -> RepoResult<CartItem> {
    if quantity < 1 {
        return Err(RepoError::Validation(format!(
            "Quantity must be at least 1: {quantity}"
        )));
    }

    // Adding the same product again accumulates quantity
    let now = shared::util::now_millis();
    let item = sqlx::query_as::<_, CartItem>(
        "INSERT INTO cart_item (identity, product_id, quantity, created_at) VALUES (?1, ?2, ?3, ?4) ON CONFLICT (identity, product_id) DO UPDATE SET quantity = quantity + excluded.quantity RETURNING id, identity, product_id, quantity, created_at",
    )
    .bind(identity)
    .bind(product_id)
    .bind(quantity)
    .bind(now)
    .fetch_one(pool)
    .await?;
    Ok(item)
}

pub async fn set_quantity(
    pool: &SqlitePool,
    identity: &str,
    product_id: i64,
    quantity: i64,
) -> RepoResult<()> {
    if quantity < 1 {
        return Err(RepoError::Validation(format!(
            "Quantity must be at least 1: {quantity}"
        )));
    }

    let rows = sqlx::query(
        "UPDATE cart_item SET quantity = ?1 WHERE identity = ?2 AND product_id = ?3",
    )
    .bind(quantity)
    .bind(identity)
    .bind(product_id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!(
            "Product {product_id} is not in the cart"
        )));
    }
    Ok(())
}

pub async fn remove_item(pool: &SqlitePool, identity: &str, product_id: i64) -> RepoResult<()> {
    let rows = sqlx::query("DELETE FROM cart_item WHERE identity = ?1 AND product_id = ?2")
        .bind(identity)
        .bind(product_id)
        .execute(pool)
        .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!(
            "Product {product_id} is not in the cart"
        )));
    }
    Ok(())
}

/// Cart lines with live product name and price, oldest first
pub async fn find_by_identity(pool: &SqlitePool, identity: &str) -> RepoResult<Vec<CartLine>> {
    let lines = sqlx::query_as::<_, CartLine>(
        "SELECT c.product_id, p.name AS product_name, p.price AS unit_price, c.quantity FROM cart_item c JOIN product p ON p.id = c.product_id WHERE c.identity = ? ORDER BY c.created_at",
    )
    .bind(identity)
    .fetch_all(pool)
    .await?;
    Ok(lines)
}

/// Clear a cart after its order has been committed
pub async fn clear(conn: &mut SqliteConnection, identity: &str) -> RepoResult<()> {
    sqlx::query("DELETE FROM cart_item WHERE identity = ?")
        .bind(identity)
        .execute(conn)
        .await?;
    Ok(())
}
