//! Product Repository

use super::{RepoError, RepoResult};
use shared::models::{Product, ProductCreate};
use sqlx::SqlitePool;

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(
        "SELECT id, name, price, stock, created_at, updated_at FROM product WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(product)
}

pub async fn create(pool: &SqlitePool, data: ProductCreate) -> RepoResult<Product> {
    if data.name.trim().is_empty() {
        return Err(RepoError::Validation("Product name is required".into()));
    }
    if data.price < 0.0 {
        return Err(RepoError::Validation(format!(
            "Product price cannot be negative: {}",
            data.price
        )));
    }
    if data.stock < 0 {
        return Err(RepoError::Validation(format!(
            "Product stock cannot be negative: {}",
            data.stock
        )));
    }

    let now = shared::util::now_millis();
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO product (name, price, stock, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?4) RETURNING id",
    )
    .bind(&data.name)
    .bind(data.price)
    .bind(data.stock)
    .bind(now)
    .fetch_one(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create product".into()))
}

pub async fn find_all(pool: &SqlitePool, limit: i64, offset: i64) -> RepoResult<Vec<Product>> {
    let products = sqlx::query_as::<_, Product>(
        "SELECT id, name, price, stock, created_at, updated_at FROM product ORDER BY id LIMIT ? OFFSET ?",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(products)
}

/// Administrative stock set, bypasses ledger arithmetic
pub async fn update_stock(pool: &SqlitePool, id: i64, stock: i64) -> RepoResult<()> {
    if stock < 0 {
        return Err(RepoError::Validation(format!(
            "Product stock cannot be negative: {stock}"
        )));
    }
    let now = shared::util::now_millis();
    let rows = sqlx::query("UPDATE product SET stock = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(stock)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Product {id} not found")));
    }
    Ok(())
}

pub async fn count_all(pool: &SqlitePool) -> RepoResult<i64> {
    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM product")
        .fetch_one(pool)
        .await?;
    Ok(total)
}
