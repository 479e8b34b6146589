//! SQLite-backed repository for [`Product`] records.

use super::{Repository, RepositoryError, RepositoryResult};
use crate::models::product::Product;
use sqlx::SqlitePool;
use tracing::debug;

const PRODUCT_COLUMNS: &str = "id, name, price, quantity, image";

#[derive(Clone)]
pub struct ProductRepository {
    /// Shared SQLite connection pool.
    pub db: SqlitePool,
}

impl ProductRepository {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

impl Repository<Product> for ProductRepository {
    async fn get_all(&self) -> RepositoryResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products ORDER BY id ASC",
            PRODUCT_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;
        Ok(products)
    }

    async fn get(&self, id: i64) -> RepositoryResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products WHERE id = ?",
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(product)
    }

    async fn add(&self, product: Product) -> RepositoryResult<Product> {
        let created = sqlx::query_as::<_, Product>(&format!(
            "INSERT INTO products (name, price, quantity, image)
             VALUES (?, ?, ?, ?)
             RETURNING {}",
            PRODUCT_COLUMNS
        ))
        .bind(&product.name)
        .bind(product.price.to_string())
        .bind(product.quantity)
        .bind(&product.image)
        .fetch_one(&self.db)
        .await?;
        debug!("inserted product {}", created.id);
        Ok(created)
    }

    async fn update(&self, product: Product) -> RepositoryResult<Option<Product>> {
        let updated = sqlx::query_as::<_, Product>(&format!(
            "UPDATE products
             SET name = ?, price = ?, quantity = ?, image = ?
             WHERE id = ?
             RETURNING {}",
            PRODUCT_COLUMNS
        ))
        .bind(&product.name)
        .bind(product.price.to_string())
        .bind(product.quantity)
        .bind(&product.image)
        .bind(product.id)
        .fetch_optional(&self.db)
        .await?;
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(id));
        }
        debug!("deleted product {}", id);
        Ok(())
    }
}
