//! Product catalog: the read path used by the web layer, plus the
//! out-of-band write operations used by operators and tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use mesopotamia_core::{Entity, ProductId};
use mesopotamia_products::{NewProduct, Product, ProductName};

use crate::db::PersistenceError;

/// Number of featured products shown on the landing page.
pub const HOME_FEATURED_LIMIT: u32 = 4;

/// Read access to the product catalog.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Up to `limit` featured products, oldest first. An empty table is not an error.
    async fn list_featured_products(&self, limit: u32) -> Result<Vec<Product>, PersistenceError>;
}

/// SQLite-backed catalog over the `product` table.
#[derive(Debug, Clone)]
pub struct SqliteProductCatalog {
    pool: SqlitePool,
}

impl SqliteProductCatalog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, id: ProductId) -> Result<Product, PersistenceError> {
        let row = sqlx::query(
            "SELECT id, name, description, is_featured, created_at, updated_at FROM product WHERE id = ?",
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => row_to_product(&row),
            None => Err(PersistenceError::NotFound),
        }
    }

    pub async fn create(&self, new: NewProduct) -> Result<Product, PersistenceError> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO product (name, description, is_featured, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(new.name.as_str())
        .bind(new.description.as_deref())
        .bind(new.is_featured)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = ProductId::new(result.last_insert_rowid());
        tracing::info!(product_id = %id, "product created");
        Ok(Product::created(id, new, now))
    }

    pub async fn set_featured(&self, id: ProductId, featured: bool) -> Result<Product, PersistenceError> {
        let mut product = self.get(id).await?;
        product.set_featured(featured, Utc::now());
        self.save(&product).await?;
        Ok(product)
    }

    pub async fn rename(&self, id: ProductId, name: ProductName) -> Result<Product, PersistenceError> {
        let mut product = self.get(id).await?;
        product.rename(name, Utc::now());
        self.save(&product).await?;
        Ok(product)
    }

    async fn save(&self, product: &Product) -> Result<(), PersistenceError> {
        let result = sqlx::query(
            "UPDATE product SET name = ?, description = ?, is_featured = ?, updated_at = ? WHERE id = ?",
        )
        .bind(product.name().as_str())
        .bind(product.description())
        .bind(product.is_featured())
        .bind(product.updated_at())
        .bind(product.id().get())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl ProductCatalog for SqliteProductCatalog {
    async fn list_featured_products(&self, limit: u32) -> Result<Vec<Product>, PersistenceError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, description, is_featured, created_at, updated_at
            FROM product
            WHERE is_featured = 1
            ORDER BY id ASC
            LIMIT ?
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        // Rows that fail the name invariant are skipped, not fatal.
        let products = rows
            .iter()
            .filter_map(|row| match row_to_product(row) {
                Err(PersistenceError::Corrupt { id, reason }) => {
                    tracing::warn!(product_id = id, %reason, "skipping corrupt product row");
                    None
                }
                other => Some(other),
            })
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(count = products.len(), limit, "featured products loaded");
        Ok(products)
    }
}

fn row_to_product(row: &SqliteRow) -> Result<Product, PersistenceError> {
    let id: i64 = row.try_get("id")?;
    let name: String = row.try_get("name")?;
    let description: Option<String> = row.try_get("description")?;
    let is_featured: bool = row.try_get("is_featured")?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at")?;

    let name = ProductName::parse(name).map_err(|e| PersistenceError::Corrupt {
        id,
        reason: e.to_string(),
    })?;

    Ok(Product::from_parts(
        ProductId::new(id),
        name,
        description,
        is_featured,
        created_at,
        updated_at,
    ))
}
