use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPool;
use sqlx::QueryBuilder;

use crate::domain::entity::product::{NewProduct, Product, ProductRecord};
use crate::domain::repository::product_repository::{ProductFilter, ProductRepository};
use crate::error::ImporterError;

/// products テーブルの行表現。
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    sku: String,
    description: String,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            sku: row.sku,
            description: row.description,
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub struct ProductPostgresRepository {
    pool: PgPool,
}

impl ProductPostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// find_all / count で共有する WHERE 句を積む。
    fn push_filter(builder: &mut QueryBuilder<'_, sqlx::Postgres>, filter: &ProductFilter) {
        let mut has_where = false;
        if let Some(search) = &filter.search {
            let pattern = format!("%{}%", search);
            builder.push(" WHERE (name ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR sku ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR description ILIKE ");
            builder.push_bind(pattern);
            builder.push(")");
            has_where = true;
        }
        if let Some(active) = filter.active {
            builder.push(if has_where { " AND" } else { " WHERE" });
            builder.push(" active = ");
            builder.push_bind(active);
        }
    }
}

#[async_trait]
impl ProductRepository for ProductPostgresRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Product>, ImporterError> {
        let row = sqlx::query_as::<_, ProductRow>(
            "SELECT id, name, sku, description, active, created_at, updated_at
             FROM products WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ImporterError::Internal(format!("failed to fetch product: {}", e)))?;
        Ok(row.map(Product::from))
    }

    async fn find_by_sku(&self, sku: &str) -> Result<Option<Product>, ImporterError> {
        let row = sqlx::query_as::<_, ProductRow>(
            "SELECT id, name, sku, description, active, created_at, updated_at
             FROM products WHERE lower(sku) = lower($1)",
        )
        .bind(sku)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ImporterError::Internal(format!("failed to fetch product: {}", e)))?;
        Ok(row.map(Product::from))
    }

    async fn find_all(&self, filter: &ProductFilter) -> Result<Vec<Product>, ImporterError> {
        let mut builder = QueryBuilder::new(
            "SELECT id, name, sku, description, active, created_at, updated_at FROM products",
        );
        Self::push_filter(&mut builder, filter);
        builder.push(" ORDER BY id OFFSET ");
        builder.push_bind(filter.skip);
        builder.push(" LIMIT ");
        builder.push_bind(filter.limit);

        let rows = builder
            .build_query_as::<ProductRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ImporterError::Internal(format!("failed to list products: {}", e)))?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn count(&self, filter: &ProductFilter) -> Result<i64, ImporterError> {
        let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM products");
        Self::push_filter(&mut builder, filter);
        builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| ImporterError::Internal(format!("failed to count products: {}", e)))
    }

    async fn create(&self, product: &NewProduct) -> Result<Product, ImporterError> {
        let row = sqlx::query_as::<_, ProductRow>(
            "INSERT INTO products (name, sku, description, active, created_at)
             VALUES ($1, $2, $3, $4, NOW())
             RETURNING id, name, sku, description, active, created_at, updated_at",
        )
        .bind(&product.name)
        .bind(&product.sku)
        .bind(&product.description)
        .bind(product.active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                ImporterError::Conflict(format!("SKU '{}' already exists", product.sku))
            }
            _ => ImporterError::Internal(format!("failed to create product: {}", e)),
        })?;
        Ok(row.into())
    }

    async fn update(&self, product: &Product) -> Result<Product, ImporterError> {
        let row = sqlx::query_as::<_, ProductRow>(
            "UPDATE products
             SET name = $2, sku = $3, description = $4, active = $5, updated_at = NOW()
             WHERE id = $1
             RETURNING id, name, sku, description, active, created_at, updated_at",
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.sku)
        .bind(&product.description)
        .bind(product.active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                ImporterError::Conflict(format!("SKU '{}' already exists", product.sku))
            }
            _ => ImporterError::Internal(format!("failed to update product: {}", e)),
        })?;
        row.map(Product::from)
            .ok_or_else(|| ImporterError::NotFound(format!("product {}", product.id)))
    }

    async fn delete(&self, id: i64) -> Result<bool, ImporterError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| ImporterError::Internal(format!("failed to delete product: {}", e)))?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_all(&self) -> Result<i64, ImporterError> {
        let result = sqlx::query("DELETE FROM products")
            .execute(&self.pool)
            .await
            .map_err(|e| ImporterError::Internal(format!("failed to delete products: {}", e)))?;
        Ok(result.rows_affected() as i64)
    }

    async fn upsert_batch(&self, records: &[ProductRecord]) -> Result<(), ImporterError> {
        if records.is_empty() {
            return Ok(());
        }
        // 単一 INSERT ... ON CONFLICT でチャンクをアトミックに適用する。
        // 既存行は name / description / updated_at のみ更新する。
        let mut builder = QueryBuilder::new("INSERT INTO products (name, sku, description) ");
        builder.push_values(records.iter(), |mut b, r| {
            b.push_bind(&r.name);
            b.push_bind(&r.sku);
            b.push_bind(&r.description);
        });
        builder.push(
            " ON CONFLICT (sku) DO UPDATE SET
               name = EXCLUDED.name,
               description = EXCLUDED.description,
               updated_at = NOW()",
        );
        builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| ImporterError::Internal(format!("failed to upsert batch: {}", e)))?;
        Ok(())
    }
}
