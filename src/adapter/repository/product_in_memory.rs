use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::entity::product::{NewProduct, Product, ProductRecord};
use crate::domain::repository::product_repository::{ProductFilter, ProductRepository};
use crate::error::ImporterError;

/// InMemoryProductRepository はインメモリの商品リポジトリ。
/// DATABASE_URL 未設定時のフォールバックとして使う。
pub struct InMemoryProductRepository {
    products: RwLock<HashMap<i64, Product>>,
    next_id: AtomicI64,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self {
            products: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    fn matches(product: &Product, filter: &ProductFilter) -> bool {
        if let Some(active) = filter.active {
            if product.active != active {
                return false;
            }
        }
        if let Some(search) = &filter.search {
            let needle = search.to_lowercase();
            let hit = product.name.to_lowercase().contains(&needle)
                || product.sku.to_lowercase().contains(&needle)
                || product.description.to_lowercase().contains(&needle);
            if !hit {
                return false;
            }
        }
        true
    }
}

impl Default for InMemoryProductRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Product>, ImporterError> {
        let products = self.products.read().await;
        Ok(products.get(&id).cloned())
    }

    async fn find_by_sku(&self, sku: &str) -> Result<Option<Product>, ImporterError> {
        let products = self.products.read().await;
        Ok(products
            .values()
            .find(|p| p.sku.eq_ignore_ascii_case(sku))
            .cloned())
    }

    async fn find_all(&self, filter: &ProductFilter) -> Result<Vec<Product>, ImporterError> {
        let products = self.products.read().await;
        let mut result: Vec<Product> = products
            .values()
            .filter(|p| Self::matches(p, filter))
            .cloned()
            .collect();
        result.sort_by_key(|p| p.id);
        Ok(result
            .into_iter()
            .skip(filter.skip.max(0) as usize)
            .take(filter.limit.max(0) as usize)
            .collect())
    }

    async fn count(&self, filter: &ProductFilter) -> Result<i64, ImporterError> {
        let products = self.products.read().await;
        Ok(products.values().filter(|p| Self::matches(p, filter)).count() as i64)
    }

    async fn create(&self, product: &NewProduct) -> Result<Product, ImporterError> {
        let mut products = self.products.write().await;
        if products
            .values()
            .any(|p| p.sku.eq_ignore_ascii_case(&product.sku))
        {
            return Err(ImporterError::Conflict(format!(
                "SKU '{}' already exists",
                product.sku
            )));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let created = Product {
            id,
            name: product.name.clone(),
            sku: product.sku.clone(),
            description: product.description.clone(),
            active: product.active,
            created_at: Utc::now(),
            updated_at: None,
        };
        products.insert(id, created.clone());
        Ok(created)
    }

    async fn update(&self, product: &Product) -> Result<Product, ImporterError> {
        let mut products = self.products.write().await;
        if products
            .values()
            .any(|p| p.id != product.id && p.sku.eq_ignore_ascii_case(&product.sku))
        {
            return Err(ImporterError::Conflict(format!(
                "SKU '{}' already exists",
                product.sku
            )));
        }
        let existing = products
            .get_mut(&product.id)
            .ok_or_else(|| ImporterError::NotFound(format!("product {}", product.id)))?;
        existing.name = product.name.clone();
        existing.sku = product.sku.clone();
        existing.description = product.description.clone();
        existing.active = product.active;
        existing.updated_at = Some(Utc::now());
        Ok(existing.clone())
    }

    async fn delete(&self, id: i64) -> Result<bool, ImporterError> {
        let mut products = self.products.write().await;
        Ok(products.remove(&id).is_some())
    }

    async fn delete_all(&self) -> Result<i64, ImporterError> {
        let mut products = self.products.write().await;
        let count = products.len() as i64;
        products.clear();
        Ok(count)
    }

    async fn upsert_batch(&self, records: &[ProductRecord]) -> Result<(), ImporterError> {
        let mut products = self.products.write().await;
        let now = Utc::now();
        for record in records {
            if let Some(existing) = products.values_mut().find(|p| p.sku == record.sku) {
                existing.name = record.name.clone();
                existing.description = record.description.clone();
                existing.updated_at = Some(now);
            } else {
                let id = self.next_id.fetch_add(1, Ordering::SeqCst);
                products.insert(
                    id,
                    Product {
                        id,
                        name: record.name.clone(),
                        sku: record.sku.clone(),
                        description: record.description.clone(),
                        active: true,
                        created_at: now,
                        updated_at: None,
                    },
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_product(name: &str, sku: &str) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            sku: sku.to_string(),
            description: String::new(),
            active: true,
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let repo = InMemoryProductRepository::new();
        let created = repo.create(&new_product("Widget", "W-1")).await.unwrap();
        assert_eq!(created.id, 1);

        let found = repo.find_by_id(created.id).await.unwrap();
        assert_eq!(found.unwrap().name, "Widget");
    }

    #[tokio::test]
    async fn test_create_duplicate_sku_conflicts() {
        let repo = InMemoryProductRepository::new();
        repo.create(&new_product("A", "W-1")).await.unwrap();
        let err = repo.create(&new_product("B", "w-1")).await.unwrap_err();
        assert!(matches!(err, ImporterError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_find_by_sku_case_insensitive() {
        let repo = InMemoryProductRepository::new();
        repo.create(&new_product("A", "ABC-1")).await.unwrap();
        let found = repo.find_by_sku("abc-1").await.unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn test_filter_search_and_active() {
        let repo = InMemoryProductRepository::new();
        repo.create(&new_product("Widget", "W-1")).await.unwrap();
        let mut gadget = repo.create(&new_product("Gadget", "G-1")).await.unwrap();
        gadget.active = false;
        repo.update(&gadget).await.unwrap();

        let filter = ProductFilter {
            skip: 0,
            limit: 100,
            search: Some("wid".to_string()),
            active: None,
        };
        assert_eq!(repo.count(&filter).await.unwrap(), 1);

        let filter = ProductFilter {
            skip: 0,
            limit: 100,
            search: None,
            active: Some(false),
        };
        let inactive = repo.find_all(&filter).await.unwrap();
        assert_eq!(inactive.len(), 1);
        assert_eq!(inactive[0].sku, "G-1");
    }

    #[tokio::test]
    async fn test_upsert_batch_updates_existing() {
        let repo = InMemoryProductRepository::new();
        repo.create(&new_product("Old", "W-1")).await.unwrap();
        repo.upsert_batch(&[ProductRecord {
            name: "New".to_string(),
            sku: "W-1".to_string(),
            description: "d".to_string(),
        }])
        .await
        .unwrap();

        let found = repo.find_by_sku("W-1").await.unwrap().unwrap();
        assert_eq!(found.name, "New");
        assert_eq!(found.id, 1);
    }

    #[tokio::test]
    async fn test_delete_all() {
        let repo = InMemoryProductRepository::new();
        repo.create(&new_product("A", "A-1")).await.unwrap();
        repo.create(&new_product("B", "B-1")).await.unwrap();
        assert_eq!(repo.delete_all().await.unwrap(), 2);
        assert_eq!(repo.count(&ProductFilter::default()).await.unwrap(), 0);
    }
}
