use std::sync::Arc;

use tracing::warn;

use crate::domain::entity::product::Product;
use crate::domain::repository::{ProductRepository, ProgressStore};
use crate::error::ImporterError;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub sku: Option<String>,
    pub description: Option<String>,
    pub active: Option<bool>,
}

pub struct UpdateProductUseCase {
    product_repo: Arc<dyn ProductRepository>,
    cache: Arc<dyn ProgressStore>,
}

impl UpdateProductUseCase {
    pub fn new(product_repo: Arc<dyn ProductRepository>, cache: Arc<dyn ProgressStore>) -> Self {
        Self {
            product_repo,
            cache,
        }
    }

    pub async fn execute(
        &self,
        id: i64,
        input: &UpdateProductInput,
    ) -> Result<Product, ImporterError> {
        let mut product = self
            .product_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ImporterError::NotFound(format!("product {}", id)))?;

        if let Some(name) = &input.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(ImporterError::InvalidInput("name must not be empty".to_string()));
            }
            product.name = name.to_string();
        }
        if let Some(sku) = &input.sku {
            let sku = sku.trim();
            if sku.is_empty() {
                return Err(ImporterError::InvalidInput("sku must not be empty".to_string()));
            }
            // SKU 変更時のみ一意性を再確認する
            if !sku.eq_ignore_ascii_case(&product.sku) {
                if self.product_repo.find_by_sku(sku).await?.is_some() {
                    return Err(ImporterError::Conflict(format!(
                        "SKU '{}' already exists",
                        sku
                    )));
                }
            }
            product.sku = sku.to_string();
        }
        if let Some(description) = &input.description {
            product.description = description.trim().to_string();
        }
        if let Some(active) = input.active {
            product.active = active;
        }

        let updated = self.product_repo.update(&product).await?;
        if let Err(e) = self.cache.invalidate_listings().await {
            warn!(error = %e, "listing cache invalidation failed, continuing");
        }
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repository::product_repository::MockProductRepository;
    use crate::domain::repository::progress_store::MockProgressStore;
    use chrono::Utc;

    fn existing(id: i64, sku: &str) -> Product {
        Product {
            id,
            name: "Widget".to_string(),
            sku: sku.to_string(),
            description: String::new(),
            active: true,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn updates_provided_fields_only() {
        let mut repo = MockProductRepository::new();
        repo.expect_find_by_id()
            .returning(|id| Ok(Some(existing(id, "W-1"))));
        repo.expect_update().returning(|p| Ok(p.clone()));
        let mut cache = MockProgressStore::new();
        cache.expect_invalidate_listings().returning(|| Ok(()));

        let uc = UpdateProductUseCase::new(Arc::new(repo), Arc::new(cache));
        let updated = uc
            .execute(
                1,
                &UpdateProductInput {
                    name: Some("Gadget".to_string()),
                    sku: None,
                    description: None,
                    active: Some(false),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Gadget");
        assert_eq!(updated.sku, "W-1");
        assert!(!updated.active);
    }

    #[tokio::test]
    async fn sku_change_to_taken_value_conflicts() {
        let mut repo = MockProductRepository::new();
        repo.expect_find_by_id()
            .returning(|id| Ok(Some(existing(id, "W-1"))));
        repo.expect_find_by_sku()
            .returning(|sku| Ok(Some(existing(99, sku))));

        let uc = UpdateProductUseCase::new(Arc::new(repo), Arc::new(MockProgressStore::new()));
        let result = uc
            .execute(
                1,
                &UpdateProductInput {
                    name: None,
                    sku: Some("G-2".to_string()),
                    description: None,
                    active: None,
                },
            )
            .await;
        assert!(matches!(result, Err(ImporterError::Conflict(_))));
    }

    #[tokio::test]
    async fn sku_case_change_skips_uniqueness_check() {
        let mut repo = MockProductRepository::new();
        repo.expect_find_by_id()
            .returning(|id| Ok(Some(existing(id, "w-1"))));
        repo.expect_update().returning(|p| Ok(p.clone()));
        let mut cache = MockProgressStore::new();
        cache.expect_invalidate_listings().returning(|| Ok(()));

        let uc = UpdateProductUseCase::new(Arc::new(repo), Arc::new(cache));
        let updated = uc
            .execute(
                1,
                &UpdateProductInput {
                    name: None,
                    sku: Some("W-1".to_string()),
                    description: None,
                    active: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.sku, "W-1");
    }

    #[tokio::test]
    async fn missing_product_is_not_found() {
        let mut repo = MockProductRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));

        let uc = UpdateProductUseCase::new(Arc::new(repo), Arc::new(MockProgressStore::new()));
        let result = uc
            .execute(
                1,
                &UpdateProductInput {
                    name: None,
                    sku: None,
                    description: None,
                    active: None,
                },
            )
            .await;
        assert!(matches!(result, Err(ImporterError::NotFound(_))));
    }
}
