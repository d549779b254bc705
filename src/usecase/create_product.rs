use std::sync::Arc;

use tracing::warn;

use crate::domain::entity::product::{NewProduct, Product};
use crate::domain::repository::{ProductRepository, ProgressStore};
use crate::error::ImporterError;

pub struct CreateProductUseCase {
    product_repo: Arc<dyn ProductRepository>,
    cache: Arc<dyn ProgressStore>,
}

impl CreateProductUseCase {
    pub fn new(product_repo: Arc<dyn ProductRepository>, cache: Arc<dyn ProgressStore>) -> Self {
        Self {
            product_repo,
            cache,
        }
    }

    pub async fn execute(&self, input: &NewProduct) -> Result<Product, ImporterError> {
        let name = input.name.trim();
        let sku = input.sku.trim();
        if name.is_empty() || sku.is_empty() {
            return Err(ImporterError::InvalidInput(
                "name and sku are required".to_string(),
            ));
        }

        // SKU は大文字小文字を区別せず一意。制約違反前に読みやすい 409 を返す
        if self.product_repo.find_by_sku(sku).await?.is_some() {
            return Err(ImporterError::Conflict(format!(
                "SKU '{}' already exists",
                sku
            )));
        }

        let product = self
            .product_repo
            .create(&NewProduct {
                name: name.to_string(),
                sku: sku.to_string(),
                description: input.description.trim().to_string(),
                active: input.active,
            })
            .await?;

        if let Err(e) = self.cache.invalidate_listings().await {
            warn!(error = %e, "listing cache invalidation failed, continuing");
        }
        Ok(product)
    }
}
