use std::sync::Arc;

use tracing::warn;

use crate::domain::repository::{ProductRepository, ProgressStore};
use crate::error::ImporterError;

pub struct DeleteProductUseCase {
    product_repo: Arc<dyn ProductRepository>,
    cache: Arc<dyn ProgressStore>,
}

impl DeleteProductUseCase {
    pub fn new(product_repo: Arc<dyn ProductRepository>, cache: Arc<dyn ProgressStore>) -> Self {
        Self {
            product_repo,
            cache,
        }
    }

    pub async fn execute(&self, id: i64) -> Result<(), ImporterError> {
        let deleted = self.product_repo.delete(id).await?;
        if !deleted {
            return Err(ImporterError::NotFound(format!("product {}", id)));
        }
        self.invalidate().await;
        Ok(())
    }

    /// 全件削除。削除件数を返す。
    pub async fn execute_all(&self) -> Result<i64, ImporterError> {
        let count = self.product_repo.delete_all().await?;
        self.invalidate().await;
        Ok(count)
    }

    async fn invalidate(&self) {
        if let Err(e) = self.cache.invalidate_listings().await {
            warn!(error = %e, "listing cache invalidation failed, continuing");
        }
    }
}
