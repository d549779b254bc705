use std::sync::Arc;

use tracing::warn;

use crate::domain::entity::product::Product;
use crate::domain::repository::product_repository::ProductFilter;
use crate::domain::repository::{ProductRepository, ProgressStore};
use crate::error::ImporterError;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ListProductsOutput {
    pub products: Vec<Product>,
    pub total: i64,
    pub skip: i64,
    pub limit: i64,
}

fn listing_cache_key(filter: &ProductFilter) -> String {
    let active = filter
        .active
        .map(|a| a.to_string())
        .unwrap_or_default();
    format!(
        "products:{}:{}:{}:{}",
        filter.skip,
        filter.limit,
        filter.search.as_deref().unwrap_or(""),
        active
    )
}

/// 商品一覧と件数。一覧はフィルタごとに TTL 付きでキャッシュされ、
/// キャッシュ障害は DB 直読みに落ちる。
pub struct ListProductsUseCase {
    product_repo: Arc<dyn ProductRepository>,
    cache: Arc<dyn ProgressStore>,
    cache_ttl_seconds: u64,
}

impl ListProductsUseCase {
    pub fn new(
        product_repo: Arc<dyn ProductRepository>,
        cache: Arc<dyn ProgressStore>,
        cache_ttl_seconds: u64,
    ) -> Self {
        Self {
            product_repo,
            cache,
            cache_ttl_seconds,
        }
    }

    pub async fn execute(&self, filter: &ProductFilter) -> Result<ListProductsOutput, ImporterError> {
        let key = listing_cache_key(filter);
        match self.cache.read_listing(&key).await {
            Ok(Some(payload)) => {
                if let Ok(output) = serde_json::from_value::<ListProductsOutput>(payload) {
                    return Ok(output);
                }
                warn!(key = %key, "discarding malformed listing cache entry");
            }
            Ok(None) => {}
            Err(e) => warn!(key = %key, error = %e, "listing cache read failed, querying store"),
        }

        let products = self.product_repo.find_all(filter).await?;
        let total = self.product_repo.count(filter).await?;
        let output = ListProductsOutput {
            products,
            total,
            skip: filter.skip,
            limit: filter.limit,
        };

        match serde_json::to_value(&output) {
            Ok(payload) => {
                if let Err(e) = self
                    .cache
                    .cache_listing(&key, &payload, self.cache_ttl_seconds)
                    .await
                {
                    warn!(key = %key, error = %e, "listing cache write failed, continuing");
                }
            }
            Err(e) => warn!(error = %e, "failed to serialize listing for cache"),
        }
        Ok(output)
    }

    pub async fn count(&self, filter: &ProductFilter) -> Result<i64, ImporterError> {
        self.product_repo.count(filter).await
    }

    pub async fn find(&self, id: i64) -> Result<Product, ImporterError> {
        self.product_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ImporterError::NotFound(format!("product {}", id)))
    }
}
