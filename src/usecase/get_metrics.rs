use std::sync::Arc;

use crate::domain::repository::product_repository::ProductFilter;
use crate::domain::repository::{ProductRepository, WebhookRepository};
use crate::error::ImporterError;

#[derive(Debug, Clone, serde::Serialize)]
pub struct MetricsOutput {
    pub products: ProductMetrics,
    pub webhooks: WebhookMetrics,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ProductMetrics {
    pub total: i64,
    pub active: i64,
    pub inactive: i64,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct WebhookMetrics {
    pub total: i64,
    pub enabled: i64,
    pub disabled: i64,
}

/// 運用向けのカウンタ集計。メトリクスパイプラインは持たず JSON を返すだけ。
pub struct GetMetricsUseCase {
    product_repo: Arc<dyn ProductRepository>,
    webhook_repo: Arc<dyn WebhookRepository>,
}

impl GetMetricsUseCase {
    pub fn new(
        product_repo: Arc<dyn ProductRepository>,
        webhook_repo: Arc<dyn WebhookRepository>,
    ) -> Self {
        Self {
            product_repo,
            webhook_repo,
        }
    }

    pub async fn execute(&self) -> Result<MetricsOutput, ImporterError> {
        let total = self.product_repo.count(&ProductFilter::default()).await?;
        let active = self
            .product_repo
            .count(&ProductFilter {
                active: Some(true),
                ..Default::default()
            })
            .await?;

        let webhooks = self.webhook_repo.find_all().await?;
        let enabled = webhooks.iter().filter(|w| w.enabled).count() as i64;
        let webhook_total = webhooks.len() as i64;

        Ok(MetricsOutput {
            products: ProductMetrics {
                total,
                active,
                inactive: total - active,
            },
            webhooks: WebhookMetrics {
                total: webhook_total,
                enabled,
                disabled: webhook_total - enabled,
            },
        })
    }
}
