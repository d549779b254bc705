use std::sync::Arc;

use crate::domain::entity::webhook::Webhook;
use crate::domain::repository::WebhookRepository;
use crate::error::ImporterError;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct CreateWebhookInput {
    pub url: String,
    pub event_type: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct TestWebhookOutput {
    pub webhook_id: i64,
    pub event_type: String,
    pub delivered: bool,
    pub message: String,
}

/// Webhook 設定の CRUD。配信そのものは本サービスの範囲外で、
/// テスト配信は I/O を行わないシミュレーション応答を返す。
pub struct ManageWebhooksUseCase {
    webhook_repo: Arc<dyn WebhookRepository>,
}

impl ManageWebhooksUseCase {
    pub fn new(webhook_repo: Arc<dyn WebhookRepository>) -> Self {
        Self { webhook_repo }
    }

    pub async fn list(&self) -> Result<Vec<Webhook>, ImporterError> {
        self.webhook_repo.find_all().await
    }

    pub async fn create(&self, input: &CreateWebhookInput) -> Result<Webhook, ImporterError> {
        let url = input.url.trim();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ImporterError::InvalidInput(
                "url must start with http:// or https://".to_string(),
            ));
        }
        let event_type = input.event_type.trim();
        if event_type.is_empty() {
            return Err(ImporterError::InvalidInput(
                "event_type must not be empty".to_string(),
            ));
        }
        self.webhook_repo.create(url, event_type, input.enabled).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), ImporterError> {
        let deleted = self.webhook_repo.delete(id).await?;
        if !deleted {
            return Err(ImporterError::NotFound(format!("webhook {}", id)));
        }
        Ok(())
    }

    pub async fn test_delivery(&self, id: i64) -> Result<TestWebhookOutput, ImporterError> {
        let webhook = self
            .webhook_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ImporterError::NotFound(format!("webhook {}", id)))?;
        Ok(TestWebhookOutput {
            webhook_id: webhook.id,
            event_type: webhook.event_type,
            delivered: true,
            message: format!("Simulated delivery to {}", webhook.url),
        })
    }
}
