use async_trait::async_trait;

use crate::domain::entity::webhook::Webhook;
use crate::error::ImporterError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WebhookRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Webhook>, ImporterError>;
    async fn find_all(&self) -> Result<Vec<Webhook>, ImporterError>;
    async fn create(&self, url: &str, event_type: &str, enabled: bool)
        -> Result<Webhook, ImporterError>;
    async fn delete(&self, id: i64) -> Result<bool, ImporterError>;
}
