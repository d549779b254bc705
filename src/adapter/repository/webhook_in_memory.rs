use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::entity::webhook::Webhook;
use crate::domain::repository::webhook_repository::WebhookRepository;
use crate::error::ImporterError;

/// InMemoryWebhookRepository はインメモリの Webhook 設定リポジトリ。
pub struct InMemoryWebhookRepository {
    webhooks: RwLock<HashMap<i64, Webhook>>,
    next_id: AtomicI64,
}

impl InMemoryWebhookRepository {
    pub fn new() -> Self {
        Self {
            webhooks: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for InMemoryWebhookRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WebhookRepository for InMemoryWebhookRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Webhook>, ImporterError> {
        let webhooks = self.webhooks.read().await;
        Ok(webhooks.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Webhook>, ImporterError> {
        let webhooks = self.webhooks.read().await;
        let mut result: Vec<Webhook> = webhooks.values().cloned().collect();
        result.sort_by_key(|w| w.id);
        Ok(result)
    }

    async fn create(
        &self,
        url: &str,
        event_type: &str,
        enabled: bool,
    ) -> Result<Webhook, ImporterError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let webhook = Webhook {
            id,
            url: url.to_string(),
            event_type: event_type.to_string(),
            enabled,
            created_at: Utc::now(),
        };
        let mut webhooks = self.webhooks.write().await;
        webhooks.insert(id, webhook.clone());
        Ok(webhook)
    }

    async fn delete(&self, id: i64) -> Result<bool, ImporterError> {
        let mut webhooks = self.webhooks.write().await;
        Ok(webhooks.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_list_delete() {
        let repo = InMemoryWebhookRepository::new();
        let created = repo
            .create("https://example.com/hook", "import.completed", true)
            .await
            .unwrap();
        assert_eq!(created.id, 1);

        assert_eq!(repo.find_all().await.unwrap().len(), 1);
        assert!(repo.delete(created.id).await.unwrap());
        assert!(repo.find_all().await.unwrap().is_empty());
    }
}
