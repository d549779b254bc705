use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPool;

use crate::domain::entity::webhook::Webhook;
use crate::domain::repository::webhook_repository::WebhookRepository;
use crate::error::ImporterError;

#[derive(Debug, sqlx::FromRow)]
struct WebhookRow {
    id: i64,
    url: String,
    event_type: String,
    enabled: bool,
    created_at: DateTime<Utc>,
}

impl From<WebhookRow> for Webhook {
    fn from(row: WebhookRow) -> Self {
        Webhook {
            id: row.id,
            url: row.url,
            event_type: row.event_type,
            enabled: row.enabled,
            created_at: row.created_at,
        }
    }
}

pub struct WebhookPostgresRepository {
    pool: PgPool,
}

impl WebhookPostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WebhookRepository for WebhookPostgresRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Webhook>, ImporterError> {
        let row = sqlx::query_as::<_, WebhookRow>(
            "SELECT id, url, event_type, enabled, created_at FROM webhooks WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ImporterError::Internal(format!("failed to fetch webhook: {}", e)))?;
        Ok(row.map(Webhook::from))
    }

    async fn find_all(&self) -> Result<Vec<Webhook>, ImporterError> {
        let rows = sqlx::query_as::<_, WebhookRow>(
            "SELECT id, url, event_type, enabled, created_at FROM webhooks ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ImporterError::Internal(format!("failed to list webhooks: {}", e)))?;
        Ok(rows.into_iter().map(Webhook::from).collect())
    }

    async fn create(
        &self,
        url: &str,
        event_type: &str,
        enabled: bool,
    ) -> Result<Webhook, ImporterError> {
        let row = sqlx::query_as::<_, WebhookRow>(
            "INSERT INTO webhooks (url, event_type, enabled, created_at)
             VALUES ($1, $2, $3, NOW())
             RETURNING id, url, event_type, enabled, created_at",
        )
        .bind(url)
        .bind(event_type)
        .bind(enabled)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ImporterError::Internal(format!("failed to create webhook: {}", e)))?;
        Ok(row.into())
    }

    async fn delete(&self, id: i64) -> Result<bool, ImporterError> {
        let result = sqlx::query("DELETE FROM webhooks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| ImporterError::Internal(format!("failed to delete webhook: {}", e)))?;
        Ok(result.rows_affected() > 0)
    }
}
