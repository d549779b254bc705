use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use uuid::Uuid;

use crate::domain::entity::progress::ProgressSnapshot;
use crate::domain::repository::progress_store::ProgressStore;
use crate::error::ImporterError;

const PROGRESS_KEY_PREFIX: &str = "task:";
const CANCEL_KEY_PREFIX: &str = "cancel:";
const LISTING_KEY_PATTERN: &str = "products:*";

/// Redis 実装。ConnectionManager は内部で再接続するため clone して使い回す。
pub struct ProgressRedisStore {
    conn: ConnectionManager,
}

impl ProgressRedisStore {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }

    fn progress_key(job_id: &Uuid) -> String {
        format!("{}{}", PROGRESS_KEY_PREFIX, job_id)
    }

    fn cancel_key(job_id: &Uuid) -> String {
        format!("{}{}", CANCEL_KEY_PREFIX, job_id)
    }
}

#[async_trait]
impl ProgressStore for ProgressRedisStore {
    async fn publish(
        &self,
        job_id: &Uuid,
        snapshot: &ProgressSnapshot,
        ttl_seconds: u64,
    ) -> Result<(), ImporterError> {
        let payload = serde_json::to_string(snapshot)
            .map_err(|e| ImporterError::Internal(format!("failed to serialize progress: {}", e)))?;
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(Self::progress_key(job_id), payload, ttl_seconds)
            .await
            .map_err(|e| ImporterError::Cache(format!("failed to publish progress: {}", e)))?;
        Ok(())
    }

    async fn read(&self, job_id: &Uuid) -> Result<Option<ProgressSnapshot>, ImporterError> {
        let mut conn = self.conn.clone();
        let payload: Option<String> = conn
            .get(Self::progress_key(job_id))
            .await
            .map_err(|e| ImporterError::Cache(format!("failed to read progress: {}", e)))?;
        match payload {
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|e| ImporterError::Cache(format!("corrupt progress payload: {}", e))),
            None => Ok(None),
        }
    }

    async fn request_cancel(&self, job_id: &Uuid, ttl_seconds: u64) -> Result<(), ImporterError> {
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(Self::cancel_key(job_id), "1", ttl_seconds)
            .await
            .map_err(|e| ImporterError::Cache(format!("failed to set cancel marker: {}", e)))?;
        Ok(())
    }

    async fn is_cancel_requested(&self, job_id: &Uuid) -> Result<bool, ImporterError> {
        let mut conn = self.conn.clone();
        conn.exists(Self::cancel_key(job_id))
            .await
            .map_err(|e| ImporterError::Cache(format!("failed to check cancel marker: {}", e)))
    }

    async fn cache_listing(
        &self,
        key: &str,
        payload: &serde_json::Value,
        ttl_seconds: u64,
    ) -> Result<(), ImporterError> {
        let json = serde_json::to_string(payload)
            .map_err(|e| ImporterError::Internal(format!("failed to serialize listing: {}", e)))?;
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(key, json, ttl_seconds)
            .await
            .map_err(|e| ImporterError::Cache(format!("failed to cache listing: {}", e)))?;
        Ok(())
    }

    async fn read_listing(&self, key: &str) -> Result<Option<serde_json::Value>, ImporterError> {
        let mut conn = self.conn.clone();
        let payload: Option<String> = conn
            .get(key)
            .await
            .map_err(|e| ImporterError::Cache(format!("failed to read listing: {}", e)))?;
        match payload {
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|e| ImporterError::Cache(format!("corrupt listing payload: {}", e))),
            None => Ok(None),
        }
    }

    async fn invalidate_listings(&self) -> Result<(), ImporterError> {
        let mut conn = self.conn.clone();
        let mut keys: Vec<String> = Vec::new();
        {
            let mut iter = conn
                .scan_match::<_, String>(LISTING_KEY_PATTERN)
                .await
                .map_err(|e| ImporterError::Cache(format!("failed to scan listings: {}", e)))?;
            while let Some(key) = iter.next_item().await {
                keys.push(key);
            }
        }
        if !keys.is_empty() {
            let mut conn = self.conn.clone();
            conn.del::<_, ()>(keys)
                .await
                .map_err(|e| ImporterError::Cache(format!("failed to delete listings: {}", e)))?;
        }
        Ok(())
    }
}
