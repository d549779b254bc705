use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entity::progress::ProgressSnapshot;
use crate::domain::repository::progress_store::ProgressStore;
use crate::error::ImporterError;

/// InMemoryProgressStore は REDIS_URL 未設定時のフォールバック。
/// TTL は追跡しない（プロセス再起動で全て消えるため実害がない）。
pub struct InMemoryProgressStore {
    snapshots: RwLock<HashMap<Uuid, ProgressSnapshot>>,
    cancels: RwLock<HashSet<Uuid>>,
    listings: RwLock<HashMap<String, serde_json::Value>>,
}

impl InMemoryProgressStore {
    pub fn new() -> Self {
        Self {
            snapshots: RwLock::new(HashMap::new()),
            cancels: RwLock::new(HashSet::new()),
            listings: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryProgressStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProgressStore for InMemoryProgressStore {
    async fn publish(
        &self,
        job_id: &Uuid,
        snapshot: &ProgressSnapshot,
        _ttl_seconds: u64,
    ) -> Result<(), ImporterError> {
        let mut snapshots = self.snapshots.write().await;
        snapshots.insert(*job_id, snapshot.clone());
        Ok(())
    }

    async fn read(&self, job_id: &Uuid) -> Result<Option<ProgressSnapshot>, ImporterError> {
        let snapshots = self.snapshots.read().await;
        Ok(snapshots.get(job_id).cloned())
    }

    async fn request_cancel(&self, job_id: &Uuid, _ttl_seconds: u64) -> Result<(), ImporterError> {
        let mut cancels = self.cancels.write().await;
        cancels.insert(*job_id);
        Ok(())
    }

    async fn is_cancel_requested(&self, job_id: &Uuid) -> Result<bool, ImporterError> {
        let cancels = self.cancels.read().await;
        Ok(cancels.contains(job_id))
    }

    async fn cache_listing(
        &self,
        key: &str,
        payload: &serde_json::Value,
        _ttl_seconds: u64,
    ) -> Result<(), ImporterError> {
        let mut listings = self.listings.write().await;
        listings.insert(key.to_string(), payload.clone());
        Ok(())
    }

    async fn read_listing(&self, key: &str) -> Result<Option<serde_json::Value>, ImporterError> {
        let listings = self.listings.read().await;
        Ok(listings.get(key).cloned())
    }

    async fn invalidate_listings(&self) -> Result<(), ImporterError> {
        let mut listings = self.listings.write().await;
        listings.clear();
        Ok(())
    }
}
