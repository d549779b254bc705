use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entity::import_job::ImportJob;
use crate::domain::repository::import_job_repository::ImportJobRepository;
use crate::error::ImporterError;

/// InMemoryImportJobRepository はインメモリのジョブリポジトリ。
pub struct InMemoryImportJobRepository {
    jobs: RwLock<HashMap<Uuid, ImportJob>>,
}

impl InMemoryImportJobRepository {
    pub fn new() -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryImportJobRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImportJobRepository for InMemoryImportJobRepository {
    async fn create(&self, job: &ImportJob) -> Result<(), ImporterError> {
        let mut jobs = self.jobs.write().await;
        jobs.insert(job.id, job.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<ImportJob>, ImporterError> {
        let jobs = self.jobs.read().await;
        Ok(jobs.get(id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<ImportJob>, ImporterError> {
        let jobs = self.jobs.read().await;
        let mut result: Vec<ImportJob> = jobs.values().cloned().collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }

    async fn update(&self, job: &ImportJob) -> Result<(), ImporterError> {
        let mut jobs = self.jobs.write().await;
        let existing = jobs
            .get_mut(&job.id)
            .ok_or_else(|| ImporterError::NotFound(format!("import job {}", job.id)))?;
        existing.status = job.status;
        existing.records_processed = job.records_processed;
        existing.total_records = job.total_records;
        existing.error = job.error.clone();
        Ok(())
    }

    async fn set_active(&self, id: &Uuid, active: bool) -> Result<(), ImporterError> {
        let mut jobs = self.jobs.write().await;
        let existing = jobs
            .get_mut(id)
            .ok_or_else(|| ImporterError::NotFound(format!("import job {}", id)))?;
        existing.active = active;
        Ok(())
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, ImporterError> {
        let mut jobs = self.jobs.write().await;
        Ok(jobs.remove(id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_find() {
        let repo = InMemoryImportJobRepository::new();
        let job = ImportJob::new("products.csv".to_string());
        repo.create(&job).await.unwrap();

        let found = repo.find_by_id(&job.id).await.unwrap();
        assert_eq!(found.unwrap().filename, "products.csv");
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let repo = InMemoryImportJobRepository::new();
        let job = ImportJob::new("p.csv".to_string());
        let err = repo.update(&job).await.unwrap_err();
        assert!(matches!(err, ImporterError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_lifecycle_update_and_set_active_do_not_clobber_each_other() {
        use crate::domain::entity::import_job::ImportStatus;

        let repo = InMemoryImportJobRepository::new();
        let job = ImportJob::new("p.csv".to_string());
        repo.create(&job).await.unwrap();

        // オーケストレータが古いスナップショットを持ったまま進行する
        let mut orchestrator_view = job.clone();
        orchestrator_view.status = ImportStatus::Progress;
        orchestrator_view.records_processed = 1000;
        orchestrator_view.total_records = 6000;
        repo.update(&orchestrator_view).await.unwrap();

        // 並行する PATCH が active を落とす
        repo.set_active(&job.id, false).await.unwrap();

        // スナップショットの active=true を持つライフサイクル更新が
        // 後から来ても active は巻き戻らない
        orchestrator_view.status = ImportStatus::Success;
        orchestrator_view.records_processed = 6000;
        repo.update(&orchestrator_view).await.unwrap();

        let stored = repo.find_by_id(&job.id).await.unwrap().unwrap();
        assert_eq!(stored.status, ImportStatus::Success);
        assert_eq!(stored.records_processed, 6000);
        assert!(!stored.active);
    }

    #[tokio::test]
    async fn test_find_all_newest_first() {
        let repo = InMemoryImportJobRepository::new();
        let mut old = ImportJob::new("old.csv".to_string());
        old.created_at -= chrono::Duration::minutes(5);
        let new = ImportJob::new("new.csv".to_string());
        repo.create(&old).await.unwrap();
        repo.create(&new).await.unwrap();

        let all = repo.find_all().await.unwrap();
        assert_eq!(all[0].filename, "new.csv");
        assert_eq!(all[1].filename, "old.csv");
    }
}
