use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::domain::repository::{ImportJobRepository, ProgressStore};
use crate::error::ImporterError;
use crate::usecase::run_import::JOB_TTL_CEILING_SECONDS;

#[derive(Debug, Clone, serde::Serialize)]
pub struct CancelImportOutput {
    pub job_id: Uuid,
    pub message: String,
}

/// キャンセル要求。マーカーを書くだけの advisory な操作で、
/// ジョブが完了前に観測する保証はない。
pub struct CancelImportUseCase {
    job_repo: Arc<dyn ImportJobRepository>,
    progress: Arc<dyn ProgressStore>,
    cancel_ttl_seconds: u64,
}

impl CancelImportUseCase {
    pub fn new(
        job_repo: Arc<dyn ImportJobRepository>,
        progress: Arc<dyn ProgressStore>,
        cancel_ttl_seconds: u64,
    ) -> Self {
        Self {
            job_repo,
            progress,
            // マーカーの寿命はジョブ全体の TTL 上限（2時間）を超えない
            cancel_ttl_seconds: cancel_ttl_seconds.min(JOB_TTL_CEILING_SECONDS),
        }
    }

    pub async fn execute(&self, job_id: &Uuid) -> Result<CancelImportOutput, ImporterError> {
        let job = self
            .job_repo
            .find_by_id(job_id)
            .await?
            .ok_or_else(|| ImporterError::NotFound(format!("import job {}", job_id)))?;

        if job.status.is_terminal() {
            return Err(ImporterError::Conflict(format!(
                "import job {} already finished with status {}",
                job_id,
                job.status.as_str()
            )));
        }

        self.progress
            .request_cancel(job_id, self.cancel_ttl_seconds)
            .await?;
        info!(job_id = %job_id, "cancellation requested");

        Ok(CancelImportOutput {
            job_id: *job_id,
            message: "Cancellation requested. The job stops at the next chunk boundary."
                .to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::import_job::{ImportJob, ImportStatus};
    use crate::domain::repository::import_job_repository::MockImportJobRepository;
    use crate::domain::repository::progress_store::MockProgressStore;

    #[tokio::test]
    async fn sets_marker_for_running_job() {
        let mut jobs = MockImportJobRepository::new();
        jobs.expect_find_by_id().returning(|id| {
            let mut job = ImportJob::new("p.csv".to_string());
            job.id = *id;
            job.status = ImportStatus::Progress;
            Ok(Some(job))
        });
        let mut progress = MockProgressStore::new();
        progress
            .expect_request_cancel()
            .withf(|_, ttl| *ttl == 7200)
            .returning(|_, _| Ok(()));

        let uc = CancelImportUseCase::new(Arc::new(jobs), Arc::new(progress), 7200);
        let out = uc.execute(&Uuid::new_v4()).await.unwrap();
        assert!(out.message.contains("Cancellation requested"));
    }

    #[tokio::test]
    async fn marker_ttl_is_capped_at_the_job_ceiling() {
        let mut jobs = MockImportJobRepository::new();
        jobs.expect_find_by_id().returning(|id| {
            let mut job = ImportJob::new("p.csv".to_string());
            job.id = *id;
            job.status = ImportStatus::Progress;
            Ok(Some(job))
        });
        let mut progress = MockProgressStore::new();
        progress
            .expect_request_cancel()
            .withf(|_, ttl| *ttl == JOB_TTL_CEILING_SECONDS)
            .returning(|_, _| Ok(()));

        // 設定値が上限を超えていても 7200 秒に丸められる
        let uc = CancelImportUseCase::new(Arc::new(jobs), Arc::new(progress), 100_000);
        assert!(uc.execute(&Uuid::new_v4()).await.is_ok());
    }

    #[tokio::test]
    async fn finished_job_conflicts() {
        let mut jobs = MockImportJobRepository::new();
        jobs.expect_find_by_id().returning(|id| {
            let mut job = ImportJob::new("p.csv".to_string());
            job.id = *id;
            job.status = ImportStatus::Success;
            Ok(Some(job))
        });
        let progress = MockProgressStore::new();

        let uc = CancelImportUseCase::new(Arc::new(jobs), Arc::new(progress), 7200);
        let result = uc.execute(&Uuid::new_v4()).await;
        assert!(matches!(result, Err(ImporterError::Conflict(_))));
    }

    #[tokio::test]
    async fn unknown_job_is_not_found() {
        let mut jobs = MockImportJobRepository::new();
        jobs.expect_find_by_id().returning(|_| Ok(None));
        let progress = MockProgressStore::new();

        let uc = CancelImportUseCase::new(Arc::new(jobs), Arc::new(progress), 7200);
        let result = uc.execute(&Uuid::new_v4()).await;
        assert!(matches!(result, Err(ImporterError::NotFound(_))));
    }
}
