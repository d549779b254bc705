use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use crate::domain::entity::progress::ProgressSnapshot;
use crate::domain::repository::{ImportJobRepository, ProgressStore};
use crate::error::ImporterError;

#[derive(Debug, Clone, serde::Serialize)]
pub struct GetImportStatusOutput {
    pub job_id: Uuid,
    #[serde(flatten)]
    pub snapshot: ProgressSnapshot,
}

/// 進捗照会。エフェメラルストアを読み、ミスまたはエラー時は
/// 永続レコードから等価なビューを合成する。
pub struct GetImportStatusUseCase {
    job_repo: Arc<dyn ImportJobRepository>,
    progress: Arc<dyn ProgressStore>,
}

impl GetImportStatusUseCase {
    pub fn new(job_repo: Arc<dyn ImportJobRepository>, progress: Arc<dyn ProgressStore>) -> Self {
        Self { job_repo, progress }
    }

    pub async fn execute(&self, job_id: &Uuid) -> Result<GetImportStatusOutput, ImporterError> {
        match self.progress.read(job_id).await {
            Ok(Some(snapshot)) => {
                return Ok(GetImportStatusOutput {
                    job_id: *job_id,
                    snapshot,
                })
            }
            Ok(None) => {}
            Err(e) => {
                warn!(job_id = %job_id, error = %e, "progress read failed, falling back to job record");
            }
        }

        let job = self
            .job_repo
            .find_by_id(job_id)
            .await?
            .ok_or_else(|| ImporterError::NotFound(format!("import job {}", job_id)))?;
        Ok(GetImportStatusOutput {
            job_id: *job_id,
            snapshot: ProgressSnapshot::from_job(&job),
        })
    }
}
