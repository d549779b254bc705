use std::sync::Arc;

use uuid::Uuid;

use crate::domain::entity::import_job::ImportJob;
use crate::domain::repository::ImportJobRepository;
use crate::error::ImporterError;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct UpdateImportJobInput {
    pub active: bool,
}

pub struct UpdateImportJobUseCase {
    job_repo: Arc<dyn ImportJobRepository>,
}

impl UpdateImportJobUseCase {
    pub fn new(job_repo: Arc<dyn ImportJobRepository>) -> Self {
        Self { job_repo }
    }

    /// 更新できるのは active フラグのみ。ステータスやカウンタは
    /// オーケストレータだけが書くので、行全体の read-modify-write ではなく
    /// `set_active` で対象列だけを書く（実行中ジョブとの競合で
    /// ライフサイクル列を巻き戻さないため）。
    pub async fn execute(
        &self,
        job_id: &Uuid,
        input: &UpdateImportJobInput,
    ) -> Result<ImportJob, ImporterError> {
        self.job_repo.set_active(job_id, input.active).await?;
        self.job_repo
            .find_by_id(job_id)
            .await?
            .ok_or_else(|| ImporterError::NotFound(format!("import job {}", job_id)))
    }
}
