use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::domain::entity::import_job::ImportJob;
use crate::domain::repository::ImportJobRepository;
use crate::error::ImporterError;
use crate::usecase::run_import::{csv_columns, ImportRunner};

#[derive(Debug, Clone)]
pub struct UploadCsvInput {
    pub filename: String,
    pub content: String,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct UploadCsvOutput {
    pub job_id: Uuid,
    pub message: String,
}

/// アップロードを受理してジョブを起票し、背景タスクとして実行開始する。
/// 拡張子とヘッダ行の検証だけは同期的に行い、残りは非同期に任せる。
pub struct UploadCsvUseCase {
    job_repo: Arc<dyn ImportJobRepository>,
    runner: Arc<ImportRunner>,
}

impl UploadCsvUseCase {
    pub fn new(job_repo: Arc<dyn ImportJobRepository>, runner: Arc<ImportRunner>) -> Self {
        Self { job_repo, runner }
    }

    pub async fn execute(&self, input: UploadCsvInput) -> Result<UploadCsvOutput, ImporterError> {
        if !input.filename.to_lowercase().ends_with(".csv") {
            return Err(ImporterError::InvalidInput(
                "only CSV files are accepted".to_string(),
            ));
        }
        // ヘッダ行の検証は提出時に行い、欠落を同期エラーで返す
        csv_columns(&input.content)?;

        let job = ImportJob::new(input.filename.clone());
        self.job_repo.create(&job).await?;
        info!(job_id = %job.id, filename = %input.filename, "import job accepted");

        let runner = Arc::clone(&self.runner);
        let job_id = job.id;
        tokio::spawn(async move {
            runner.run(job_id, input.content).await;
        });

        Ok(UploadCsvOutput {
            job_id,
            message: "Import started. Poll the status endpoint for progress.".to_string(),
        })
    }
}
