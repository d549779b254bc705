use std::sync::Arc;

use crate::domain::entity::import_job::ImportJob;
use crate::domain::repository::ImportJobRepository;
use crate::error::ImporterError;

#[derive(Debug, Clone, serde::Serialize)]
pub struct ListImportJobsOutput {
    pub jobs: Vec<ImportJob>,
    pub total: usize,
}

pub struct ListImportJobsUseCase {
    job_repo: Arc<dyn ImportJobRepository>,
}

impl ListImportJobsUseCase {
    pub fn new(job_repo: Arc<dyn ImportJobRepository>) -> Self {
        Self { job_repo }
    }

    pub async fn execute(&self) -> Result<ListImportJobsOutput, ImporterError> {
        let jobs = self.job_repo.find_all().await?;
        let total = jobs.len();
        Ok(ListImportJobsOutput { jobs, total })
    }
}
