use std::sync::Arc;

use uuid::Uuid;

use crate::domain::repository::ImportJobRepository;
use crate::error::ImporterError;

pub struct DeleteImportJobUseCase {
    job_repo: Arc<dyn ImportJobRepository>,
}

impl DeleteImportJobUseCase {
    pub fn new(job_repo: Arc<dyn ImportJobRepository>) -> Self {
        Self { job_repo }
    }

    pub async fn execute(&self, job_id: &Uuid) -> Result<(), ImporterError> {
        let deleted = self.job_repo.delete(job_id).await?;
        if !deleted {
            return Err(ImporterError::NotFound(format!("import job {}", job_id)));
        }
        Ok(())
    }
}
