use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPool;
use uuid::Uuid;

use crate::domain::entity::import_job::{ImportJob, ImportStatus};
use crate::domain::repository::import_job_repository::ImportJobRepository;
use crate::error::ImporterError;

#[derive(Debug, sqlx::FromRow)]
struct ImportJobRow {
    id: Uuid,
    filename: String,
    status: String,
    records_processed: i64,
    total_records: i64,
    active: bool,
    error: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ImportJobRow> for ImportJob {
    type Error = ImporterError;

    fn try_from(row: ImportJobRow) -> Result<Self, Self::Error> {
        let status = ImportStatus::parse(&row.status).ok_or_else(|| {
            ImporterError::Internal(format!("unknown import status '{}'", row.status))
        })?;
        Ok(ImportJob {
            id: row.id,
            filename: row.filename,
            status,
            records_processed: row.records_processed,
            total_records: row.total_records,
            active: row.active,
            error: row.error,
            created_at: row.created_at,
        })
    }
}

pub struct ImportJobPostgresRepository {
    pool: PgPool,
}

impl ImportJobPostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ImportJobRepository for ImportJobPostgresRepository {
    async fn create(&self, job: &ImportJob) -> Result<(), ImporterError> {
        sqlx::query(
            "INSERT INTO import_jobs
               (id, filename, status, records_processed, total_records, active, error, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(job.id)
        .bind(&job.filename)
        .bind(job.status.as_str())
        .bind(job.records_processed)
        .bind(job.total_records)
        .bind(job.active)
        .bind(&job.error)
        .bind(job.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| ImporterError::Internal(format!("failed to create import job: {}", e)))?;
        Ok(())
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<ImportJob>, ImporterError> {
        let row = sqlx::query_as::<_, ImportJobRow>(
            "SELECT id, filename, status, records_processed, total_records, active, error, created_at
             FROM import_jobs WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ImporterError::Internal(format!("failed to fetch import job: {}", e)))?;
        row.map(ImportJob::try_from).transpose()
    }

    async fn find_all(&self) -> Result<Vec<ImportJob>, ImporterError> {
        let rows = sqlx::query_as::<_, ImportJobRow>(
            "SELECT id, filename, status, records_processed, total_records, active, error, created_at
             FROM import_jobs ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ImporterError::Internal(format!("failed to list import jobs: {}", e)))?;
        rows.into_iter().map(ImportJob::try_from).collect()
    }

    async fn update(&self, job: &ImportJob) -> Result<(), ImporterError> {
        let result = sqlx::query(
            "UPDATE import_jobs
             SET status = $2, records_processed = $3, total_records = $4, error = $5
             WHERE id = $1",
        )
        .bind(job.id)
        .bind(job.status.as_str())
        .bind(job.records_processed)
        .bind(job.total_records)
        .bind(&job.error)
        .execute(&self.pool)
        .await
        .map_err(|e| ImporterError::Internal(format!("failed to update import job: {}", e)))?;
        if result.rows_affected() == 0 {
            return Err(ImporterError::NotFound(format!("import job {}", job.id)));
        }
        Ok(())
    }

    async fn set_active(&self, id: &Uuid, active: bool) -> Result<(), ImporterError> {
        let result = sqlx::query("UPDATE import_jobs SET active = $2 WHERE id = $1")
            .bind(id)
            .bind(active)
            .execute(&self.pool)
            .await
            .map_err(|e| ImporterError::Internal(format!("failed to update import job: {}", e)))?;
        if result.rows_affected() == 0 {
            return Err(ImporterError::NotFound(format!("import job {}", id)));
        }
        Ok(())
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, ImporterError> {
        let result = sqlx::query("DELETE FROM import_jobs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| ImporterError::Internal(format!("failed to delete import job: {}", e)))?;
        Ok(result.rows_affected() > 0)
    }
}
