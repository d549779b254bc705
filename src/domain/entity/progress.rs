use serde::{Deserialize, Serialize};

use crate::domain::entity::import_job::{ImportJob, ImportStatus};

/// ProgressSnapshot は実行中インポートの時点情報。
/// TTL 付きでエフェメラルストアに置かれるため、期限切れ・欠落があり得る。
/// 欠落時は ImportJob レコードから `from_job` で等価なビューを合成する。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub state: String,
    pub current: i64,
    pub total: i64,
    pub progress_percent: i32,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imported_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProgressSnapshot {
    fn percent(current: i64, total: i64) -> i32 {
        if total > 0 {
            (current * 100 / total) as i32
        } else {
            0
        }
    }

    pub fn running(current: i64, total: i64, imported: i64) -> Self {
        let pct = Self::percent(current, total);
        Self {
            state: ImportStatus::Progress.as_str().to_string(),
            current,
            total,
            progress_percent: pct,
            status: format!("Processing {} of {} records ({}%)", current, total, pct),
            imported_count: Some(imported),
            error: None,
        }
    }

    pub fn success(total: i64, imported: i64) -> Self {
        Self {
            state: ImportStatus::Success.as_str().to_string(),
            current: total,
            total,
            progress_percent: 100,
            status: format!(
                "Import completed successfully! Processed {} products.",
                imported
            ),
            imported_count: Some(imported),
            error: None,
        }
    }

    pub fn failure(error: &str) -> Self {
        Self {
            state: ImportStatus::Failure.as_str().to_string(),
            current: 0,
            total: 0,
            progress_percent: 0,
            status: format!("Import failed: {}", error),
            imported_count: None,
            error: Some(error.to_string()),
        }
    }

    pub fn cancelled(current: i64, total: i64, imported: i64) -> Self {
        Self {
            state: ImportStatus::Cancelled.as_str().to_string(),
            current,
            total,
            progress_percent: Self::percent(current, total),
            status: format!("Import cancelled after {} of {} records", current, total),
            imported_count: Some(imported),
            error: None,
        }
    }

    /// キャッシュミス時のフォールバック。永続レコードだけから合成する。
    pub fn from_job(job: &ImportJob) -> Self {
        let pct = job.progress_percent();
        let status = match job.status {
            ImportStatus::Pending => "Import queued".to_string(),
            ImportStatus::Progress => format!(
                "Processing {} of {} records ({}%)",
                job.records_processed, job.total_records, pct
            ),
            ImportStatus::Success => format!(
                "Import completed successfully! Processed {} products.",
                job.records_processed
            ),
            ImportStatus::Failure => format!(
                "Import failed: {}",
                job.error.as_deref().unwrap_or("unknown error")
            ),
            ImportStatus::Cancelled => format!(
                "Import cancelled after {} of {} records",
                job.records_processed, job.total_records
            ),
        };
        Self {
            state: job.status.as_str().to_string(),
            current: job.records_processed,
            total: job.total_records,
            progress_percent: pct,
            status,
            imported_count: Some(job.records_processed),
            error: job.error.clone(),
        }
    }
}
