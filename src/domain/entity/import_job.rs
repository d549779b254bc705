use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// ImportStatus はインポートジョブのライフサイクル状態。
/// PENDING で作成され、行数確定後 PROGRESS、最終的に
/// SUCCESS / FAILURE / CANCELLED のいずれかで終端する。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportStatus {
    Pending,
    Progress,
    Success,
    Failure,
    Cancelled,
}

impl ImportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Progress => "PROGRESS",
            Self::Success => "SUCCESS",
            Self::Failure => "FAILURE",
            Self::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(Self::Pending),
            "PROGRESS" => Some(Self::Progress),
            "SUCCESS" => Some(Self::Success),
            "FAILURE" => Some(Self::Failure),
            "CANCELLED" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Failure | Self::Cancelled)
    }
}

/// ImportJob は1回のアップロードに対応する永続レコード。
/// エフェメラルな ProgressSnapshot が失われてもこちらが正となる。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportJob {
    pub id: Uuid,
    pub filename: String,
    pub status: ImportStatus,
    pub records_processed: i64,
    pub total_records: i64,
    pub active: bool,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ImportJob {
    pub fn new(filename: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            filename,
            status: ImportStatus::Pending,
            records_processed: 0,
            total_records: 0,
            active: true,
            error: None,
            created_at: Utc::now(),
        }
    }

    /// 永続カウンタから進捗率を合成する。total が 0 のときは 0。
    pub fn progress_percent(&self) -> i32 {
        if self.total_records > 0 {
            (self.records_processed * 100 / self.total_records) as i32
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_job_is_pending() {
        let job = ImportJob::new("products.csv".to_string());
        assert_eq!(job.status, ImportStatus::Pending);
        assert_eq!(job.records_processed, 0);
        assert_eq!(job.total_records, 0);
        assert!(job.active);
        assert!(job.error.is_none());
    }

    #[test]
    fn test_status_roundtrip() {
        for s in [
            ImportStatus::Pending,
            ImportStatus::Progress,
            ImportStatus::Success,
            ImportStatus::Failure,
            ImportStatus::Cancelled,
        ] {
            assert_eq!(ImportStatus::parse(s.as_str()), Some(s));
        }
        assert_eq!(ImportStatus::parse("unknown"), None);
    }

    #[test]
    fn test_terminal_states() {
        assert!(!ImportStatus::Pending.is_terminal());
        assert!(!ImportStatus::Progress.is_terminal());
        assert!(ImportStatus::Success.is_terminal());
        assert!(ImportStatus::Failure.is_terminal());
        assert!(ImportStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_progress_percent() {
        let mut job = ImportJob::new("p.csv".to_string());
        assert_eq!(job.progress_percent(), 0);
        job.total_records = 200;
        job.records_processed = 50;
        assert_eq!(job.progress_percent(), 25);
        job.records_processed = 200;
        assert_eq!(job.progress_percent(), 100);
    }
}
