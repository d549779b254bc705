use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entity::import_job::ImportJob;
use crate::error::ImporterError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImportJobRepository: Send + Sync {
    async fn create(&self, job: &ImportJob) -> Result<(), ImporterError>;
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<ImportJob>, ImporterError>;
    /// 新しい順（created_at DESC）で全件を返す。
    async fn find_all(&self) -> Result<Vec<ImportJob>, ImporterError>;
    /// ライフサイクル列（status / counters / error）の更新。
    /// オーケストレータ専用の書き込みで、`active` には触れない。
    async fn update(&self, job: &ImportJob) -> Result<(), ImporterError>;
    /// `active` フラグのみの更新。実行中のジョブ行と競合しても
    /// ライフサイクル列を巻き戻さない。
    async fn set_active(&self, id: &Uuid, active: bool) -> Result<(), ImporterError>;
    async fn delete(&self, id: &Uuid) -> Result<bool, ImporterError>;
}
