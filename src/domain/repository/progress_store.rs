use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entity::progress::ProgressSnapshot;
use crate::error::ImporterError;

/// ProgressStore はエフェメラルストア（Redis）への窓口。
///
/// キー設計:
///   - `task:{job_id}` — 進捗スナップショット JSON（TTL 付き）
///   - `cancel:{job_id}` — キャンセル要求マーカー（TTL 付き）
///   - `products:{skip}:{limit}:{search}:{active}` — 商品一覧キャッシュ
///
/// すべてベストエフォート: 呼び出し側は `ImporterError::Cache` を
/// 警告ログに落として握り潰す。進捗は可観測性であって正しさではない。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProgressStore: Send + Sync {
    async fn publish(
        &self,
        job_id: &Uuid,
        snapshot: &ProgressSnapshot,
        ttl_seconds: u64,
    ) -> Result<(), ImporterError>;
    async fn read(&self, job_id: &Uuid) -> Result<Option<ProgressSnapshot>, ImporterError>;

    async fn request_cancel(&self, job_id: &Uuid, ttl_seconds: u64) -> Result<(), ImporterError>;
    async fn is_cancel_requested(&self, job_id: &Uuid) -> Result<bool, ImporterError>;

    async fn cache_listing(
        &self,
        key: &str,
        payload: &serde_json::Value,
        ttl_seconds: u64,
    ) -> Result<(), ImporterError>;
    async fn read_listing(&self, key: &str) -> Result<Option<serde_json::Value>, ImporterError>;
    /// `products:*` の一覧キャッシュを全て破棄する。
    async fn invalidate_listings(&self) -> Result<(), ImporterError>;
}
