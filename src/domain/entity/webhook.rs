use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Webhook はイベント通知先の設定。配信そのものは本サービスの範囲外で、
/// テスト配信エンドポイントはスタブ応答を返す。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Webhook {
    pub id: i64,
    pub url: String,
    pub event_type: String,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}
