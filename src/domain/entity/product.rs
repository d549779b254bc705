use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Product は商品カタログの1エントリを表す。
/// `sku` は大文字小文字を区別しないビジネスキーで、カタログ全体で一意。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub sku: String,
    pub description: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// NewProduct は作成リクエストの入力値。id とタイムスタンプは DB 側で採番する。
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub sku: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// ProductRecord は CSV の1行をパース・正規化した値。
///
/// 正規化ルール:
///   - name / sku / description は前後の空白をトリムする
///   - name または sku が空の行は取り込み対象外（エラーではなく黙って捨てる）
///   - sku は重複排除キーとして大文字に正規化する
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRecord {
    pub name: String,
    pub sku: String,
    pub description: String,
}

impl ProductRecord {
    /// 生のフィールド値から ProductRecord を組み立てる。無効な行は `None`。
    pub fn from_row(name: &str, sku: &str, description: &str) -> Option<Self> {
        let name = name.trim();
        let sku = sku.trim();
        if name.is_empty() || sku.is_empty() {
            return None;
        }
        Some(Self {
            name: name.to_string(),
            sku: sku.to_uppercase(),
            description: description.trim().to_string(),
        })
    }
}
