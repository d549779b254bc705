use async_trait::async_trait;

use crate::domain::entity::product::{NewProduct, Product, ProductRecord};
use crate::error::ImporterError;

/// 一覧・件数取得で共有する検索条件。
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub skip: i64,
    pub limit: i64,
    /// name / sku / description に対する部分一致（大文字小文字を区別しない）
    pub search: Option<String>,
    pub active: Option<bool>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Product>, ImporterError>;
    /// SKU の完全一致検索。大文字小文字を区別しない。
    async fn find_by_sku(&self, sku: &str) -> Result<Option<Product>, ImporterError>;
    async fn find_all(&self, filter: &ProductFilter) -> Result<Vec<Product>, ImporterError>;
    async fn count(&self, filter: &ProductFilter) -> Result<i64, ImporterError>;
    async fn create(&self, product: &NewProduct) -> Result<Product, ImporterError>;
    async fn update(&self, product: &Product) -> Result<Product, ImporterError>;
    async fn delete(&self, id: i64) -> Result<bool, ImporterError>;
    async fn delete_all(&self) -> Result<i64, ImporterError>;
    /// バッチ内で SKU 重複のないレコード群を1個のアトミックな書き込みとして
    /// 適用する。既存 SKU は name / description / updated_at のみ更新し、
    /// id / active / created_at には触れない。
    async fn upsert_batch(&self, records: &[ProductRecord]) -> Result<(), ImporterError>;
}
