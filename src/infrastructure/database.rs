use sqlx::postgres::{PgPool, PgPoolOptions};

/// 商品カタログ用の PostgreSQL 接続プールを張る。
/// プールはインポートの背景タスクと CRUD ハンドラで共有される。
pub async fn create_pool(url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(url)
        .await
        .map_err(|e| anyhow::anyhow!("failed to connect to the product database: {}", e))
}
