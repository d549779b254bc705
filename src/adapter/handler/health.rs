use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use redis::AsyncCommands;

use crate::adapter::handler::{error_response, AppState};

pub async fn healthz() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok", "service": "importer"}))
}

/// 依存の疎通確認。DB 不通は unhealthy (503)、Redis 不通だけなら
/// degraded のまま 200 を返す（進捗キャッシュなしでも動作は継続する）。
pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    let database = match &state.db_pool {
        Some(pool) => sqlx::query("SELECT 1").execute(pool).await.is_ok(),
        None => true, // インメモリ構成
    };
    let redis = match &state.redis_conn {
        Some(conn) => {
            let mut conn = conn.clone();
            let roundtrip: Result<(), redis::RedisError> = async {
                conn.set_ex::<_, _, ()>("readyz:probe", "1", 10).await?;
                let _: Option<String> = conn.get("readyz:probe").await?;
                Ok(())
            }
            .await;
            roundtrip.is_ok()
        }
        None => true,
    };

    let (status, overall) = match (database, redis) {
        (true, true) => (StatusCode::OK, "healthy"),
        (true, false) => (StatusCode::OK, "degraded"),
        (false, _) => (StatusCode::SERVICE_UNAVAILABLE, "unhealthy"),
    };
    (
        status,
        Json(serde_json::json!({
            "status": overall,
            "checks": {
                "database": if database { "ok" } else { "down" },
                "redis": if redis { "ok" } else { "down" },
            }
        })),
    )
}

pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    match state.metrics_uc.execute().await {
        Ok(output) => (
            StatusCode::OK,
            Json(serde_json::to_value(output).unwrap_or_default()),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}
