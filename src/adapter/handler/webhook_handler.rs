use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::adapter::handler::{error_response, AppState};
use crate::usecase::manage_webhooks::CreateWebhookInput;

pub async fn list(State(state): State<AppState>) -> impl IntoResponse {
    match state.webhooks_uc.list().await {
        Ok(webhooks) => (
            StatusCode::OK,
            Json(serde_json::to_value(webhooks).unwrap_or_default()),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateWebhookInput>,
) -> impl IntoResponse {
    match state.webhooks_uc.create(&input).await {
        Ok(webhook) => (
            StatusCode::CREATED,
            Json(serde_json::to_value(webhook).unwrap_or_default()),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> impl IntoResponse {
    match state.webhooks_uc.delete(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

pub async fn test_delivery(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    match state.webhooks_uc.test_delivery(id).await {
        Ok(output) => (
            StatusCode::OK,
            Json(serde_json::to_value(output).unwrap_or_default()),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}
