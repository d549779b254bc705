pub mod health;
pub mod import_handler;
pub mod product_handler;
pub mod webhook_handler;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::ImporterError;
use crate::usecase;

/// アップロードの上限サイズ（50MB）。数十万行の CSV を想定する。
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub upload_uc: Arc<usecase::UploadCsvUseCase>,
    pub status_uc: Arc<usecase::GetImportStatusUseCase>,
    pub cancel_uc: Arc<usecase::CancelImportUseCase>,
    pub list_jobs_uc: Arc<usecase::ListImportJobsUseCase>,
    pub update_job_uc: Arc<usecase::UpdateImportJobUseCase>,
    pub delete_job_uc: Arc<usecase::DeleteImportJobUseCase>,
    pub list_products_uc: Arc<usecase::ListProductsUseCase>,
    pub create_product_uc: Arc<usecase::CreateProductUseCase>,
    pub update_product_uc: Arc<usecase::UpdateProductUseCase>,
    pub delete_product_uc: Arc<usecase::DeleteProductUseCase>,
    pub webhooks_uc: Arc<usecase::ManageWebhooksUseCase>,
    pub metrics_uc: Arc<usecase::GetMetricsUseCase>,
    pub db_pool: Option<sqlx::PgPool>,
    pub redis_conn: Option<redis::aio::ConnectionManager>,
}

pub fn error_response(err: ImporterError) -> (StatusCode, Json<serde_json::Value>) {
    let status = match &err {
        ImporterError::NotFound(_) => StatusCode::NOT_FOUND,
        ImporterError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        ImporterError::Conflict(_) => StatusCode::CONFLICT,
        ImporterError::Cache(_) => StatusCode::SERVICE_UNAVAILABLE,
        ImporterError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(serde_json::json!({"error": err.to_string()})))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health::healthz))
        .route("/readyz", get(health::readyz))
        .route("/metrics", get(health::metrics))
        .route(
            "/api/v1/imports",
            post(import_handler::upload).get(import_handler::list_jobs),
        )
        .route(
            "/api/v1/imports/:id",
            axum::routing::patch(import_handler::update_job).delete(import_handler::delete_job),
        )
        .route("/api/v1/imports/:id/status", get(import_handler::status))
        .route("/api/v1/imports/:id/cancel", post(import_handler::cancel))
        .route(
            "/api/v1/products",
            get(product_handler::list)
                .post(product_handler::create)
                .delete(product_handler::delete_all),
        )
        .route("/api/v1/products/count", get(product_handler::count))
        .route(
            "/api/v1/products/:id",
            get(product_handler::get)
                .put(product_handler::update)
                .delete(product_handler::delete),
        )
        .route(
            "/api/v1/webhooks",
            get(webhook_handler::list).post(webhook_handler::create),
        )
        .route("/api/v1/webhooks/:id", delete(webhook_handler::delete))
        .route("/api/v1/webhooks/:id/test", post(webhook_handler::test_delivery))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
