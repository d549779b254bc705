use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::adapter::handler::{error_response, AppState};
use crate::domain::entity::product::NewProduct;
use crate::domain::repository::product_repository::ProductFilter;
use crate::usecase::update_product::UpdateProductInput;

const MAX_PAGE_SIZE: i64 = 1000;

#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    pub search: Option<String>,
    pub active: Option<bool>,
}

fn default_limit() -> i64 {
    100
}

impl From<ProductQuery> for ProductFilter {
    fn from(q: ProductQuery) -> Self {
        ProductFilter {
            skip: q.skip.max(0),
            limit: q.limit.clamp(1, MAX_PAGE_SIZE),
            search: q.search.filter(|s| !s.trim().is_empty()),
            active: q.active,
        }
    }
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> impl IntoResponse {
    let filter = ProductFilter::from(query);
    match state.list_products_uc.execute(&filter).await {
        Ok(output) => (
            StatusCode::OK,
            Json(serde_json::to_value(output).unwrap_or_default()),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

pub async fn count(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> impl IntoResponse {
    let filter = ProductFilter::from(query);
    match state.list_products_uc.count(&filter).await {
        Ok(total) => (StatusCode::OK, Json(serde_json::json!({"total": total}))).into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

pub async fn get(State(state): State<AppState>, Path(id): Path<i64>) -> impl IntoResponse {
    match state.list_products_uc.find(id).await {
        Ok(product) => (
            StatusCode::OK,
            Json(serde_json::to_value(product).unwrap_or_default()),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<NewProduct>,
) -> impl IntoResponse {
    match state.create_product_uc.execute(&input).await {
        Ok(product) => (
            StatusCode::CREATED,
            Json(serde_json::to_value(product).unwrap_or_default()),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateProductInput>,
) -> impl IntoResponse {
    match state.update_product_uc.execute(id, &input).await {
        Ok(product) => (
            StatusCode::OK,
            Json(serde_json::to_value(product).unwrap_or_default()),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> impl IntoResponse {
    match state.delete_product_uc.execute(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

pub async fn delete_all(State(state): State<AppState>) -> impl IntoResponse {
    match state.delete_product_uc.execute_all().await {
        Ok(deleted) => (
            StatusCode::OK,
            Json(serde_json::json!({"deleted": deleted})),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}
