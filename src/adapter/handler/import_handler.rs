use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use uuid::Uuid;

use crate::adapter::handler::{error_response, AppState};
use crate::error::ImporterError;
use crate::usecase::update_import_job::UpdateImportJobInput;
use crate::usecase::upload_csv::UploadCsvInput;

fn parse_job_id(id: &str) -> Result<Uuid, ImporterError> {
    Uuid::parse_str(id)
        .map_err(|_| ImporterError::InvalidInput(format!("'{}' is not a valid job id", id)))
}

/// multipart の `file` パートを取り出してアップロードを受理する。
/// 成功時は 202 とジョブ ID を返し、処理は背景タスクに任せる。
pub async fn upload(State(state): State<AppState>, mut multipart: Multipart) -> impl IntoResponse {
    let mut upload: Option<UploadCsvInput> = None;
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return error_response(ImporterError::InvalidInput(format!(
                    "malformed multipart body: {}",
                    e
                )))
                .into_response()
            }
        };
        if field.name() != Some("file") {
            continue;
        }
        // ファイル名がないと拡張子検証をすり抜けるので、その場で弾く
        let Some(filename) = field.file_name().map(str::to_string) else {
            return error_response(ImporterError::InvalidInput(
                "multipart part 'file' must carry a filename".to_string(),
            ))
            .into_response();
        };
        match field.text().await {
            Ok(content) => {
                upload = Some(UploadCsvInput { filename, content });
                break;
            }
            Err(e) => {
                return error_response(ImporterError::InvalidInput(format!(
                    "file must be UTF-8 text: {}",
                    e
                )))
                .into_response()
            }
        }
    }

    let Some(input) = upload else {
        return error_response(ImporterError::InvalidInput(
            "multipart field 'file' is required".to_string(),
        ))
        .into_response();
    };

    match state.upload_uc.execute(input).await {
        Ok(output) => (
            StatusCode::ACCEPTED,
            Json(serde_json::to_value(output).unwrap_or_default()),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

pub async fn status(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    let job_id = match parse_job_id(&id) {
        Ok(job_id) => job_id,
        Err(e) => return error_response(e).into_response(),
    };
    match state.status_uc.execute(&job_id).await {
        Ok(output) => (
            StatusCode::OK,
            Json(serde_json::to_value(output).unwrap_or_default()),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

pub async fn cancel(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    let job_id = match parse_job_id(&id) {
        Ok(job_id) => job_id,
        Err(e) => return error_response(e).into_response(),
    };
    match state.cancel_uc.execute(&job_id).await {
        Ok(output) => (
            StatusCode::ACCEPTED,
            Json(serde_json::to_value(output).unwrap_or_default()),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

pub async fn list_jobs(State(state): State<AppState>) -> impl IntoResponse {
    match state.list_jobs_uc.execute().await {
        Ok(output) => (
            StatusCode::OK,
            Json(serde_json::to_value(output).unwrap_or_default()),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

pub async fn update_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateImportJobInput>,
) -> impl IntoResponse {
    let job_id = match parse_job_id(&id) {
        Ok(job_id) => job_id,
        Err(e) => return error_response(e).into_response(),
    };
    match state.update_job_uc.execute(&job_id, &input).await {
        Ok(job) => (
            StatusCode::OK,
            Json(serde_json::to_value(job).unwrap_or_default()),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

pub async fn delete_job(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    let job_id = match parse_job_id(&id) {
        Ok(job_id) => job_id,
        Err(e) => return error_response(e).into_response(),
    };
    match state.delete_job_uc.execute(&job_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e).into_response(),
    }
}
