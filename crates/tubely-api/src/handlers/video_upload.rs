use crate::auth::models::AuthUser;
use crate::constants::VIDEO_FIELD_NAME;
use crate::error::{ErrorResponse, HttpAppError};
use crate::services::ingest::{IngestRequest, UploadError, UploadStage};
use crate::state::AppState;
use crate::utils::upload::{check_content_length, validate_content_type};
use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    http::HeaderMap,
    Json,
};
use std::sync::Arc;
use tubely_core::{AppError, VideoResponse};
use uuid::Uuid;

fn invalid(message: impl Into<String>) -> UploadError {
    UploadError::new(UploadStage::Validate, AppError::BadRequest(message.into()))
}

/// Attach a media file to an existing video record.
#[utoipa::path(
    post,
    path = "/api/videos/{video_id}/video",
    tag = "videos",
    params(
        ("video_id" = Uuid, Path, description = "Video ID")
    ),
    request_body(content = inline(Object), content_type = "multipart/form-data", description = "Single file field named 'video'"),
    responses(
        (status = 200, description = "Video uploaded", body = VideoResponse),
        (status = 400, description = "Invalid input or upload too large", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Caller does not own the video", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 500, description = "Processing or storage failure", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state, headers, multipart),
    fields(user_id = %user.user_id, video_id = %video_id, operation = "upload_video_file")
)]
pub async fn upload_video_file(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(video_id): Path<String>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<VideoResponse>, HttpAppError> {
    let video_id = Uuid::parse_str(&video_id).map_err(|_| invalid("Invalid video ID"))?;

    check_content_length(&headers, state.upload.max_upload_size_bytes)
        .map_err(|e| UploadError::new(UploadStage::Validate, e))?;

    let mut multipart = multipart.map_err(|e| invalid(format!("Invalid multipart body: {}", e)))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| invalid(format!("Failed to read multipart: {}", e)))?
    {
        if field.name() != Some(VIDEO_FIELD_NAME) {
            continue;
        }

        let content_type = validate_content_type(
            field.content_type().unwrap_or_default(),
            &state.upload.allowed_content_types,
        )
        .map_err(|e| UploadError::new(UploadStage::Validate, e))?;

        let request = IngestRequest {
            video_id,
            user_id: user.user_id,
            content_type,
        };
        let response = state.ingest.ingest(request, field).await?;
        return Ok(Json(response));
    }

    Err(invalid(format!("Missing multipart field '{}'", VIDEO_FIELD_NAME)).into())
}
