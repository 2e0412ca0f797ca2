//! Serves objects of the local backend to holders of a signed URL (no auth).

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{rejection::QueryRejection, Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tokio_util::io::ReaderStream;
use tubely_core::AppError;

#[derive(Debug, Deserialize)]
pub struct AssetQuery {
    pub expires: u64,
    pub signature: String,
}

fn content_type_for_key(key: &str) -> &'static str {
    if key.ends_with(".mp4") {
        "video/mp4"
    } else {
        "application/octet-stream"
    }
}

#[utoipa::path(
    get,
    path = "/assets/{key}",
    tag = "assets",
    params(
        ("key" = String, Path, description = "Object key, e.g. landscape/<hex>.mp4"),
        ("expires" = u64, Query, description = "Expiry as Unix seconds"),
        ("signature" = String, Query, description = "URL signature")
    ),
    responses(
        (status = 200, description = "Object bytes"),
        (status = 401, description = "Missing, invalid or expired signature", body = ErrorResponse),
        (status = 404, description = "Object not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, query), fields(key = %key, operation = "serve_asset"))]
pub async fn serve_asset(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    query: Result<Query<AssetQuery>, QueryRejection>,
) -> Result<Response, HttpAppError> {
    let local = state
        .local_storage
        .as_ref()
        .ok_or_else(|| AppError::NotFound("Asset not found".to_string()))?;

    let Query(query) =
        query.map_err(|_| AppError::Unauthenticated("Missing URL signature".to_string()))?;

    local
        .verify_signed_request(&key, query.expires, &query.signature)
        .map_err(|e| AppError::Unauthenticated(e.to_string()))?;

    let (file, len) = local.open(&key).await?;

    Ok((
        [
            (header::CONTENT_TYPE, content_type_for_key(&key).to_string()),
            (header::CONTENT_LENGTH, len.to_string()),
            (header::CACHE_CONTROL, "private, no-store".to_string()),
        ],
        Body::from_stream(ReaderStream::new(file)),
    )
        .into_response())
}
