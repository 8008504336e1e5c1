use axum::extract::{Path, State};
use axum::http::{HeaderMap, header};
use axum::response::Response;
use common::storage::ObjectKey;
use tracing::instrument;

use crate::entity::video;
use crate::error::{AppError, ErrorBody};
use crate::handlers::video::find_video;
use crate::services::range;
use crate::services::streaming::{Delivery, attachment_disposition, download_name, serve_range};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/videos/{id}/stream",
    tag = "Streaming",
    operation_id = "streamVideo",
    summary = "Stream a video",
    description = "Serves the video bytes. A single `Range: bytes=S-E` or `bytes=S-` header yields \
        206 with exactly the requested bytes. Multi-range and suffix ranges are refused with 416.",
    params(
        ("id" = i32, Path, description = "Video ID"),
        ("Range" = Option<String>, Header, description = "Byte range, e.g. `bytes=0-1023`"),
    ),
    responses(
        (status = 200, description = "Whole video", content_type = "video/mp4"),
        (status = 206, description = "Requested byte range", content_type = "video/mp4"),
        (status = 404, description = "Video or file not found (NOT_FOUND)", body = ErrorBody),
        (status = 416, description = "Range not satisfiable (RANGE_NOT_SATISFIABLE)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, headers), fields(video_id = id))]
pub async fn stream_video(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let model = find_video(&state.db, id).await?;
    respond(&state, &model, &headers, None).await
}

#[utoipa::path(
    get,
    path = "/videos/{id}/download",
    tag = "Streaming",
    operation_id = "downloadVideo",
    summary = "Download a video",
    description = "Same bytes as `/stream`, served as an attachment named after the display name. \
        The stored file's extension is appended when the name lacks it.",
    params(
        ("id" = i32, Path, description = "Video ID"),
        ("Range" = Option<String>, Header, description = "Byte range, e.g. `bytes=0-1023`"),
    ),
    responses(
        (status = 200, description = "Whole video as attachment"),
        (status = 206, description = "Requested byte range"),
        (status = 404, description = "Video or file not found (NOT_FOUND)", body = ErrorBody),
        (status = 416, description = "Range not satisfiable (RANGE_NOT_SATISFIABLE)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, headers), fields(video_id = id))]
pub async fn download_video(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let model = find_video(&state.db, id).await?;
    let key = ObjectKey::parse(&model.storage_key)?;
    let disposition = attachment_disposition(&download_name(&model.original_filename, &key));
    respond(&state, &model, &headers, Some(disposition)).await
}

async fn respond(
    state: &AppState,
    model: &video::Model,
    headers: &HeaderMap,
    disposition: Option<String>,
) -> Result<Response, AppError> {
    let key = ObjectKey::parse(&model.storage_key)?;
    // The recorded size frames the response; a shorter object fails the body.
    let total = u64::try_from(model.file_size)
        .map_err(|_| AppError::Internal(format!("negative size recorded for video {}", model.id)))?;

    let header = headers
        .get(header::RANGE)
        .map(|v| v.to_str().unwrap_or_default());
    let range = range::resolve(total, header)?;

    serve_range(
        state.store.as_ref(),
        &key,
        range,
        Delivery {
            content_type: model.content_type.as_deref(),
            disposition,
            chunk_size: state.config.storage.stream_chunk_size,
        },
    )
    .await
}
