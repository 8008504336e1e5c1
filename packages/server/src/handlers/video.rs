use axum::Json;
use axum::extract::multipart::{Field, MultipartError};
use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use bytes::BytesMut;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::*;
use tracing::instrument;

use crate::entity::video;
use crate::error::{AppError, ErrorBody};
use crate::models::shared::{PageQuery, escape_like};
use crate::models::video::*;
use crate::services::coordinator::{IncomingVideo, ReplaceRequest, UploadPolicy};
use crate::state::AppState;

/// Slack above the file limit for multipart framing and text fields.
const MULTIPART_OVERHEAD: u64 = 1024 * 1024;

/// Body limit for routes that accept a video file.
pub fn video_body_limit(max_upload_size: u64) -> DefaultBodyLimit {
    let limit = max_upload_size.saturating_add(MULTIPART_OVERHEAD);
    DefaultBodyLimit::max(usize::try_from(limit).unwrap_or(usize::MAX))
}

#[utoipa::path(
    post,
    path = "/videos/upload",
    tag = "Videos",
    operation_id = "uploadVideo",
    summary = "Upload a video",
    description = "Stores the `file` multipart field and records it. Accepted formats: mp4, mov, \
        avi, webm. Files over the configured limit (100 MiB by default) are rejected before \
        anything is stored.",
    request_body(content_type = "multipart/form-data", description = "Video file in the `file` field"),
    responses(
        (status = 201, description = "Video stored", body = VideoResponse),
        (status = 400, description = "Bad upload (VALIDATION_ERROR, INVALID_FORMAT, TOO_LARGE)", body = ErrorBody),
        (status = 500, description = "Storage or database failure (INTERNAL_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, multipart))]
pub async fn upload_video(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut file: Option<IncomingVideo> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() == Some("file") {
            file = Some(read_video_field(field, state.coordinator.policy()).await?);
        }
    }

    let incoming = file.ok_or_else(|| AppError::Validation("Missing 'file' field".into()))?;
    let model = state.coordinator.upload(&state.db, incoming).await?;

    Ok((StatusCode::CREATED, Json(VideoResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/videos/",
    tag = "Videos",
    operation_id = "listVideos",
    summary = "List videos",
    description = "Returns videos newest first with offset pagination.",
    params(PageQuery),
    responses(
        (status = 200, description = "Page of videos", body = VideoListResponse),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_videos(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<VideoListResponse>, AppError> {
    let (skip, limit) = query.bounds();
    Ok(Json(
        page_videos(&state.db, video::Entity::find(), skip, limit).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/videos/search",
    tag = "Videos",
    operation_id = "searchVideos",
    summary = "Search videos by name",
    description = "Case-insensitive substring match on the display name.",
    params(VideoSearchQuery),
    responses(
        (status = 200, description = "Page of matching videos", body = VideoListResponse),
        (status = 400, description = "Empty query (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn search_videos(
    State(state): State<AppState>,
    Query(query): Query<VideoSearchQuery>,
) -> Result<Json<VideoListResponse>, AppError> {
    let term = escape_like(query.q.trim());
    if term.is_empty() {
        return Err(AppError::Validation("Search query must not be empty".into()));
    }
    let (skip, limit) = PageQuery {
        skip: query.skip,
        limit: query.limit,
    }
    .bounds();

    let select = video::Entity::find().filter(
        Expr::expr(Func::lower(Expr::col(video::Column::OriginalFilename)))
            .like(LikeExpr::new(format!("%{}%", term.to_lowercase())).escape('\\')),
    );

    Ok(Json(page_videos(&state.db, select, skip, limit).await?))
}

#[utoipa::path(
    get,
    path = "/videos/{id}",
    tag = "Videos",
    operation_id = "getVideo",
    summary = "Get video metadata",
    params(("id" = i32, Path, description = "Video ID")),
    responses(
        (status = 200, description = "Video metadata", body = VideoResponse),
        (status = 404, description = "Video not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(video_id = id))]
pub async fn get_video(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<VideoResponse>, AppError> {
    let model = find_video(&state.db, id).await?;
    Ok(Json(VideoResponse::from(model)))
}

#[utoipa::path(
    put,
    path = "/videos/{id}",
    tag = "Videos",
    operation_id = "replaceVideo",
    summary = "Replace a video's file and/or name",
    description = "Accepts an optional `file` field and an optional `display_name` field; at least \
        one is required. A new file is stored under a fresh key and the record is switched to it. \
        The previous file is removed afterwards; if that removal fails it is logged and the file \
        is left orphaned, the request still succeeds.",
    params(("id" = i32, Path, description = "Video ID")),
    request_body(content_type = "multipart/form-data", description = "Optional `file` and `display_name`"),
    responses(
        (status = 200, description = "Video updated", body = VideoResponse),
        (status = 400, description = "Bad request (VALIDATION_ERROR, INVALID_FORMAT, TOO_LARGE)", body = ErrorBody),
        (status = 404, description = "Video not found (NOT_FOUND)", body = ErrorBody),
        (status = 500, description = "Storage or database failure (INTERNAL_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, multipart), fields(video_id = id))]
pub async fn replace_video(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    mut multipart: Multipart,
) -> Result<Json<VideoResponse>, AppError> {
    let mut request = ReplaceRequest::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        match field.name() {
            Some("file") => {
                // Browsers send an empty, nameless part for an untouched file input.
                if field.file_name().is_some_and(|n| !n.is_empty()) {
                    request.file =
                        Some(read_video_field(field, state.coordinator.policy()).await?);
                }
            }
            Some("display_name") => {
                let text = field.text().await.map_err(multipart_error)?;
                request.display_name = Some(text);
            }
            _ => {}
        }
    }

    let model = state.coordinator.replace(&state.db, id, request).await?;
    Ok(Json(VideoResponse::from(model)))
}

#[utoipa::path(
    delete,
    path = "/videos/{id}",
    tag = "Videos",
    operation_id = "deleteVideo",
    summary = "Delete a video",
    description = "Removes the record with its likes and comments, then the file. File removal is \
        retried on transient failures; `file_deleted` is false if it ultimately failed.",
    params(("id" = i32, Path, description = "Video ID")),
    responses(
        (status = 200, description = "Video deleted", body = DeleteVideoResponse),
        (status = 404, description = "Video not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(video_id = id))]
pub async fn delete_video(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<DeleteVideoResponse>, AppError> {
    let report = state.coordinator.delete(&state.db, id).await?;
    let message = if report.file_deleted {
        "Video deleted"
    } else {
        "Video deleted; file removal failed"
    };
    Ok(Json(DeleteVideoResponse {
        message: message.into(),
        video_id: report.video_id,
        file_deleted: report.file_deleted,
    }))
}

pub(crate) async fn find_video<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<video::Model, AppError> {
    video::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Video not found".into()))
}

async fn page_videos<C: ConnectionTrait>(
    db: &C,
    select: Select<video::Entity>,
    skip: u64,
    limit: u64,
) -> Result<VideoListResponse, AppError> {
    let total = select.clone().count(db).await?;
    let videos = select
        .order_by_desc(video::Column::Id)
        .offset(skip)
        .limit(limit)
        .all(db)
        .await?
        .into_iter()
        .map(VideoResponse::from)
        .collect();
    Ok(VideoListResponse { total, videos })
}

/// Buffer a multipart file field, refusing bad extensions before reading and
/// oversized bodies as soon as they cross the limit.
async fn read_video_field(
    mut field: Field<'_>,
    policy: &UploadPolicy,
) -> Result<IncomingVideo, AppError> {
    let filename = field
        .file_name()
        .map(str::to_string)
        .ok_or_else(|| AppError::Validation("File field must have a filename".into()))?;
    policy.check_extension(&filename)?;
    let content_type = field.content_type().map(str::to_string);

    let mut buf = BytesMut::new();
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        policy.check_size((buf.len() + chunk.len()) as u64)?;
        buf.extend_from_slice(&chunk);
    }

    Ok(IncomingVideo {
        filename,
        content_type,
        data: buf.freeze(),
    })
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::TooLarge(format!("Upload exceeds the size limit: {}", e.body_text()))
    } else {
        AppError::Validation(format!("Multipart error: {}", e.body_text()))
    }
}
