use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use sea_orm::*;
use tracing::{info, instrument};

use crate::entity::comment;
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::extractors::viewer::Viewer;
use crate::handlers::video::find_video;
use crate::models::comment::*;
use crate::models::shared::PageQuery;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/videos/{id}/comments",
    tag = "Comments",
    operation_id = "listComments",
    summary = "List comments on a video",
    description = "Newest first with offset pagination.",
    params(("id" = i32, Path, description = "Video ID"), PageQuery),
    responses(
        (status = 200, description = "Page of comments", body = CommentListResponse),
        (status = 404, description = "Video not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query), fields(video_id = id))]
pub async fn list_comments(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<PageQuery>,
) -> Result<Json<CommentListResponse>, AppError> {
    find_video(&state.db, id).await?;
    let (skip, limit) = query.bounds();

    let select = comment::Entity::find().filter(comment::Column::VideoId.eq(id));
    let total = select.clone().count(&state.db).await?;
    let comments = select
        .order_by_desc(comment::Column::CreatedAt)
        .order_by_desc(comment::Column::Id)
        .offset(skip)
        .limit(limit)
        .all(&state.db)
        .await?
        .into_iter()
        .map(CommentResponse::from)
        .collect();

    Ok(Json(CommentListResponse { total, comments }))
}

#[utoipa::path(
    post,
    path = "/videos/{id}/comments",
    tag = "Comments",
    operation_id = "createComment",
    summary = "Comment on a video",
    params(("id" = i32, Path, description = "Video ID")),
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment created", body = CommentResponse),
        (status = 400, description = "Empty or oversized content (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Video not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, viewer, payload), fields(video_id = id))]
pub async fn create_comment(
    viewer: Viewer,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<CreateCommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let content = validate_content(&payload.content)?;
    find_video(&state.db, id).await?;

    let now = Utc::now();
    let row = comment::ActiveModel {
        video_id: Set(id),
        user_identifier: Set(viewer.0),
        content: Set(content),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let model = row.insert(&state.db).await?;
    info!(comment_id = model.id, "Comment created");

    Ok((StatusCode::CREATED, Json(CommentResponse::from(model))))
}

#[utoipa::path(
    patch,
    path = "/videos/{id}/comments/{comment_id}",
    tag = "Comments",
    operation_id = "updateComment",
    summary = "Edit a comment",
    params(
        ("id" = i32, Path, description = "Video ID"),
        ("comment_id" = i32, Path, description = "Comment ID"),
    ),
    request_body = UpdateCommentRequest,
    responses(
        (status = 200, description = "Comment updated", body = CommentResponse),
        (status = 400, description = "Empty or oversized content (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Video or comment not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(video_id = id, comment_id))]
pub async fn update_comment(
    State(state): State<AppState>,
    Path((id, comment_id)): Path<(i32, i32)>,
    AppJson(payload): AppJson<UpdateCommentRequest>,
) -> Result<Json<CommentResponse>, AppError> {
    let content = payload
        .content
        .as_deref()
        .map(validate_content)
        .transpose()?;
    find_video(&state.db, id).await?;
    let existing = find_comment(&state.db, id, comment_id).await?;

    let Some(content) = content else {
        return Ok(Json(CommentResponse::from(existing)));
    };

    let mut active: comment::ActiveModel = existing.into();
    active.content = Set(content);
    active.updated_at = Set(Utc::now());
    let model = active.update(&state.db).await?;

    Ok(Json(CommentResponse::from(model)))
}

#[utoipa::path(
    delete,
    path = "/videos/{id}/comments/{comment_id}",
    tag = "Comments",
    operation_id = "deleteComment",
    summary = "Delete a comment",
    params(
        ("id" = i32, Path, description = "Video ID"),
        ("comment_id" = i32, Path, description = "Comment ID"),
    ),
    responses(
        (status = 200, description = "Comment deleted", body = DeleteCommentResponse),
        (status = 404, description = "Video or comment not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(video_id = id, comment_id))]
pub async fn delete_comment(
    State(state): State<AppState>,
    Path((id, comment_id)): Path<(i32, i32)>,
) -> Result<Json<DeleteCommentResponse>, AppError> {
    find_video(&state.db, id).await?;
    let existing = find_comment(&state.db, id, comment_id).await?;

    comment::Entity::delete_by_id(existing.id)
        .exec(&state.db)
        .await?;

    Ok(Json(DeleteCommentResponse {
        success: true,
        message: "Comment deleted".into(),
        comment_id,
    }))
}

/// Find a comment that belongs to the given video.
async fn find_comment<C: ConnectionTrait>(
    db: &C,
    video_id: i32,
    comment_id: i32,
) -> Result<comment::Model, AppError> {
    comment::Entity::find_by_id(comment_id)
        .filter(comment::Column::VideoId.eq(video_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Comment not found".into()))
}
