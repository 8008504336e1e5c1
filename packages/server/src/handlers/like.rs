use axum::Json;
use axum::extract::{Path, State};
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use tracing::{info, instrument};

use crate::entity::like;
use crate::error::{AppError, ErrorBody};
use crate::extractors::viewer::Viewer;
use crate::handlers::video::find_video;
use crate::models::like::LikeStatus;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/videos/{id}/like",
    tag = "Likes",
    operation_id = "toggleLike",
    summary = "Toggle the caller's like",
    description = "Likes the video if the caller has not liked it yet, otherwise removes the like.",
    params(("id" = i32, Path, description = "Video ID")),
    responses(
        (status = 200, description = "Resulting like state", body = LikeStatus),
        (status = 404, description = "Video not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, viewer), fields(video_id = id, viewer = %viewer.as_str()))]
pub async fn toggle_like(
    viewer: Viewer,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<LikeStatus>, AppError> {
    find_video(&state.db, id).await?;

    let existing = find_like(&state.db, id, viewer.as_str()).await?;
    let is_liked = match existing {
        Some(row) => {
            like::Entity::delete_by_id(row.id).exec(&state.db).await?;
            false
        }
        None => {
            let row = like::ActiveModel {
                video_id: Set(id),
                user_identifier: Set(viewer.as_str().to_string()),
                created_at: Set(Utc::now()),
                ..Default::default()
            };
            // A concurrent toggle may have inserted the same pair already.
            like::Entity::insert(row)
                .on_conflict(
                    OnConflict::columns([like::Column::VideoId, like::Column::UserIdentifier])
                        .do_nothing()
                        .to_owned(),
                )
                .exec_without_returning(&state.db)
                .await?;
            true
        }
    };

    let like_count = count_likes(&state.db, id).await?;
    info!(is_liked, like_count, "Like toggled");

    Ok(Json(LikeStatus {
        video_id: id,
        like_count,
        is_liked,
    }))
}

#[utoipa::path(
    get,
    path = "/videos/{id}/like",
    tag = "Likes",
    operation_id = "getLikeStatus",
    summary = "Get like count and the caller's like state",
    params(("id" = i32, Path, description = "Video ID")),
    responses(
        (status = 200, description = "Like state", body = LikeStatus),
        (status = 404, description = "Video not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(video_id = id))]
pub async fn like_status(
    viewer: Viewer,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<LikeStatus>, AppError> {
    find_video(&state.db, id).await?;

    let is_liked = find_like(&state.db, id, viewer.as_str()).await?.is_some();
    let like_count = count_likes(&state.db, id).await?;

    Ok(Json(LikeStatus {
        video_id: id,
        like_count,
        is_liked,
    }))
}

#[utoipa::path(
    delete,
    path = "/videos/{id}/like",
    tag = "Likes",
    operation_id = "unlikeVideo",
    summary = "Remove the caller's like",
    params(("id" = i32, Path, description = "Video ID")),
    responses(
        (status = 200, description = "Like removed", body = LikeStatus),
        (status = 404, description = "Video not found or not liked (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(video_id = id))]
pub async fn unlike_video(
    viewer: Viewer,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<LikeStatus>, AppError> {
    find_video(&state.db, id).await?;

    let res = like::Entity::delete_many()
        .filter(like::Column::VideoId.eq(id))
        .filter(like::Column::UserIdentifier.eq(viewer.as_str()))
        .exec(&state.db)
        .await?;
    if res.rows_affected == 0 {
        return Err(AppError::NotFound("Video is not liked".into()));
    }

    let like_count = count_likes(&state.db, id).await?;
    Ok(Json(LikeStatus {
        video_id: id,
        like_count,
        is_liked: false,
    }))
}

async fn find_like<C: ConnectionTrait>(
    db: &C,
    video_id: i32,
    user: &str,
) -> Result<Option<like::Model>, DbErr> {
    like::Entity::find()
        .filter(like::Column::VideoId.eq(video_id))
        .filter(like::Column::UserIdentifier.eq(user))
        .one(db)
        .await
}

async fn count_likes<C: ConnectionTrait>(db: &C, video_id: i32) -> Result<u64, DbErr> {
    like::Entity::find()
        .filter(like::Column::VideoId.eq(video_id))
        .count(db)
        .await
}
