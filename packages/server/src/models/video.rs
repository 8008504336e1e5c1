use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::video;

/// Response DTO for a single video.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct VideoResponse {
    #[schema(example = 42)]
    pub id: i32,
    /// Storage key of the video file.
    #[schema(example = "5f0c8a1e-3b2d-4c6f-9a7e-1d2c3b4a5f6e.mp4")]
    pub filename: String,
    /// Display name.
    #[schema(example = "beach.mp4")]
    pub original_filename: String,
    /// URL or path of the stored object.
    pub file_path: String,
    /// Size in bytes.
    #[schema(example = 1048576)]
    pub file_size: i64,
    #[schema(example = "video/mp4")]
    pub content_type: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<video::Model> for VideoResponse {
    fn from(model: video::Model) -> Self {
        Self {
            id: model.id,
            filename: model.storage_key,
            original_filename: model.original_filename,
            file_path: model.location,
            file_size: model.file_size,
            content_type: model.content_type,
            uploaded_at: model.uploaded_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct VideoListResponse {
    /// Total number of matching videos across all pages.
    #[schema(example = 57)]
    pub total: u64,
    pub videos: Vec<VideoResponse>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct VideoSearchQuery {
    /// Case-insensitive substring of the display name.
    pub q: String,
    pub skip: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct DeleteVideoResponse {
    #[schema(example = "Video deleted")]
    pub message: String,
    pub video_id: i32,
    /// False when the file could not be removed and is left orphaned.
    pub file_deleted: bool,
}
