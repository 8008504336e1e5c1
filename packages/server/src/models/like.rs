use serde::Serialize;

/// Like state of a video for the calling viewer.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct LikeStatus {
    pub video_id: i32,
    #[schema(example = 12)]
    pub like_count: u64,
    /// Whether the calling viewer likes the video.
    pub is_liked: bool,
}
