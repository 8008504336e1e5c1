use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::config::AppConfig;
use crate::handlers::{comment, like, stream, video};
use crate::state::AppState;

pub fn api_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    video_routes(config)
        .merge(stream_routes())
        .merge(social_routes())
}

/// Routes that accept video files; their body limit follows the upload limit.
fn video_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(video::upload_video))
        .routes(routes!(video::list_videos))
        .routes(routes!(video::search_videos))
        .routes(routes!(
            video::get_video,
            video::replace_video,
            video::delete_video
        ))
        .layer(video::video_body_limit(config.storage.max_upload_size))
}

fn stream_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(stream::stream_video))
        .routes(routes!(stream::download_video))
}

fn social_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            like::toggle_like,
            like::like_status,
            like::unlike_video
        ))
        .routes(routes!(comment::list_comments, comment::create_comment))
        .routes(routes!(comment::update_comment, comment::delete_comment))
}
