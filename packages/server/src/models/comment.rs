use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::comment;
use crate::error::AppError;

pub const MAX_COMMENT_LEN: usize = 1000;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateCommentRequest {
    /// Comment text, 1-1000 characters after trimming.
    #[schema(example = "Great shot!")]
    pub content: String,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateCommentRequest {
    /// Replacement text. Omit to leave the comment unchanged.
    pub content: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CommentResponse {
    pub id: i32,
    pub video_id: i32,
    /// Identity of the author.
    #[schema(example = "203.0.113.7")]
    pub user_identifier: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<comment::Model> for CommentResponse {
    fn from(model: comment::Model) -> Self {
        Self {
            id: model.id,
            video_id: model.video_id,
            user_identifier: model.user_identifier,
            content: model.content,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CommentListResponse {
    pub total: u64,
    pub comments: Vec<CommentResponse>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct DeleteCommentResponse {
    pub success: bool,
    #[schema(example = "Comment deleted")]
    pub message: String,
    pub comment_id: i32,
}

/// Trim and validate comment text (1-1000 characters).
pub fn validate_content(content: &str) -> Result<String, AppError> {
    let content = content.trim();
    if content.is_empty() || content.chars().count() > MAX_COMMENT_LEN {
        return Err(AppError::Validation(format!(
            "Comment content must be 1-{MAX_COMMENT_LEN} characters"
        )));
    }
    Ok(content.to_string())
}
