//! Keeps the object store and the metadata store in step.
//!
//! Every write follows the same order: validate, write the new object, commit
//! metadata. When the commit fails the freshly written object is deleted
//! again, so a failed request leaves no trace in either store. Old objects are
//! only removed after the metadata that referenced them is gone.

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use common::retry::{RetryPolicy, retry_transient};
use common::storage::{ObjectKey, ObjectStore, StorageError};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QuerySelect,
    Set, TransactionSession, TransactionTrait,
};
use thiserror::Error;
use tracing::{error, info, instrument, warn};

use crate::entity::{comment, like, video};

/// Accepted container formats, matched case-insensitively on the file extension.
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["mp4", "mov", "avi", "webm"];

/// Longest accepted display name, in characters.
pub const MAX_DISPLAY_NAME_LEN: usize = 500;

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("unsupported file format {0:?}; allowed: mp4, mov, avi, webm")]
    InvalidFormat(String),
    #[error("file exceeds the {limit}-byte limit ({size} bytes received)")]
    TooLarge { size: u64, limit: u64 },
    #[error("{0}")]
    Validation(String),
    #[error("video {0} not found")]
    NotFound(i32),
    #[error("failed to write object: {0}")]
    StorageWriteFailed(#[source] StorageError),
    #[error("failed to commit video metadata (object compensated: {compensated}): {source}")]
    MetadataCommitFailed {
        #[source]
        source: DbErr,
        compensated: bool,
    },
    #[error("metadata store error: {0}")]
    Metadata(#[from] DbErr),
}

/// Upload acceptance rules.
#[derive(Debug, Clone, Copy)]
pub struct UploadPolicy {
    pub max_size: u64,
}

impl UploadPolicy {
    /// Return the lowercased extension of `filename` if it is accepted.
    pub fn check_extension(&self, filename: &str) -> Result<String, TransferError> {
        let ext = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        if ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
            Ok(ext)
        } else {
            Err(TransferError::InvalidFormat(filename.to_string()))
        }
    }

    pub fn check_size(&self, size: u64) -> Result<(), TransferError> {
        if size > self.max_size {
            return Err(TransferError::TooLarge {
                size,
                limit: self.max_size,
            });
        }
        Ok(())
    }
}

/// A fully buffered uploaded file.
#[derive(Debug, Clone)]
pub struct IncomingVideo {
    /// Client-supplied filename.
    pub filename: String,
    /// Client-declared content type, if any.
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl IncomingVideo {
    /// Content type to record: a declared `video/*` type, else a guess from
    /// the filename.
    pub fn resolved_content_type(&self) -> String {
        match self.content_type.as_deref() {
            Some(declared) if declared.starts_with("video/") => declared.to_string(),
            _ => mime_guess::from_path(&self.filename)
                .first()
                .map(|m| m.to_string())
                .unwrap_or_else(|| "application/octet-stream".to_string()),
        }
    }
}

/// What a replace request asks to change.
#[derive(Debug, Clone, Default)]
pub struct ReplaceRequest {
    pub file: Option<IncomingVideo>,
    pub display_name: Option<String>,
}

/// Outcome of a delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteReport {
    pub video_id: i32,
    /// Whether the object is confirmed gone from the store.
    pub file_deleted: bool,
    /// Object delete attempts made.
    pub attempts: usize,
}

/// Coordinates object writes with metadata commits.
#[derive(Clone)]
pub struct VideoCoordinator {
    store: Arc<dyn ObjectStore>,
    policy: UploadPolicy,
    retry: RetryPolicy,
}

impl VideoCoordinator {
    pub fn new(store: Arc<dyn ObjectStore>, policy: UploadPolicy, retry: RetryPolicy) -> Self {
        Self {
            store,
            policy,
            retry,
        }
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    /// Store a new video and record it.
    #[instrument(skip_all, fields(filename = %incoming.filename, size = incoming.data.len()))]
    pub async fn upload<C: ConnectionTrait>(
        &self,
        db: &C,
        incoming: IncomingVideo,
    ) -> Result<video::Model, TransferError> {
        let ext = self.policy.check_extension(&incoming.filename)?;
        let size = incoming.data.len() as u64;
        self.policy.check_size(size)?;

        let content_type = incoming.resolved_content_type();
        let key = ObjectKey::generate(&ext);
        self.write_object(&key, incoming.data, &content_type).await?;

        let now = Utc::now();
        let row = video::ActiveModel {
            storage_key: Set(key.to_string()),
            original_filename: Set(incoming.filename),
            location: Set(self.store.locate(&key)),
            file_size: Set(i64::try_from(size).unwrap_or(i64::MAX)),
            content_type: Set(Some(content_type)),
            uploaded_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        match row.insert(db).await {
            Ok(model) => {
                info!(video_id = model.id, key = %key, "Video uploaded");
                Ok(model)
            }
            Err(source) => {
                error!(key = %key, error = %source, "Metadata commit failed after upload");
                let compensated = self.compensate(&key).await;
                Err(TransferError::MetadataCommitFailed {
                    source,
                    compensated,
                })
            }
        }
    }

    /// Swap a video's file, rename it, or both.
    ///
    /// The row is locked while the new key is committed, and the key it held
    /// under that lock is the one removed afterwards. Failure to remove it is
    /// logged and does not fail the request.
    #[instrument(skip_all, fields(video_id = id))]
    pub async fn replace<C>(
        &self,
        db: &C,
        id: i32,
        request: ReplaceRequest,
    ) -> Result<video::Model, TransferError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let display_name = normalize_display_name(request.display_name)?;

        let Some(incoming) = request.file else {
            let name = display_name.ok_or_else(|| {
                TransferError::Validation("Provide a file, a display_name, or both".into())
            })?;
            return self.rename(db, id, name).await;
        };

        let ext = self.policy.check_extension(&incoming.filename)?;
        let size = incoming.data.len() as u64;
        self.policy.check_size(size)?;

        // Refuse unknown ids before anything is written.
        find_video(db, id).await?;

        let content_type = incoming.resolved_content_type();
        let key = ObjectKey::generate(&ext);
        self.write_object(&key, incoming.data, &content_type).await?;

        let now = Utc::now();
        let original_filename = display_name.unwrap_or(incoming.filename);
        let location = self.store.locate(&key);
        let file_size = i64::try_from(size).unwrap_or(i64::MAX);
        let changes = video::ActiveModel {
            storage_key: Set(key.to_string()),
            original_filename: Set(original_filename.clone()),
            location: Set(location.clone()),
            file_size: Set(file_size),
            content_type: Set(Some(content_type.clone())),
            updated_at: Set(now),
            ..Default::default()
        };

        let locked = match swap_locked(db, id, changes).await {
            Ok(Some(locked)) => locked,
            Ok(None) => {
                warn!(key = %key, "Video vanished during replace");
                self.compensate(&key).await;
                return Err(TransferError::NotFound(id));
            }
            Err(source) => {
                error!(key = %key, error = %source, "Metadata commit failed after replace upload");
                let compensated = self.compensate(&key).await;
                return Err(TransferError::MetadataCommitFailed {
                    source,
                    compensated,
                });
            }
        };

        info!(old_key = %locked.storage_key, new_key = %key, "Video file replaced");
        self.remove_replaced(&locked.storage_key).await;

        Ok(video::Model {
            storage_key: key.to_string(),
            original_filename,
            location,
            file_size,
            content_type: Some(content_type),
            updated_at: now,
            ..locked
        })
    }

    /// Delete a video with its likes and comments, then its object.
    ///
    /// Metadata removal is atomic. The object delete runs afterwards with
    /// retries; giving up is reported in the result, not as an error.
    #[instrument(skip_all, fields(video_id = id))]
    pub async fn delete<C>(&self, db: &C, id: i32) -> Result<DeleteReport, TransferError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let txn = db.begin().await?;

        let existing = video::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(TransferError::NotFound(id))?;

        like::Entity::delete_many()
            .filter(like::Column::VideoId.eq(id))
            .exec(&txn)
            .await?;
        comment::Entity::delete_many()
            .filter(comment::Column::VideoId.eq(id))
            .exec(&txn)
            .await?;
        video::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        info!(key = %existing.storage_key, "Video metadata deleted");

        let (file_deleted, attempts) = match ObjectKey::parse(&existing.storage_key) {
            Ok(key) => self.delete_object(&key).await,
            Err(e) => {
                error!(key = %existing.storage_key, error = %e, "Stored key is invalid; object left in place");
                (false, 0)
            }
        };

        Ok(DeleteReport {
            video_id: id,
            file_deleted,
            attempts,
        })
    }

    async fn rename<C: ConnectionTrait>(
        &self,
        db: &C,
        id: i32,
        name: String,
    ) -> Result<video::Model, TransferError> {
        let existing = find_video(db, id).await?;

        let now = Utc::now();
        let changes = video::ActiveModel {
            original_filename: Set(name.clone()),
            updated_at: Set(now),
            ..Default::default()
        };
        let res = video::Entity::update_many()
            .set(changes)
            .filter(video::Column::Id.eq(id))
            .exec(db)
            .await?;
        if res.rows_affected == 0 {
            return Err(TransferError::NotFound(id));
        }

        info!("Video renamed");
        Ok(video::Model {
            original_filename: name,
            updated_at: now,
            ..existing
        })
    }

    async fn write_object(
        &self,
        key: &ObjectKey,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), TransferError> {
        self.store
            .put(key, data, content_type)
            .await
            .map_err(|e| {
                error!(key = %key, error = %e, "Object write failed");
                TransferError::StorageWriteFailed(e)
            })
    }

    /// Delete an object with retries. Returns whether it is gone and how
    /// many attempts were made.
    async fn delete_object(&self, key: &ObjectKey) -> (bool, usize) {
        let store = &self.store;
        let outcome = retry_transient(&self.retry, move || async move { store.delete(key).await }).await;
        let attempts = outcome.attempts();
        let failures = outcome.failures();
        match outcome.result {
            Ok(existed) => {
                if !existed {
                    warn!(key = %key, "Object was already absent");
                }
                if !failures.is_empty() {
                    warn!(key = %key, attempts, ?failures, "Object deleted after retries");
                }
                (true, attempts)
            }
            Err(e) => {
                error!(key = %key, attempts, ?failures, error = %e, "Object delete failed; object orphaned");
                (false, attempts)
            }
        }
    }

    /// Undo an object write whose metadata never committed.
    async fn compensate(&self, key: &ObjectKey) -> bool {
        let (removed, attempts) = self.delete_object(key).await;
        if removed {
            warn!(key = %key, attempts, "Compensating delete removed uncommitted object");
        }
        removed
    }

    async fn remove_replaced(&self, old_key: &str) {
        match ObjectKey::parse(old_key) {
            Ok(key) => {
                let (removed, _) = self.delete_object(&key).await;
                if !removed {
                    warn!(key = %key, "Replaced object left behind");
                }
            }
            Err(e) => warn!(key = %old_key, error = %e, "Replaced object key is invalid"),
        }
    }
}

/// Trim a display name; blank means absent.
fn normalize_display_name(name: Option<String>) -> Result<Option<String>, TransferError> {
    let Some(name) = name else {
        return Ok(None);
    };
    let name = name.trim();
    if name.is_empty() {
        return Ok(None);
    }
    if name.chars().count() > MAX_DISPLAY_NAME_LEN {
        return Err(TransferError::Validation(format!(
            "display_name must be at most {MAX_DISPLAY_NAME_LEN} characters"
        )));
    }
    Ok(Some(name.to_string()))
}

/// Apply `changes` while holding the row lock. Returns the row as it was
/// under the lock, or `None` if it is gone.
async fn swap_locked<C>(
    db: &C,
    id: i32,
    changes: video::ActiveModel,
) -> Result<Option<video::Model>, DbErr>
where
    C: ConnectionTrait + TransactionTrait,
{
    let txn = db.begin().await?;

    let Some(locked) = video::Entity::find_by_id(id)
        .lock_exclusive()
        .one(&txn)
        .await?
    else {
        return Ok(None);
    };

    video::Entity::update_many()
        .set(changes)
        .filter(video::Column::Id.eq(id))
        .exec(&txn)
        .await?;
    txn.commit().await?;

    Ok(Some(locked))
}

async fn find_video<C: ConnectionTrait>(db: &C, id: i32) -> Result<video::Model, TransferError> {
    video::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(TransferError::NotFound(id))
}
