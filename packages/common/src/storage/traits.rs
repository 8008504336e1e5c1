use std::pin::Pin;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::{Stream, TryStreamExt};

use super::error::StorageError;
use super::key::ObjectKey;

/// Stream of object bytes. Chunk sizes are backend-defined.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, StorageError>> + Send>>;

/// Key-addressed object storage.
///
/// Implementations hold their own connection state and are shared across
/// requests behind an `Arc`.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `data` under `key`, replacing nothing: keys are never reused.
    async fn put(&self, key: &ObjectKey, data: Bytes, content_type: &str)
    -> Result<(), StorageError>;

    /// Retrieve all bytes of an object.
    async fn get(&self, key: &ObjectKey) -> Result<Bytes, StorageError> {
        let size = self.size(key).await?;
        if size == 0 {
            return Ok(Bytes::new());
        }
        let stream = self.get_range(key, 0, size - 1).await?;
        let buf = stream
            .try_fold(BytesMut::new(), |mut buf, chunk| async move {
                buf.extend_from_slice(&chunk);
                Ok(buf)
            })
            .await?;
        Ok(buf.freeze())
    }

    /// Stream bytes `start..=end` of an object.
    ///
    /// A missing object must be reported here, before the stream is
    /// returned, so callers can still answer with a clean error status.
    async fn get_range(
        &self,
        key: &ObjectKey,
        start: u64,
        end: u64,
    ) -> Result<ByteStream, StorageError>;

    /// Delete an object.
    ///
    /// Returns `true` if the object was deleted, `false` if it did not exist
    /// (backends that cannot tell report `true`).
    async fn delete(&self, key: &ObjectKey) -> Result<bool, StorageError>;

    /// Get the size of an object in bytes.
    async fn size(&self, key: &ObjectKey) -> Result<u64, StorageError>;

    /// Location reference recorded alongside the key (URL or path).
    fn locate(&self, key: &ObjectKey) -> String;
}
