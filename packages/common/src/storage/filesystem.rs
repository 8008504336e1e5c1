use std::io::SeekFrom;
use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;
use futures::TryStreamExt;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio_util::io::ReaderStream;

use super::error::StorageError;
use super::key::ObjectKey;
use super::traits::{ByteStream, ObjectStore};

const READ_BUFFER: usize = 64 * 1024;

/// Filesystem-backed object store.
///
/// Objects are stored in a sharded directory layout:
/// `{base_path}/{first 2 key chars}/{key}`
pub struct FilesystemObjectStore {
    base_path: PathBuf,
}

impl FilesystemObjectStore {
    /// Create a new filesystem object store, creating its directories.
    pub async fn new(base_path: PathBuf) -> Result<Self, StorageError> {
        fs::create_dir_all(&base_path).await?;
        fs::create_dir_all(base_path.join(".tmp")).await?;
        Ok(Self { base_path })
    }

    fn object_path(&self, key: &ObjectKey) -> PathBuf {
        self.base_path.join(key.shard_prefix()).join(key.as_str())
    }

    /// Path for a temporary file during writes.
    fn temp_path(&self) -> PathBuf {
        self.base_path
            .join(".tmp")
            .join(uuid::Uuid::new_v4().to_string())
    }
}

fn not_found_as(key: &ObjectKey, err: std::io::Error) -> StorageError {
    if err.kind() == std::io::ErrorKind::NotFound {
        StorageError::NotFound(key.to_string())
    } else {
        err.into()
    }
}

#[async_trait]
impl ObjectStore for FilesystemObjectStore {
    async fn put(
        &self,
        key: &ObjectKey,
        data: Bytes,
        _content_type: &str,
    ) -> Result<(), StorageError> {
        let object_path = self.object_path(key);
        let temp_path = self.temp_path();

        let written = async {
            let mut file = fs::File::create(&temp_path).await?;
            file.write_all(&data).await?;
            file.sync_all().await?;
            Ok::<_, std::io::Error>(())
        }
        .await;
        if let Err(e) = written {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        if let Some(parent) = object_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        if let Err(e) = fs::rename(&temp_path, &object_path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        Ok(())
    }

    async fn get_range(
        &self,
        key: &ObjectKey,
        start: u64,
        end: u64,
    ) -> Result<ByteStream, StorageError> {
        let mut file = fs::File::open(self.object_path(key))
            .await
            .map_err(|e| not_found_as(key, e))?;
        file.seek(SeekFrom::Start(start)).await?;

        let len = end.saturating_sub(start) + 1;
        let reader = file.take(len);
        let stream = ReaderStream::with_capacity(reader, READ_BUFFER).map_err(StorageError::from);
        Ok(Box::pin(stream))
    }

    async fn delete(&self, key: &ObjectKey) -> Result<bool, StorageError> {
        match fs::remove_file(self.object_path(key)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn size(&self, key: &ObjectKey) -> Result<u64, StorageError> {
        fs::metadata(self.object_path(key))
            .await
            .map(|meta| meta.len())
            .map_err(|e| not_found_as(key, e))
    }

    fn locate(&self, key: &ObjectKey) -> String {
        self.object_path(key).display().to_string()
    }
}
