mod error;
mod key;
mod traits;

pub mod filesystem;
#[cfg(feature = "object-storage")]
pub mod s3_store;

use std::sync::Arc;

pub use error::StorageError;
pub use key::ObjectKey;
pub use traits::{ByteStream, ObjectStore};

use crate::config::{StorageAppConfig, StorageBackend};

/// Build the configured object store.
pub async fn connect(config: &StorageAppConfig) -> Result<Arc<dyn ObjectStore>, StorageError> {
    match config.backend {
        StorageBackend::Filesystem => {
            let store = filesystem::FilesystemObjectStore::new(config.filesystem.root.clone()).await?;
            Ok(Arc::new(store))
        }
        #[cfg(feature = "object-storage")]
        StorageBackend::S3 => Ok(Arc::new(s3_store::S3ObjectStore::new(&config.s3)?)),
        #[cfg(not(feature = "object-storage"))]
        StorageBackend::S3 => Err(StorageError::Backend(
            "built without the object-storage feature".into(),
        )),
    }
}
