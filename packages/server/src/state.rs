use std::sync::Arc;

use common::retry::RetryPolicy;
use common::storage::ObjectStore;
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::services::coordinator::{UploadPolicy, VideoCoordinator};

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub store: Arc<dyn ObjectStore>,
    pub coordinator: VideoCoordinator,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(db: DatabaseConnection, store: Arc<dyn ObjectStore>, config: AppConfig) -> Self {
        let storage = &config.storage;
        let coordinator = VideoCoordinator::new(
            store.clone(),
            UploadPolicy {
                max_size: storage.max_upload_size,
            },
            RetryPolicy {
                max_retries: storage.delete_retries,
                base_ms: storage.retry_base_ms,
                max_ms: storage.retry_max_ms,
            },
        );
        Self {
            db,
            store,
            coordinator,
            config,
        }
    }
}
