use std::path::PathBuf;

use serde::Deserialize;

/// Which object store backs the service.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    S3,
    Filesystem,
}

/// S3-compatible backend settings.
#[derive(Debug, Deserialize, Clone)]
pub struct S3Config {
    /// Bucket name. Default: "shorts-videos".
    #[serde(default = "default_s3_bucket")]
    pub bucket: String,
    /// Region name. Default: "us-east-1".
    #[serde(default = "default_s3_region")]
    pub region: String,
    /// Custom endpoint for MinIO and friends.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Access key. Falls back to the AWS credential chain when unset.
    #[serde(default)]
    pub access_key: Option<String>,
    #[serde(default)]
    pub secret_key: Option<String>,
    /// Use path-style addressing. Default: false.
    #[serde(default)]
    pub path_style: bool,
    /// Base URL recorded as the object location. Defaults to the AWS virtual-host URL.
    #[serde(default)]
    pub public_url: Option<String>,
    /// Bytes fetched per ranged GET while streaming. Default: 1 MiB.
    #[serde(default = "default_s3_segment_size")]
    pub segment_size: u64,
}

fn default_s3_bucket() -> String {
    "shorts-videos".into()
}
fn default_s3_region() -> String {
    "us-east-1".into()
}
fn default_s3_segment_size() -> u64 {
    1024 * 1024
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            bucket: default_s3_bucket(),
            region: default_s3_region(),
            endpoint: None,
            access_key: None,
            secret_key: None,
            path_style: false,
            public_url: None,
            segment_size: default_s3_segment_size(),
        }
    }
}

/// Local filesystem backend settings.
#[derive(Debug, Deserialize, Clone)]
pub struct FilesystemConfig {
    /// Root directory. Default: "uploads/videos".
    #[serde(default = "default_fs_root")]
    pub root: PathBuf,
}

fn default_fs_root() -> PathBuf {
    PathBuf::from("uploads/videos")
}

impl Default for FilesystemConfig {
    fn default() -> Self {
        Self {
            root: default_fs_root(),
        }
    }
}

/// App-level object storage configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageAppConfig {
    /// Default: s3.
    #[serde(default = "default_backend")]
    pub backend: StorageBackend,
    /// Largest accepted upload in bytes. Default: 100 MiB.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: u64,
    /// Largest body chunk written per poll when streaming. Default: 64 KiB.
    #[serde(default = "default_stream_chunk_size")]
    pub stream_chunk_size: usize,
    /// Retries for transient object deletion failures. Default: 3.
    #[serde(default = "default_delete_retries")]
    pub delete_retries: u8,
    /// Base delay for deletion retry backoff. Default: 100 ms.
    #[serde(default = "default_retry_base_ms")]
    pub retry_base_ms: u64,
    /// Backoff cap. Default: 1000 ms.
    #[serde(default = "default_retry_max_ms")]
    pub retry_max_ms: u64,
    #[serde(default)]
    pub s3: S3Config,
    #[serde(default)]
    pub filesystem: FilesystemConfig,
}

fn default_backend() -> StorageBackend {
    StorageBackend::S3
}
fn default_max_upload_size() -> u64 {
    100 * 1024 * 1024
}
fn default_stream_chunk_size() -> usize {
    64 * 1024
}
fn default_delete_retries() -> u8 {
    3
}
fn default_retry_base_ms() -> u64 {
    100
}
fn default_retry_max_ms() -> u64 {
    1000
}

impl Default for StorageAppConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            max_upload_size: default_max_upload_size(),
            stream_chunk_size: default_stream_chunk_size(),
            delete_retries: default_delete_retries(),
            retry_base_ms: default_retry_base_ms(),
            retry_max_ms: default_retry_max_ms(),
            s3: S3Config::default(),
            filesystem: FilesystemConfig::default(),
        }
    }
}
