use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use ::s3::creds::Credentials;
use ::s3::error::S3Error;
use ::s3::{Bucket, Region};
use tracing::debug;

use super::error::StorageError;
use super::key::ObjectKey;
use super::traits::{ByteStream, ObjectStore};
use crate::config::S3Config;

/// S3-compatible object store.
///
/// Range reads are issued as a sequence of bounded `GET` requests so a single
/// stream never holds more than one segment in memory. Dropping the stream
/// abandons the in-flight request.
pub struct S3ObjectStore {
    bucket: Arc<Bucket>,
    public_base: String,
    segment_size: u64,
}

impl S3ObjectStore {
    pub fn new(config: &S3Config) -> Result<Self, StorageError> {
        let region = match &config.endpoint {
            Some(endpoint) => Region::Custom {
                region: config.region.clone(),
                endpoint: endpoint.clone(),
            },
            None => config.region.parse::<Region>().map_err(|e| {
                StorageError::Backend(format!("invalid region {}: {e}", config.region))
            })?,
        };

        // Without explicit keys, fall back to the AWS env/profile chain.
        let credentials = match (&config.access_key, &config.secret_key) {
            (Some(access), Some(secret)) => {
                Credentials::new(Some(access.as_str()), Some(secret.as_str()), None, None, None)
            }
            _ => Credentials::default(),
        }
        .map_err(|e| StorageError::Backend(format!("invalid S3 credentials: {e}")))?;

        let mut bucket = Bucket::new(&config.bucket, region, credentials).map_err(from_s3)?;
        if config.path_style {
            bucket = bucket.with_path_style();
        }

        let public_base = config.public_url.clone().unwrap_or_else(|| {
            format!("https://{}.s3.{}.amazonaws.com", config.bucket, config.region)
        });

        Ok(Self {
            bucket: Arc::from(bucket),
            public_base: public_base.trim_end_matches('/').to_string(),
            segment_size: config.segment_size.max(1),
        })
    }
}

/// Map an HTTP status from S3 onto the storage error taxonomy.
fn check_status(key: &str, status: u16) -> Result<(), StorageError> {
    match status {
        200..=299 => Ok(()),
        404 => Err(StorageError::NotFound(key.to_string())),
        429 | 500 | 502 | 503 | 504 => Err(StorageError::Busy(format!(
            "S3 returned {status} for {key}"
        ))),
        _ => Err(StorageError::Backend(format!(
            "S3 returned {status} for {key}"
        ))),
    }
}

fn from_s3(err: S3Error) -> StorageError {
    match err {
        S3Error::HttpFailWithBody(status, body) => {
            debug!(status, %body, "S3 request failed");
            check_status("object", status)
                .err()
                .unwrap_or_else(|| StorageError::Backend(format!("S3 returned {status}")))
        }
        other => StorageError::Backend(other.to_string()),
    }
}

async fn fetch_segment(
    bucket: &Bucket,
    path: &str,
    start: u64,
    end: u64,
) -> Result<Bytes, StorageError> {
    let response = bucket
        .get_object_range(path, start, Some(end))
        .await
        .map_err(from_s3)?;
    check_status(path, response.status_code())?;
    Ok(Bytes::copy_from_slice(response.as_slice()))
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(
        &self,
        key: &ObjectKey,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let response = self
            .bucket
            .put_object_with_content_type(key.as_str(), &data, content_type)
            .await
            .map_err(from_s3)?;
        check_status(key.as_str(), response.status_code())
    }

    async fn get_range(
        &self,
        key: &ObjectKey,
        start: u64,
        end: u64,
    ) -> Result<ByteStream, StorageError> {
        let segment = self.segment_size;
        let first_end = end.min(start.saturating_add(segment - 1));
        // The first segment is fetched eagerly so a missing key is reported
        // before any response headers go out.
        let first = fetch_segment(&self.bucket, key.as_str(), start, first_end).await?;

        let bucket = Arc::clone(&self.bucket);
        let path = key.as_str().to_string();
        let stream = futures::stream::try_unfold(
            (Some(first), first_end + 1),
            move |(pending, next)| {
                let bucket = Arc::clone(&bucket);
                let path = path.clone();
                async move {
                    if let Some(bytes) = pending {
                        return Ok(Some((bytes, (None, next))));
                    }
                    if next > end {
                        return Ok(None);
                    }
                    let seg_end = end.min(next.saturating_add(segment - 1));
                    let bytes = fetch_segment(&bucket, &path, next, seg_end).await?;
                    if bytes.is_empty() {
                        return Ok(None);
                    }
                    Ok(Some((bytes, (None, seg_end + 1))))
                }
            },
        );
        Ok(Box::pin(stream))
    }

    async fn delete(&self, key: &ObjectKey) -> Result<bool, StorageError> {
        let response = self
            .bucket
            .delete_object(key.as_str())
            .await
            .map_err(from_s3)?;
        match check_status(key.as_str(), response.status_code()) {
            Ok(()) => Ok(true),
            Err(StorageError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn size(&self, key: &ObjectKey) -> Result<u64, StorageError> {
        let (head, status) = self
            .bucket
            .head_object(key.as_str())
            .await
            .map_err(from_s3)?;
        check_status(key.as_str(), status)?;
        head.content_length
            .and_then(|len| u64::try_from(len).ok())
            .ok_or_else(|| StorageError::Backend(format!("no content length for {key}")))
    }

    fn locate(&self, key: &ObjectKey) -> String {
        format!("{}/{}", self.public_base, key)
    }
}
