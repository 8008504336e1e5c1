use std::io;

use axum::body::Body;
use axum::http::{StatusCode, header};
use axum::response::Response;
use bytes::Bytes;
use common::storage::{ByteStream, ObjectKey, ObjectStore};
use futures::{Stream, StreamExt};
use tracing::warn;

use crate::error::AppError;
use crate::services::range::ResolvedRange;

/// Fallback when a record carries no content type.
pub const DEFAULT_VIDEO_TYPE: &str = "video/mp4";

/// Presentation headers for a byte-serving response.
#[derive(Debug, Clone)]
pub struct Delivery<'a> {
    pub content_type: Option<&'a str>,
    /// Full `Content-Disposition` value, if any.
    pub disposition: Option<String>,
    /// Largest body chunk handed to the connection at once.
    pub chunk_size: usize,
}

struct Framing {
    source: ByteStream,
    pending: Bytes,
    remaining: u64,
    chunk_size: usize,
}

/// Re-chunk `source` into pieces of at most `chunk_size` bytes and hold it to
/// exactly `expected` bytes.
///
/// Bytes past `expected` are dropped. A source that ends early or fails makes
/// the body fail, so the connection is aborted instead of silently cut short.
pub fn framed_body(
    source: ByteStream,
    expected: u64,
    chunk_size: usize,
) -> impl Stream<Item = Result<Bytes, io::Error>> + Send + 'static {
    let state = Framing {
        source,
        pending: Bytes::new(),
        remaining: expected,
        chunk_size: chunk_size.max(1),
    };

    futures::stream::try_unfold(state, |mut st| async move {
        loop {
            if st.remaining == 0 {
                return Ok(None);
            }
            if !st.pending.is_empty() {
                let remaining = usize::try_from(st.remaining).unwrap_or(usize::MAX);
                let take = st.pending.len().min(st.chunk_size).min(remaining);
                let chunk = st.pending.split_to(take);
                st.remaining -= take as u64;
                return Ok(Some((chunk, st)));
            }
            match st.source.next().await {
                Some(Ok(bytes)) => st.pending = bytes,
                Some(Err(e)) => {
                    warn!(remaining = st.remaining, error = %e, "Object read failed mid-stream");
                    return Err(io::Error::other(e));
                }
                None => {
                    warn!(remaining = st.remaining, "Object ended before declared length");
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        format!("object ended {} bytes early", st.remaining),
                    ));
                }
            }
        }
    })
}

/// Stream `range` of the object at `key` as a 200 or 206 response.
///
/// The object is opened before any header is produced, so a missing object
/// still yields a clean 404.
pub async fn serve_range(
    store: &dyn ObjectStore,
    key: &ObjectKey,
    range: ResolvedRange,
    delivery: Delivery<'_>,
) -> Result<Response, AppError> {
    let body = match range.bounds() {
        Some((start, end)) => {
            let source = store.get_range(key, start, end).await?;
            Body::from_stream(framed_body(
                source,
                range.content_length(),
                delivery.chunk_size,
            ))
        }
        None => Body::empty(),
    };

    let mut builder = Response::builder()
        .header(header::ACCEPT_RANGES, "bytes")
        .header(
            header::CONTENT_TYPE,
            delivery.content_type.unwrap_or(DEFAULT_VIDEO_TYPE),
        )
        .header(header::CONTENT_LENGTH, range.content_length().to_string());

    builder = match range.content_range() {
        Some(content_range) => builder
            .status(StatusCode::PARTIAL_CONTENT)
            .header(header::CONTENT_RANGE, content_range),
        None => builder.status(StatusCode::OK),
    };

    if let Some(disposition) = delivery.disposition {
        builder = builder.header(header::CONTENT_DISPOSITION, disposition);
    }

    builder
        .body(body)
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))
}

/// Build an `attachment` `Content-Disposition` value for `name`.
///
/// The plain `filename` keeps only safe ASCII; `filename*` carries the full
/// UTF-8 name percent-encoded per RFC 5987.
pub fn attachment_disposition(name: &str) -> String {
    let ascii_safe: String = name
        .chars()
        .filter(|c| c.is_ascii_graphic() || *c == ' ')
        .filter(|c| !matches!(c, '"' | ';' | '\\'))
        .collect();
    let ascii_name = match ascii_safe.trim() {
        "" => "video".to_string(),
        trimmed => trimmed.to_string(),
    };

    let encoded: String = name
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'!'
            | b'#'
            | b'$'
            | b'&'
            | b'+'
            | b'-'
            | b'.'
            | b'^'
            | b'_'
            | b'`'
            | b'|'
            | b'~' => String::from(b as char),
            _ => format!("%{b:02X}"),
        })
        .collect();

    format!("attachment; filename=\"{ascii_name}\"; filename*=UTF-8''{encoded}")
}

/// Name offered for download: the display name, with the stored extension
/// appended when the display name lacks it.
pub fn download_name(display_name: &str, key: &ObjectKey) -> String {
    let Some(ext) = key.extension() else {
        return display_name.to_string();
    };
    let has_ext = display_name
        .rsplit_once('.')
        .is_some_and(|(_, e)| e.eq_ignore_ascii_case(ext));
    if has_ext {
        display_name.to_string()
    } else {
        format!("{display_name}.{ext}")
    }
}
