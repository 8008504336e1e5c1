//! `Range` header resolution for byte-serving endpoints.
//!
//! Only a single `bytes=S-E` or `bytes=S-` range is served. Multi-range
//! requests, suffix ranges (`bytes=-N`) and other units are refused with 416
//! rather than degraded, so a client never receives bytes it did not ask for.

use thiserror::Error;

/// Which bytes of an object a response should carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedRange {
    /// The whole object of `total` bytes.
    Full { total: u64 },
    /// Bytes `start..=end` of an object of `total` bytes.
    Partial { start: u64, end: u64, total: u64 },
}

impl ResolvedRange {
    pub fn total(&self) -> u64 {
        match *self {
            Self::Full { total } | Self::Partial { total, .. } => total,
        }
    }

    /// Number of body bytes.
    pub fn content_length(&self) -> u64 {
        match *self {
            Self::Full { total } => total,
            Self::Partial { start, end, .. } => end - start + 1,
        }
    }

    /// Inclusive byte bounds to fetch, or `None` when there is nothing to read.
    pub fn bounds(&self) -> Option<(u64, u64)> {
        match *self {
            Self::Full { total: 0 } => None,
            Self::Full { total } => Some((0, total - 1)),
            Self::Partial { start, end, .. } => Some((start, end)),
        }
    }

    /// `Content-Range` value for partial responses.
    pub fn content_range(&self) -> Option<String> {
        match *self {
            Self::Full { .. } => None,
            Self::Partial { start, end, total } => Some(format!("bytes {start}-{end}/{total}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("requested range is not satisfiable for {total} bytes")]
    Unsatisfiable { total: u64 },
    #[error("multiple ranges are not supported")]
    MultipleRanges { total: u64 },
    #[error("malformed range header: {reason}")]
    Malformed { total: u64, reason: &'static str },
}

impl RangeError {
    /// Length of the object the range was resolved against.
    pub fn total(&self) -> u64 {
        match *self {
            Self::Unsatisfiable { total }
            | Self::MultipleRanges { total }
            | Self::Malformed { total, .. } => total,
        }
    }
}

/// Resolve an optional `Range` header against an object of `total` bytes.
pub fn resolve(total: u64, header: Option<&str>) -> Result<ResolvedRange, RangeError> {
    let Some(raw) = header else {
        return Ok(ResolvedRange::Full { total });
    };
    let malformed = |reason| RangeError::Malformed { total, reason };

    let (unit, spec) = raw.trim().split_once('=').ok_or(malformed("missing '='"))?;
    if !unit.trim().eq_ignore_ascii_case("bytes") {
        return Err(malformed("unit must be bytes"));
    }
    if spec.contains(',') {
        return Err(RangeError::MultipleRanges { total });
    }

    let (start, end) = spec.split_once('-').ok_or(malformed("missing '-'"))?;
    let (start, end) = (start.trim(), end.trim());
    if start.is_empty() {
        return Err(malformed("suffix ranges are not supported"));
    }

    let start: u64 = start.parse().map_err(|_| malformed("invalid start"))?;
    if start >= total {
        return Err(RangeError::Unsatisfiable { total });
    }

    let end: u64 = if end.is_empty() {
        total - 1
    } else {
        end.parse().map_err(|_| malformed("invalid end"))?
    };
    if end >= total || start > end {
        return Err(RangeError::Unsatisfiable { total });
    }

    Ok(ResolvedRange::Partial { start, end, total })
}
