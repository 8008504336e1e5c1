use std::io::ErrorKind;

use thiserror::Error;

/// Errors that can occur during object storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The requested object was not found.
    #[error("object not found: {0}")]
    NotFound(String),
    /// The key is not a valid flat object key.
    #[error("invalid object key: {0}")]
    InvalidKey(String),
    /// The backend asked us to back off (throttling, 5xx, locked file).
    #[error("object store busy: {0}")]
    Busy(String),
    /// An I/O error occurred.
    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Any other backend failure.
    #[error("object store error: {0}")]
    Backend(String),
}

impl StorageError {
    /// Whether retrying the same operation shortly afterwards may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Busy(_) => true,
            Self::Io(err) => matches!(
                err.kind(),
                ErrorKind::PermissionDenied
                    | ErrorKind::ResourceBusy
                    | ErrorKind::WouldBlock
                    | ErrorKind::Interrupted
                    | ErrorKind::TimedOut
            ),
            _ => false,
        }
    }
}
