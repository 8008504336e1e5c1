use std::fmt;

use uuid::Uuid;

use super::error::StorageError;

const MAX_KEY_LEN: usize = 255;

/// A validated object-store key of the form `{uuid}.{ext}`.
///
/// Keys are generated once per stored object and never reused, so two
/// metadata rows can never point at the same object.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ObjectKey(String);

impl ObjectKey {
    /// Allocate a fresh random key with the given file extension.
    pub fn generate(extension: &str) -> Self {
        let ext = extension.trim_start_matches('.').to_ascii_lowercase();
        Self(format!("{}.{ext}", Uuid::new_v4()))
    }

    /// Parse a key read back from the metadata store.
    pub fn parse(s: &str) -> Result<Self, StorageError> {
        if s.is_empty() || s.len() > MAX_KEY_LEN {
            return Err(StorageError::InvalidKey(format!(
                "key length must be 1-{MAX_KEY_LEN}, got {}",
                s.len()
            )));
        }
        if s.starts_with('.') || s.contains("..") {
            return Err(StorageError::InvalidKey(format!("key {s:?} is not flat")));
        }
        if !s
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'-' | b'_'))
        {
            return Err(StorageError::InvalidKey(format!(
                "key {s:?} contains unsupported characters"
            )));
        }
        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercase extension without the dot, if any.
    pub fn extension(&self) -> Option<&str> {
        self.0.rsplit_once('.').map(|(_, ext)| ext)
    }

    /// First two characters, used as the directory shard on disk.
    pub fn shard_prefix(&self) -> &str {
        let end = self.0.len().min(2);
        &self.0[..end]
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectKey({})", self.0)
    }
}

impl AsRef<str> for ObjectKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
