use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::errors::LoadError;

/// Where a loader reads its bytes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceSource {
    /// A file on disk, read on every load.
    File(PathBuf),
    /// Bytes already in memory (embedded or downloaded elsewhere).
    Memory { name: String, bytes: Arc<[u8]> },
}

impl ResourceSource {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    pub fn memory(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self::Memory {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Display name: the file path or the in-memory name.
    #[must_use]
    pub fn name(&self) -> Cow<'_, str> {
        match self {
            Self::File(path) => path.to_string_lossy(),
            Self::Memory { name, .. } => Cow::Borrowed(name),
        }
    }

    pub fn read_bytes(&self) -> Result<Arc<[u8]>, LoadError> {
        match self {
            Self::File(path) => Ok(std::fs::read(path)?.into()),
            Self::Memory { bytes, .. } => Ok(Arc::clone(bytes)),
        }
    }
}

impl From<PathBuf> for ResourceSource {
    fn from(path: PathBuf) -> Self {
        Self::File(path)
    }
}

impl From<&Path> for ResourceSource {
    fn from(path: &Path) -> Self {
        Self::File(path.to_path_buf())
    }
}

impl From<&str> for ResourceSource {
    fn from(path: &str) -> Self {
        Self::File(PathBuf::from(path))
    }
}
