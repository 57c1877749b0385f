use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::assets::io::ResourceSource;
use crate::assets::resource::ResourceLoader;
use crate::errors::LoadError;

/// An encoded sound effect held in memory. Decoding belongs to the audio backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sound {
    pub name: String,
    pub bytes: Arc<[u8]>,
}

impl Sound {
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct SoundLoader {
    source: ResourceSource,
}

impl SoundLoader {
    pub fn new(source: impl Into<ResourceSource>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

impl ResourceLoader for SoundLoader {
    type Output = Sound;

    fn load(&self) -> Result<Sound, LoadError> {
        Ok(Sound {
            name: self.source.name().into_owned(),
            bytes: self.source.read_bytes()?,
        })
    }
}

/// A music track, streamed by the audio backend straight from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MusicTrack {
    pub path: PathBuf,
}

/// Music is streamed, so its resources are never cached; loading only checks
/// that the file exists.
#[derive(Debug, Clone)]
pub struct MusicLoader {
    path: PathBuf,
}

impl MusicLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResourceLoader for MusicLoader {
    type Output = MusicTrack;

    fn load(&self) -> Result<MusicTrack, LoadError> {
        std::fs::metadata(&self.path)?;
        Ok(MusicTrack {
            path: self.path.clone(),
        })
    }

    fn cacheable(&self) -> bool {
        false
    }
}
