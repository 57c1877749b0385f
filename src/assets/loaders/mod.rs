//! Built-in resource kinds.
//!
//! Each kind is only a [`ResourceLoader`]: the manager treats them exactly
//! like user-defined loaders.

pub mod audio;
pub mod image;

pub use self::audio::{MusicLoader, MusicTrack, Sound, SoundLoader};
pub use self::image::ImageLoader;

use std::sync::Arc;

use crate::assets::io::ResourceSource;
use crate::assets::resource::ResourceLoader;
use crate::errors::LoadError;

/// Loads the raw bytes of a source. Used for the generic `resource` tag.
#[derive(Debug, Clone)]
pub struct BytesLoader {
    source: ResourceSource,
}

impl BytesLoader {
    pub fn new(source: impl Into<ResourceSource>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

impl ResourceLoader for BytesLoader {
    type Output = Arc<[u8]>;

    fn load(&self) -> Result<Arc<[u8]>, LoadError> {
        self.source.read_bytes()
    }
}
