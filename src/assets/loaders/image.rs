use ::image::DynamicImage;

use crate::assets::io::ResourceSource;
use crate::assets::resource::ResourceLoader;
use crate::errors::LoadError;

/// Decodes an image with the `image` crate.
///
/// With `convert` set (the default) the pixels are normalized to RGBA8, or
/// RGB8 when `alpha` is off. Without `convert` the decoder's layout is kept
/// and `alpha` is ignored.
#[derive(Debug, Clone)]
pub struct ImageLoader {
    source: ResourceSource,
    convert: bool,
    alpha: bool,
}

impl ImageLoader {
    pub fn new(source: impl Into<ResourceSource>) -> Self {
        Self {
            source: source.into(),
            convert: true,
            alpha: true,
        }
    }

    #[must_use]
    pub fn convert(mut self, convert: bool) -> Self {
        self.convert = convert;
        self
    }

    #[must_use]
    pub fn alpha(mut self, alpha: bool) -> Self {
        self.alpha = alpha;
        self
    }

    #[inline]
    #[must_use]
    pub fn source(&self) -> &ResourceSource {
        &self.source
    }
}

impl ResourceLoader for ImageLoader {
    type Output = DynamicImage;

    fn load(&self) -> Result<DynamicImage, LoadError> {
        let bytes = self.source.read_bytes()?;
        let img = ::image::load_from_memory(&bytes)?;

        Ok(match (self.convert, self.alpha) {
            (true, true) => DynamicImage::ImageRgba8(img.into_rgba8()),
            (true, false) => DynamicImage::ImageRgb8(img.into_rgb8()),
            (false, _) => img,
        })
    }
}
