//! Picture decoding.

use super::tree::DecodedImage;
use crate::container::PartSource;
use crate::error::{Error, Result};

/// Turns an archive path into decoded pixels.
pub trait ImageLoader {
    /// Decode the picture at `path`. Absent parts and undecodable bytes
    /// both fail with [`Error::MissingResource`].
    fn load(&self, path: &str) -> Result<DecodedImage>;
}

/// Decode raster bytes (PNG, JPEG, GIF, BMP, TIFF) to straight RGBA.
pub fn decode_image(source: &str, bytes: &[u8]) -> Result<DecodedImage> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| Error::MissingResource(format!("{source}: {e}")))?
        .to_rgba8();
    let (width, height) = decoded.dimensions();
    if width == 0 || height == 0 {
        return Err(Error::MissingResource(format!("{source}: empty image")));
    }
    Ok(DecodedImage::new(source, width, height, decoded.into_raw()))
}

/// [`ImageLoader`] reading pictures from a [`PartSource`].
pub struct ArchiveImageLoader<'a, S: PartSource + ?Sized> {
    source: &'a S,
}

impl<'a, S: PartSource + ?Sized> ArchiveImageLoader<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }
}

impl<S: PartSource + ?Sized> ImageLoader for ArchiveImageLoader<'_, S> {
    fn load(&self, path: &str) -> Result<DecodedImage> {
        let bytes = self.source.read_part(path)?;
        let image = decode_image(path, &bytes)?;
        log::trace!(path, width = image.width, height = image.height; "Decoded image");
        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::MemoryParts;
    use std::io::Cursor;

    fn png_bytes() -> Vec<u8> {
        let image = image::RgbaImage::from_pixel(3, 2, image::Rgba([255, 0, 0, 255]));
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_load_png_from_parts() {
        let parts = MemoryParts::new().with_part("ppt/media/image1.png", png_bytes());
        let loader = ArchiveImageLoader::new(&parts);
        let image = loader.load("ppt/media/image1.png").unwrap();
        assert_eq!((image.width, image.height), (3, 2));
        assert!(image.is_complete());
        assert_eq!(&image.rgba[..4], &[255, 0, 0, 255]);
    }

    #[test]
    fn test_missing_and_undecodable() {
        let parts = MemoryParts::new().with_part("ppt/media/image2.emf", vec![1, 2, 3, 4]);
        let loader = ArchiveImageLoader::new(&parts);
        assert!(matches!(
            loader.load("ppt/media/none.png"),
            Err(Error::MissingResource(_))
        ));
        assert!(matches!(
            loader.load("ppt/media/image2.emf"),
            Err(Error::MissingResource(_))
        ));
    }
}
