//! PNG export of texture buffers, for debugging tile output.

use std::path::Path;

use gridtex_core::{PixelFormat, TextureBuffer};
use image::{DynamicImage, GrayImage, RgbImage, RgbaImage};

/// Error type for texture export.
#[derive(Debug, thiserror::Error)]
pub enum TextureExportError {
    #[error("Failed to save image: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Image encoding error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid image data")]
    InvalidImageData,
}

fn to_image(texture: &TextureBuffer) -> Result<DynamicImage, TextureExportError> {
    let (w, h) = (texture.width() as u32, texture.height() as u32);
    let data = texture.data().to_vec();
    let image = match texture.format() {
        PixelFormat::Grey => GrayImage::from_raw(w, h, data).map(DynamicImage::ImageLuma8),
        PixelFormat::Rgb => RgbImage::from_raw(w, h, data).map(DynamicImage::ImageRgb8),
        PixelFormat::Rgba => RgbaImage::from_raw(w, h, data).map(DynamicImage::ImageRgba8),
    };
    image.ok_or(TextureExportError::InvalidImageData)
}

/// Writes a texture to a `.png` file, padding included.
pub fn save_texture(
    path: impl AsRef<Path>,
    texture: &TextureBuffer,
) -> Result<(), TextureExportError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    if extension != "png" {
        return Err(TextureExportError::UnsupportedFormat(extension));
    }
    to_image(texture)?.save_with_format(path, image::ImageFormat::Png)?;
    log::debug!(
        "saved {}x{} {:?} texture to {}",
        texture.width(),
        texture.height(),
        texture.format(),
        path.display()
    );
    Ok(())
}

/// Encodes a texture as PNG in memory.
pub fn encode_png(texture: &TextureBuffer) -> Result<Vec<u8>, TextureExportError> {
    let mut buffer = std::io::Cursor::new(Vec::new());
    to_image(texture)?.write_to(&mut buffer, image::ImageFormat::Png)?;
    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_png_signature() {
        for format in [PixelFormat::Grey, PixelFormat::Rgb, PixelFormat::Rgba] {
            let texture = TextureBuffer::new(4, 2, format, [10, 20, 30, 40]);
            let png = encode_png(&texture).unwrap();
            assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
        }
    }

    #[test]
    fn test_png_round_trip_pixels() {
        let texture = TextureBuffer::new(2, 2, PixelFormat::Rgb, [1, 2, 3, 0]);
        let png = encode_png(&texture).unwrap();
        let decoded = image::load_from_memory(&png).unwrap().to_rgb8();
        assert_eq!(decoded.get_pixel(1, 1).0, [1, 2, 3]);
    }

    #[test]
    fn test_rejects_other_extensions() {
        let texture = TextureBuffer::new(1, 1, PixelFormat::Grey, [0; 4]);
        let err = save_texture("tile.jpg", &texture).unwrap_err();
        assert!(matches!(err, TextureExportError::UnsupportedFormat(ext) if ext == "jpg"));
    }
}
