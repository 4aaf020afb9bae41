//! CPU-side texture images.

use crate::mapping::PixelFormat;

/// A padded power-of-two texture image.
///
/// Only the top-left region covered by a tile is written; the padding keeps
/// the background bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureBuffer {
    width: usize,
    height: usize,
    format: PixelFormat,
    data: Vec<u8>,
}

impl TextureBuffer {
    /// Allocates a texture filled with `background`.
    ///
    /// Formats narrower than four bytes take the leading bytes.
    pub fn new(width: usize, height: usize, format: PixelFormat, background: [u8; 4]) -> Self {
        let channels = format.channels();
        let data = background[..channels]
            .iter()
            .copied()
            .cycle()
            .take(width * height * channels)
            .collect();
        Self {
            width,
            height,
            format,
            data,
        }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Bytes per texel row.
    #[must_use]
    pub fn row_stride(&self) -> usize {
        self.width * self.format.channels()
    }

    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable texel bytes, row-major.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Bytes of texel `(x, y)`.
    #[must_use]
    pub fn pixel(&self, x: usize, y: usize) -> &[u8] {
        let c = self.format.channels();
        let at = y * self.row_stride() + x * c;
        &self.data[at..at + c]
    }

    /// Mutable bytes of row `y`.
    pub fn row_mut(&mut self, y: usize) -> &mut [u8] {
        let stride = self.row_stride();
        &mut self.data[y * stride..(y + 1) * stride]
    }

    /// Resets every byte to `background`.
    pub fn clear(&mut self, background: [u8; 4]) {
        let c = self.format.channels();
        for texel in self.data.chunks_exact_mut(c) {
            texel.copy_from_slice(&background[..c]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_fill() {
        let t = TextureBuffer::new(4, 2, PixelFormat::Rgb, [1, 2, 3, 4]);
        assert_eq!(t.data().len(), 24);
        assert_eq!(t.pixel(3, 1), &[1, 2, 3]);
        assert_eq!(t.row_stride(), 12);

        let g = TextureBuffer::new(2, 2, PixelFormat::Grey, [9, 0, 0, 0]);
        assert_eq!(g.data(), &[9, 9, 9, 9]);
    }

    #[test]
    fn test_row_write_and_clear() {
        let mut t = TextureBuffer::new(2, 2, PixelFormat::Rgba, [0; 4]);
        t.row_mut(1)[4..8].copy_from_slice(&[10, 20, 30, 40]);
        assert_eq!(t.pixel(1, 1), &[10, 20, 30, 40]);
        t.clear([5, 5, 5, 5]);
        assert_eq!(t.pixel(1, 1), &[5, 5, 5, 5]);
    }
}
