//! Pixel storage for render output.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::renderer::unpack_rgba8;

/// Offset of pixel (`row`, `col`) in a row-major buffer `width` pixels wide.
#[inline]
fn pixel_index(width: u32, row: u32, col: u32) -> usize {
    row as usize * width as usize + col as usize
}

/// Shared render target written concurrently by workers.
///
/// Each cell is written by exactly one tile, so relaxed stores never race.
/// The spawner's join provides the happens-before edge for the final read.
pub struct PixelBuffer {
    width: u32,
    height: u32,
    cells: Box<[AtomicU32]>,
}

impl PixelBuffer {
    /// Create a buffer with every pixel set to zero.
    pub fn new(width: u32, height: u32) -> Self {
        let cells = (0..width as usize * height as usize)
            .map(|_| AtomicU32::new(0))
            .collect();
        Self {
            width,
            height,
            cells,
        }
    }

    /// Write pixel (`row`, `col`).
    #[inline]
    pub fn store(&self, row: u32, col: u32, packed: u32) {
        self.cells[pixel_index(self.width, row, col)].store(packed, Ordering::Relaxed);
    }

    /// Read pixel (`row`, `col`).
    #[inline]
    pub fn load(&self, row: u32, col: u32) -> u32 {
        self.cells[pixel_index(self.width, row, col)].load(Ordering::Relaxed)
    }

    /// Finish rendering and take ownership of the pixels.
    pub fn into_image(self) -> Image {
        let pixels = self
            .cells
            .into_vec()
            .into_iter()
            .map(AtomicU32::into_inner)
            .collect();
        Image {
            width: self.width,
            height: self.height,
            pixels,
        }
    }
}

/// Finished raster of packed BGRA8 pixels.
///
/// Pixel `row * width + col` holds row `row`, column `col`. Row 0 is the
/// bottom of the film.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u32>,
}

impl Image {
    /// Get the packed pixel at (`row`, `col`).
    pub fn get(&self, row: u32, col: u32) -> u32 {
        self.pixels[pixel_index(self.width, row, col)]
    }

    /// Pixel words as little-endian bytes (B, G, R, A per pixel), rows in
    /// buffer order.
    pub fn to_bgra_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 4);
        for pixel in &self.pixels {
            bytes.extend_from_slice(&pixel.to_le_bytes());
        }
        bytes
    }

    /// RGBA bytes with the top row first, for formats that store rows
    /// top-down.
    pub fn to_rgba_top_down(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 4);
        if self.width == 0 {
            return bytes;
        }
        for row in self.pixels.chunks(self.width as usize).rev() {
            for &pixel in row {
                bytes.extend_from_slice(&unpack_rgba8(pixel));
            }
        }
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_buffer_store_load() {
        let buffer = PixelBuffer::new(4, 3);
        buffer.store(2, 3, 0xFF12_3456);
        assert_eq!(buffer.load(2, 3), 0xFF12_3456);
        assert_eq!(buffer.load(0, 0), 0);

        let image = buffer.into_image();
        assert_eq!(image.pixels.len(), 12);
        assert_eq!(image.get(2, 3), 0xFF12_3456);
        assert_eq!(image.pixels[2 * 4 + 3], 0xFF12_3456);
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_pixel_index_beyond_u32() {
        assert_eq!(pixel_index(4, 2, 3), 11);
        // 100_000 x 50_000 image: the offset no longer fits in u32
        assert_eq!(pixel_index(100_000, 49_999, 7), 4_999_900_007);
        assert_eq!(pixel_index(u32::MAX, u32::MAX, 0), (u32::MAX as usize).pow(2));
    }

    #[test]
    fn test_bgra_bytes() {
        let image = Image {
            width: 1,
            height: 1,
            pixels: vec![0xFF11_2233],
        };
        assert_eq!(image.to_bgra_bytes(), vec![0x33, 0x22, 0x11, 0xFF]);
    }

    #[test]
    fn test_rgba_top_down_flips_rows() {
        let image = Image {
            width: 2,
            height: 2,
            pixels: vec![0xFF00_0001, 0xFF00_0002, 0xFF00_0003, 0xFF00_0004],
        };
        let bytes = image.to_rgba_top_down();
        // Blue channel carries the marker; row 1 comes first
        let blues: Vec<u8> = bytes.chunks(4).map(|p| p[2]).collect();
        assert_eq!(blues, vec![3, 4, 1, 2]);
        assert!(bytes.chunks(4).all(|p| p[3] == 255));
    }
}
