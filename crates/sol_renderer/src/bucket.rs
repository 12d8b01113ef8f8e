//! Tile-based rendering.
//!
//! Divides the image into rectangular tiles that can be rendered
//! independently. Each tile owns a disjoint region of the pixel buffer.

use sol_core::World;

use crate::pixels::PixelBuffer;
use crate::random::RandomSeries;
use crate::renderer::{color_to_packed, render_pixel};
use crate::{Camera, RenderConfig};

/// A rectangular, half-open region of the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pub start_x: u32,
    pub end_x: u32,
    pub start_y: u32,
    pub end_y: u32,
    /// Position of this tile in claim order
    pub index: usize,
}

impl Tile {
    /// Create a new tile.
    pub fn new(start_x: u32, end_x: u32, start_y: u32, end_y: u32, index: usize) -> Self {
        Self {
            start_x,
            end_x,
            start_y,
            end_y,
            index,
        }
    }

    pub fn width(&self) -> u32 {
        self.end_x - self.start_x
    }

    pub fn height(&self) -> u32 {
        self.end_y - self.start_y
    }
}

/// Default tile size in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 64;

/// Order in which tiles are claimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TileOrder {
    /// Row by row, left to right, starting at row 0
    #[default]
    Scanline,
    /// Nearest to the image center first
    Spiral,
}

/// Split a `length`-pixel axis into spans of `tile_size`, the last span
/// taking any remainder.
fn split_axis(length: u32, tile_size: u32) -> Vec<(u32, u32)> {
    if length == 0 {
        return Vec::new();
    }

    let count = (length / tile_size).max(1);
    (0..count)
        .map(|i| {
            let start = i * tile_size;
            let end = if i + 1 == count { length } else { start + tile_size };
            (start, end)
        })
        .collect()
}

/// Generate tiles covering a `width` x `height` image exactly.
///
/// Tiles are `tile_size` square except along the last column and row,
/// which absorb the remainder, so no tile is ever smaller than `tile_size`
/// unless the image itself is.
pub fn generate_tiles(width: u32, height: u32, tile_size: u32, order: TileOrder) -> Vec<Tile> {
    let tile_size = tile_size.max(1);
    let columns = split_axis(width, tile_size);
    let rows = split_axis(height, tile_size);

    let mut tiles = Vec::with_capacity(columns.len() * rows.len());
    for &(start_y, end_y) in &rows {
        for &(start_x, end_x) in &columns {
            tiles.push(Tile::new(start_x, end_x, start_y, end_y, tiles.len()));
        }
    }

    if order == TileOrder::Spiral {
        sort_spiral(&mut tiles, width, height);

        // Update indices after sorting
        for (i, tile) in tiles.iter_mut().enumerate() {
            tile.index = i;
        }
    }

    tiles
}

/// Sort tiles by distance from image center (spiral order).
///
/// The sort is stable, so equidistant tiles keep scanline order.
fn sort_spiral(tiles: &mut [Tile], width: u32, height: u32) {
    let center_x = width as f32 / 2.0;
    let center_y = height as f32 / 2.0;

    let distance = |t: &Tile| {
        let x = (t.start_x + t.end_x) as f32 / 2.0;
        let y = (t.start_y + t.end_y) as f32 / 2.0;
        (x - center_x).powi(2) + (y - center_y).powi(2)
    };

    tiles.sort_by(|a, b| {
        distance(a)
            .partial_cmp(&distance(b))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Render every pixel of one tile into `pixels`.
pub fn render_tile(
    tile: &Tile,
    camera: &Camera,
    world: &World,
    config: &RenderConfig,
    series: &mut RandomSeries,
    pixels: &PixelBuffer,
) {
    for row in tile.start_y..tile.end_y {
        for col in tile.start_x..tile.end_x {
            let color = render_pixel(camera, world, row, col, config, series);
            pixels.store(row, col, color_to_packed(color));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every pixel covered by exactly one tile.
    fn assert_exact_partition(width: u32, height: u32, tiles: &[Tile]) {
        let mut coverage = vec![0u32; (width * height) as usize];
        for tile in tiles {
            assert!(tile.end_x <= width && tile.end_y <= height, "{:?}", tile);
            assert!(tile.start_x < tile.end_x && tile.start_y < tile.end_y, "{:?}", tile);
            for y in tile.start_y..tile.end_y {
                for x in tile.start_x..tile.end_x {
                    coverage[(y * width + x) as usize] += 1;
                }
            }
        }
        assert!(
            coverage.iter().all(|&c| c == 1),
            "{}x{} not covered exactly once",
            width,
            height
        );
    }

    #[test]
    fn test_generate_tiles_exact_fit() {
        let tiles = generate_tiles(128, 128, 64, TileOrder::Scanline);
        assert_eq!(tiles.len(), 4); // 2x2 grid

        let total_pixels: u32 = tiles.iter().map(|t| t.width() * t.height()).sum();
        assert_eq!(total_pixels, 128 * 128);
        assert_exact_partition(128, 128, &tiles);
    }

    #[test]
    fn test_generate_tiles_remainder_absorbed() {
        let tiles = generate_tiles(100, 150, 64, TileOrder::Scanline);
        // One column (100 / 64 = 1), two rows (150 / 64 = 2)
        assert_eq!(tiles.len(), 2);
        assert_eq!(tiles[0], Tile::new(0, 100, 0, 64, 0));
        assert_eq!(tiles[1], Tile::new(0, 100, 64, 150, 1));
        assert_exact_partition(100, 150, &tiles);
    }

    #[test]
    fn test_generate_tiles_smaller_than_tile() {
        let tiles = generate_tiles(10, 7, 64, TileOrder::Scanline);
        assert_eq!(tiles, vec![Tile::new(0, 10, 0, 7, 0)]);
    }

    #[test]
    fn test_generate_tiles_empty_image() {
        assert!(generate_tiles(0, 10, 8, TileOrder::Scanline).is_empty());
        assert!(generate_tiles(10, 0, 8, TileOrder::Scanline).is_empty());
    }

    #[test]
    fn test_partition_many_sizes() {
        for width in [1, 2, 7, 16, 33, 64, 65, 127] {
            for height in [1, 3, 8, 31, 64, 100] {
                for tile_size in [1, 2, 5, 8, 16, 64, 200] {
                    for order in [TileOrder::Scanline, TileOrder::Spiral] {
                        let tiles = generate_tiles(width, height, tile_size, order);
                        assert_exact_partition(width, height, &tiles);
                        for (i, tile) in tiles.iter().enumerate() {
                            assert_eq!(tile.index, i);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_scanline_order() {
        let tiles = generate_tiles(32, 32, 16, TileOrder::Scanline);
        let starts: Vec<(u32, u32)> = tiles.iter().map(|t| (t.start_x, t.start_y)).collect();
        assert_eq!(starts, vec![(0, 0), (16, 0), (0, 16), (16, 16)]);
    }

    #[test]
    fn test_spiral_order() {
        let tiles = generate_tiles(192, 192, 64, TileOrder::Spiral);
        assert_eq!(tiles.len(), 9); // 3x3 grid

        // First tile should be the center one
        let first = &tiles[0];
        assert_eq!(first.start_x, 64);
        assert_eq!(first.start_y, 64);
    }
}
