//! Writing rendered images to disk.
//!
//! BMP is encoded here directly: the renderer's packed BGRA words are
//! already the 32-bit BMP pixel layout, and with a positive height BMP
//! stores rows bottom-up, which matches film row 0 being the bottom.
//! Every other format goes through the `image` crate.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use image::{ImageFormat, RgbaImage};
use sol_renderer::Image;

/// Size of the BITMAPFILEHEADER
const FILE_HEADER_SIZE: u32 = 14;
/// Size of the BITMAPINFOHEADER
const INFO_HEADER_SIZE: u32 = 40;
/// 72 DPI in pixels per meter
const PIXELS_PER_METER: i32 = 2835;

/// Total BMP file size for `pixel_count` 32-bit pixels.
///
/// Fails when the size does not fit the 32-bit header field.
fn bmp_file_size(pixel_count: usize) -> Result<u32> {
    pixel_count
        .checked_mul(4)
        .and_then(|bytes| u32::try_from(bytes).ok())
        .and_then(|bytes| bytes.checked_add(FILE_HEADER_SIZE + INFO_HEADER_SIZE))
        .with_context(|| format!("{} pixels exceed the BMP size limit", pixel_count))
}

/// Encode an image as a 32-bit uncompressed BMP file.
pub fn encode_bmp(image: &Image) -> Result<Vec<u8>> {
    let offset = FILE_HEADER_SIZE + INFO_HEADER_SIZE;
    let file_size = bmp_file_size(image.pixels.len())?;
    let (Ok(width), Ok(height)) = (i32::try_from(image.width), i32::try_from(image.height)) else {
        bail!("{}x{} image is too large for BMP", image.width, image.height);
    };

    let mut bytes = Vec::with_capacity(file_size as usize);

    // File header
    bytes.extend_from_slice(b"BM");
    bytes.extend_from_slice(&file_size.to_le_bytes());
    bytes.extend_from_slice(&0u16.to_le_bytes());
    bytes.extend_from_slice(&0u16.to_le_bytes());
    bytes.extend_from_slice(&offset.to_le_bytes());

    // Info header
    bytes.extend_from_slice(&INFO_HEADER_SIZE.to_le_bytes());
    bytes.extend_from_slice(&width.to_le_bytes());
    bytes.extend_from_slice(&height.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes()); // planes
    bytes.extend_from_slice(&32u16.to_le_bytes()); // bits per pixel
    bytes.extend_from_slice(&0u32.to_le_bytes()); // BI_RGB
    bytes.extend_from_slice(&0u32.to_le_bytes()); // image size, may be 0 for BI_RGB
    bytes.extend_from_slice(&PIXELS_PER_METER.to_le_bytes());
    bytes.extend_from_slice(&PIXELS_PER_METER.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes()); // colors used
    bytes.extend_from_slice(&0u32.to_le_bytes()); // colors important

    bytes.extend_from_slice(&image.to_bgra_bytes());
    Ok(bytes)
}

/// Save an image, picking the encoder from the file extension.
pub fn write_image(image: &Image, path: &Path) -> Result<()> {
    let is_bmp = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or(true, |ext| ext.eq_ignore_ascii_case("bmp"));

    if is_bmp {
        fs::write(path, encode_bmp(image)?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    } else {
        let format = ImageFormat::from_path(path)
            .with_context(|| format!("Unsupported output format: {}", path.display()))?;
        let rgba = RgbaImage::from_raw(image.width, image.height, image.to_rgba_top_down())
            .context("Pixel buffer does not match image dimensions")?;
        rgba.save_with_format(path, format)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    log::info!("Saved {}x{} image to {}", image.width, image.height, path.display());
    Ok(())
}
