//! PNG/JPEG export of rendered surfaces.

use std::path::Path;

use effigy_core::{EffigyError, Result};
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgba};

/// Writes tightly packed RGBA rows to `path`. The format follows the
/// extension: `.png`, or `.jpg`/`.jpeg` with alpha dropped.
pub fn save_image(path: impl AsRef<Path>, data: &[u8], width: u32, height: u32) -> Result<()> {
    let path = path.as_ref();
    let format = export_format(path)?;
    let img = to_image(data, width, height)?;
    match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgba8(img)
            .to_rgb8()
            .save_with_format(path, format)?,
        _ => img.save_with_format(path, format)?,
    }
    log::debug!("saved {width}x{height} image to {}", path.display());
    Ok(())
}

fn export_format(path: &Path) -> Result<ImageFormat> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    match extension.as_str() {
        "png" => Ok(ImageFormat::Png),
        "jpg" | "jpeg" => Ok(ImageFormat::Jpeg),
        _ => Err(EffigyError::UnsupportedFormat(extension)),
    }
}

/// Encodes raw RGBA pixel data as PNG in memory.
pub fn save_to_buffer(data: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    let img = to_image(data, width, height)?;
    let mut buffer = std::io::Cursor::new(Vec::new());
    img.write_to(&mut buffer, ImageFormat::Png)?;
    Ok(buffer.into_inner())
}

fn to_image(data: &[u8], width: u32, height: u32) -> Result<ImageBuffer<Rgba<u8>, Vec<u8>>> {
    let expected = width as usize * height as usize * 4;
    ImageBuffer::from_raw(width, height, data.to_vec()).ok_or(EffigyError::InvalidImageData {
        expected,
        actual: data.len(),
    })
}
