// Copyright @yucwang 2026

use crate::core::error::OutputError;
use crate::io::exr_utils;
use crate::math::bitmap::Bitmap;

use image::{Rgb, RgbImage};
use std::path::Path;

fn to_byte(v: f32) -> u8 {
    (v.max(0.0).min(1.0) * 255.0).round() as u8
}

/// Quantise a display-space bitmap to 8-bit RGB.
pub fn to_rgb8(bitmap: &Bitmap) -> RgbImage {
    RgbImage::from_fn(bitmap.width() as u32, bitmap.height() as u32, |x, y| {
        let p = bitmap[(x as usize, y as usize)];
        Rgb([to_byte(p.x), to_byte(p.y), to_byte(p.z)])
    })
}

/// Save a bitmap, choosing EXR or an 8-bit format from the extension.
pub fn save_bitmap(bitmap: &Bitmap, path: &Path) -> Result<(), OutputError> {
    let extension = path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .ok_or_else(|| OutputError::UnsupportedPath(path.display().to_string()))?;

    if extension == "exr" {
        let file_path = path.to_str()
            .ok_or_else(|| OutputError::UnsupportedPath(path.display().to_string()))?;
        return exr_utils::write_exr_to_file(&bitmap.raw_copy(), bitmap.width(), bitmap.height(), file_path);
    }

    to_rgb8(bitmap).save(path)?;
    log::info!("Image written to: {}.", path.display());
    Ok(())
}
