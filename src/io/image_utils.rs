// Copyright @yucwang 2026

use std::path::Path;

use image::{ImageFormat, RgbaImage};

use crate::core::error::{LumiereError, Result};
use crate::math::bitmap::PixelBuffer;

pub fn write_png_to_file<P: AsRef<Path>>(pixels: &PixelBuffer, file_path: P) -> Result<()> {
    let file_path = file_path.as_ref();
    let expected = pixels.width() * pixels.height() * PixelBuffer::CHANNELS;
    let image = RgbaImage::from_raw(pixels.width() as u32, pixels.height() as u32, pixels.as_bytes().to_vec())
        .ok_or(LumiereError::BufferSizeMismatch { expected, actual: pixels.as_bytes().len() })?;

    image.save_with_format(file_path, ImageFormat::Png)?;
    log::info!("PNG written to: {}.", file_path.display());
    Ok(())
}
