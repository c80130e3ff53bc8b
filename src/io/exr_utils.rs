/* Copyright 2020 @TwoCookingMice */

use std::path::Path;

use exr::prelude::*;

use crate::core::error::Result;
use crate::math::bitmap::Bitmap;

// Write the linear (pre-gamma) image, alpha included.
pub fn write_exr_to_file<P: AsRef<Path>>(image: &Bitmap, file_path: P) -> Result<()> {
    let file_path = file_path.as_ref();
    log::info!("Starting writing openexr image: {}.", file_path.display());

    write_rgba_file(file_path, image.width(), image.height(), |x, y| {
        let pixel = image[(x, y)];
        (pixel.x, pixel.y, pixel.z, pixel.w)
    })?;

    log::info!("EXR written to: {}.", file_path.display());
    Ok(())
}
